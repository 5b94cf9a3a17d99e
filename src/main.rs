// ==========================================
// 设备维护管理系统 - 主入口
// ==========================================
// 用法:
//   maintenance-cmms           启动并持续轮询仪表盘，Ctrl-C 退出
//   maintenance-cmms --once    输出一次仪表盘快照 (JSON) 后退出
// ==========================================

use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::Utc;
use maintenance_cmms::app::{get_default_db_path, AppState, DashboardRefresher};
use maintenance_cmms::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", maintenance_cmms::APP_NAME);
    tracing::info!("系统版本: {}", maintenance_cmms::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    let report = state
        .initialize_if_empty(Utc::now())
        .context("首次初始化失败")?;
    if !report.is_noop() {
        tracing::info!(?report, "已写入演示数据");
    }

    let once = std::env::args().skip(1).any(|a| a == "--once");
    if once {
        let snapshot = state
            .dashboard_api
            .get_dashboard_snapshot(Utc::now())
            .context("仪表盘计算失败")?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let interval = state
        .config
        .get_refresh_interval()
        .map_err(|e| anyhow!("读取刷新间隔失败: {}", e))?;
    let state = Arc::new(state);
    let handle = DashboardRefresher::start(state, interval);

    let mut updates = handle.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("收到退出信号");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(snapshot) = updates.borrow_and_update().as_ref() {
                    let stats = &snapshot.stats;
                    tracing::info!(
                        equipment = stats.total_equipment,
                        breakdown = stats.equipment_in_breakdown,
                        active = stats.active_interventions,
                        overdue = stats.overdue_interventions,
                        low_stock = stats.low_stock_parts,
                        mtbf = %snapshot.performance.mtbf.value,
                        mttr = %snapshot.performance.mttr.value,
                        "仪表盘"
                    );
                }
            }
        }
    }

    handle.stop().await;
    Ok(())
}
