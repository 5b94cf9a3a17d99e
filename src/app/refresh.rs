// ==========================================
// 设备维护管理系统 - 仪表盘轮询刷新
// ==========================================
// 职责: 按固定间隔重读存储、重算仪表盘快照并发布
// 发布: tokio::sync::watch（只保留最新一份）
// 取消: CancellationToken；RefreshHandle 被丢弃时同样取消
// 说明: 单次读取不可取消，取消在两次刷新之间生效
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::DashboardSnapshot;
use crate::app::state::AppState;

pub struct DashboardRefresher;

impl DashboardRefresher {
    /// 启动轮询任务（需在 tokio 运行时内调用）
    ///
    /// 启动时立即计算一次，之后每 `interval` 刷新一次。
    /// 某次计算失败只记录告警，保留上一次发布的快照。
    pub fn start(state: Arc<AppState>, interval: Duration) -> RefreshHandle {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel::<Option<DashboardSnapshot>>(None);

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tracing::info!(interval = ?interval, "仪表盘轮询已启动");
                loop {
                    match state.dashboard_api.get_dashboard_snapshot(Utc::now()) {
                        Ok(snapshot) => {
                            tracing::debug!(
                                total_equipment = snapshot.stats.total_equipment,
                                active_interventions = snapshot.stats.active_interventions,
                                "仪表盘快照已刷新"
                            );
                            // 所有接收端都已关闭时无需继续
                            if tx.send(Some(snapshot)).is_err() {
                                tracing::info!("无订阅者，仪表盘轮询退出");
                                break;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "仪表盘刷新失败，保留上次快照"),
                    }

                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!("仪表盘轮询已停止");
                            break;
                        }
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
            })
        };

        RefreshHandle {
            cancel,
            receiver: rx,
            task: Some(task),
        }
    }
}

/// 轮询任务句柄
pub struct RefreshHandle {
    cancel: CancellationToken,
    receiver: watch::Receiver<Option<DashboardSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// 订阅快照更新
    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardSnapshot>> {
        self.receiver.clone()
    }

    /// 最近一次发布的快照（首次刷新前为 None）
    pub fn latest(&self) -> Option<DashboardSnapshot> {
        self.receiver.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// 停止轮询并等待任务退出
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "仪表盘轮询任务异常退出");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
