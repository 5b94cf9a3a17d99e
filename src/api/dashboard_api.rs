// ==========================================
// 设备维护管理系统 - 仪表盘 API
// ==========================================
// 职责: 仪表盘计数、指标表、性能卡片、帕累托分析、最近干预
// 架构: API 层 → EntityStore 快照 → 指标引擎（纯函数）
// 红线: 只读；指标缓存的重算走 EntityStore
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::error::{config_error, ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::dates::iso_datetime;
use crate::domain::intervention::Intervention;
use crate::domain::metrics::{
    DashboardStats, EquipmentIndicators, MetricValue, PerformanceMetrics, RankedParetoItem,
    TrsComponents,
};
use crate::engine::{
    recent_interventions, DashboardEngine, ParetoEngine, PerformanceGrader, PerformanceReport,
    ReliabilityEngine,
};
use crate::repository::EntityStore;

/// 仪表盘整页数据（轮询刷新发布的内容）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(with = "iso_datetime")]
    pub generated_at: DateTime<Utc>,
    pub stats: DashboardStats,
    pub performance: PerformanceReport,
    pub pareto: Vec<RankedParetoItem>,
    pub recent_interventions: Vec<Intervention>,
}

// ==========================================
// DashboardApi - 仪表盘 API
// ==========================================
pub struct DashboardApi {
    store: Arc<EntityStore>,
    config: Arc<ConfigManager>,
    dashboard_engine: DashboardEngine,
    reliability_engine: ReliabilityEngine,
    pareto_engine: ParetoEngine,
}

impl DashboardApi {
    pub fn new(store: Arc<EntityStore>, config: Arc<ConfigManager>) -> Self {
        Self {
            store,
            config,
            dashboard_engine: DashboardEngine::new(),
            reliability_engine: ReliabilityEngine::new(),
            pareto_engine: ParetoEngine::new(),
        }
    }

    // ==========================================
    // 计数 / 指标表
    // ==========================================

    pub fn get_dashboard_stats(&self, now: DateTime<Utc>) -> DashboardStats {
        let snapshot = self.store.snapshot();
        self.dashboard_engine.compute(
            &snapshot.equipment,
            &snapshot.interventions,
            &snapshot.spare_parts,
            now,
        )
    }

    /// 每台设备的 MTBF / MTTR / TRS
    ///
    /// # 参数
    /// - trs_by_equipment: 外部提供的单台 TRS（百分比）；未提供的设备 TRS 未定义
    pub fn calculate_indicators(
        &self,
        trs_by_equipment: &HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> Vec<EquipmentIndicators> {
        self.reliability_engine.calculate_indicators(
            &self.store.load_equipment(),
            &self.store.load_interventions(),
            trs_by_equipment,
            now,
        )
    }

    // ==========================================
    // 性能卡片
    // ==========================================

    /// 缓存的设备群性能
    pub fn get_performance_metrics(&self) -> PerformanceMetrics {
        self.store.load_performance_metrics()
    }

    /// 性能卡片（按配置目标评级）
    pub fn get_performance_report(&self) -> ApiResult<PerformanceReport> {
        let targets = self.config.get_performance_targets().map_err(config_error)?;
        Ok(PerformanceGrader::new(targets).grade(&self.get_performance_metrics()))
    }

    /// 按当前数据重算 MTBF / MTTR 缓存（TRS 沿用）
    pub fn refresh_performance_metrics(&self, now: DateTime<Utc>) -> ApiResult<PerformanceMetrics> {
        Ok(self.store.refresh_metric_caches(now)?)
    }

    /// 写入外部 TRS（百分比，0~100）
    pub fn set_trs(&self, trs_percent: f64) -> ApiResult<PerformanceMetrics> {
        if !trs_percent.is_finite() || !(0.0..=100.0).contains(&trs_percent) {
            return Err(ApiError::InvalidInput(format!(
                "TRS 必须在 0~100 之间: {}",
                trs_percent
            )));
        }
        let metrics = self.store.set_trs(MetricValue::Value(trs_percent))?;
        tracing::info!(trs = trs_percent, "TRS 已更新");
        Ok(metrics)
    }

    /// 由可用率 / 性能率 / 合格率写入 TRS
    pub fn set_trs_from_components(&self, components: TrsComponents) -> ApiResult<PerformanceMetrics> {
        self.set_trs(components.trs_percent())
    }

    pub fn clear_trs(&self) -> ApiResult<PerformanceMetrics> {
        Ok(self.store.set_trs(MetricValue::Undefined)?)
    }

    // ==========================================
    // 帕累托 / 最近干预
    // ==========================================

    pub fn get_pareto_analysis(&self) -> Vec<RankedParetoItem> {
        self.pareto_engine.rank(&self.store.load_pareto_causes())
    }

    pub fn get_recent_interventions(&self) -> ApiResult<Vec<Intervention>> {
        let limit = self
            .config
            .get_recent_interventions_limit()
            .map_err(config_error)?;
        Ok(recent_interventions(&self.store.load_interventions(), limit))
    }

    /// 整页数据（一次读取快照，各部分口径一致）
    pub fn get_dashboard_snapshot(&self, now: DateTime<Utc>) -> ApiResult<DashboardSnapshot> {
        let snapshot = self.store.snapshot();
        let stats = self.dashboard_engine.compute(
            &snapshot.equipment,
            &snapshot.interventions,
            &snapshot.spare_parts,
            now,
        );
        let limit = self
            .config
            .get_recent_interventions_limit()
            .map_err(config_error)?;

        Ok(DashboardSnapshot {
            generated_at: now,
            stats,
            performance: self.get_performance_report()?,
            pareto: self.get_pareto_analysis(),
            recent_interventions: recent_interventions(&snapshot.interventions, limit),
        })
    }
}
