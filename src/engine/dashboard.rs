// ==========================================
// 设备维护管理系统 - 仪表盘计数引擎
// ==========================================
// 职责: 仪表盘聚合计数
// 输入: 设备 + 干预 + 备件快照
// 输出: DashboardStats
// 红线: 空集合计数为 0，不报错
// ==========================================

use crate::domain::equipment::Equipment;
use crate::domain::intervention::Intervention;
use crate::domain::metrics::DashboardStats;
use crate::domain::spare_part::SparePart;
use crate::domain::types::{DisplayStatus, InterventionStatus, InterventionType};
use crate::engine::event_status::EventStatusEngine;
use chrono::{DateTime, Utc};

// ==========================================
// DashboardEngine - 仪表盘计数引擎
// ==========================================
pub struct DashboardEngine {
    // 无状态引擎，数据由调用方传入
}

impl DashboardEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算仪表盘计数
    ///
    /// # 说明
    /// - active: 存储状态不是 completed 的干预（canceled 也计入，与看板口径一致）
    /// - planned / overdue: 按 `now` 派生的显示状态计数
    pub fn compute(
        &self,
        equipment: &[Equipment],
        interventions: &[Intervention],
        spare_parts: &[SparePart],
        now: DateTime<Utc>,
    ) -> DashboardStats {
        let status_engine = EventStatusEngine::new();

        let mut stats = DashboardStats {
            total_equipment: equipment.len(),
            equipment_in_breakdown: equipment.iter().filter(|e| e.is_in_breakdown()).count(),
            total_interventions: interventions.len(),
            low_stock_parts: spare_parts.iter().filter(|p| p.is_low_stock()).count(),
            ..DashboardStats::default()
        };

        for it in interventions {
            if it.status != InterventionStatus::Completed {
                stats.active_interventions += 1;
            }
            match it.intervention_type {
                InterventionType::Preventive => stats.preventive_interventions += 1,
                InterventionType::Corrective => stats.corrective_interventions += 1,
            }
            match status_engine.derive(it, now) {
                Some(DisplayStatus::Planned) => stats.planned_interventions += 1,
                Some(DisplayStatus::Overdue) => stats.overdue_interventions += 1,
                _ => {}
            }
        }

        tracing::debug!(
            total_equipment = stats.total_equipment,
            total_interventions = stats.total_interventions,
            low_stock_parts = stats.low_stock_parts,
            "仪表盘计数已计算"
        );

        stats
    }
}

impl Default for DashboardEngine {
    fn default() -> Self {
        Self::new()
    }
}
