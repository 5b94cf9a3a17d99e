// ==========================================
// 设备维护管理系统 - 可靠性指标引擎
// ==========================================
// 职责: 单台设备 MTBF / MTTR / TRS，设备群整体性能快照
// ==========================================
// 公式:
// - 运行小时 = max(1, now - 投运日期)
// - MTBF = 运行小时 / 纠正性干预数（数量为 0 时未定义）
// - MTTR = 已完成且有时长的干预总时长 / 其数量（数量为 0 时未定义）
// - TRS 不由本系统数据推算，只接受外部提供的值
// ==========================================

use crate::domain::equipment::Equipment;
use crate::domain::intervention::Intervention;
use crate::domain::metrics::{EquipmentIndicators, MetricValue, PerformanceMetrics};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// 单台设备的故障 / 修复统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ReliabilityTally {
    failures: usize,
    repairs: usize,
    repair_hours: f64,
}

impl ReliabilityTally {
    fn add(&mut self, it: &Intervention) {
        if it.is_corrective() {
            self.failures += 1;
        }
        if let Some(hours) = it.repair_hours() {
            self.repairs += 1;
            self.repair_hours += hours;
        }
    }
}

pub struct ReliabilityEngine {
    // 无状态引擎
}

impl ReliabilityEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 单台设备指标
    ///
    /// # 参数
    /// - equipment: 设备
    /// - interventions: 干预列表（内部按 equipment_id 过滤）
    /// - trs: 外部提供的 TRS（百分比），无则为未定义
    /// - now: 计算时刻
    pub fn equipment_indicators(
        &self,
        equipment: &Equipment,
        interventions: &[Intervention],
        trs: Option<f64>,
        now: DateTime<Utc>,
    ) -> EquipmentIndicators {
        let mut tally = ReliabilityTally::default();
        for it in interventions.iter().filter(|i| i.equipment_id == equipment.id) {
            tally.add(it);
        }
        self.build_row(equipment, tally, trs, now)
    }

    /// 指标表（每台设备一行，保持设备输入顺序）
    ///
    /// 干预按设备ID分组一次遍历，避免逐台扫描全表。
    pub fn calculate_indicators(
        &self,
        equipment_list: &[Equipment],
        interventions: &[Intervention],
        trs_by_equipment: &HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> Vec<EquipmentIndicators> {
        let mut tallies: HashMap<&str, ReliabilityTally> = HashMap::new();
        for it in interventions {
            tallies.entry(it.equipment_id.as_str()).or_default().add(it);
        }

        equipment_list
            .iter()
            .map(|eq| {
                let tally = tallies.get(eq.id.as_str()).copied().unwrap_or_default();
                let trs = trs_by_equipment.get(&eq.id).copied();
                self.build_row(eq, tally, trs, now)
            })
            .collect()
    }

    /// 设备群整体性能
    ///
    /// - MTBF = Σ运行小时 / Σ纠正性干预数
    /// - MTTR = Σ修复时长 / 修复次数
    /// - TRS 沿用外部值
    ///
    /// 孤立干预（设备已删除）不计入 MTBF 分母，但其修复时长仍计入 MTTR。
    pub fn fleet_performance(
        &self,
        equipment_list: &[Equipment],
        interventions: &[Intervention],
        trs: MetricValue,
        now: DateTime<Utc>,
    ) -> PerformanceMetrics {
        let known: HashMap<&str, &Equipment> =
            equipment_list.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut failures = 0usize;
        let mut repair = ReliabilityTally::default();
        for it in interventions {
            if it.is_corrective() && known.contains_key(it.equipment_id.as_str()) {
                failures += 1;
            }
            if let Some(hours) = it.repair_hours() {
                repair.repairs += 1;
                repair.repair_hours += hours;
            }
        }

        let operating_hours: f64 = equipment_list.iter().map(|e| e.operating_hours(now)).sum();

        PerformanceMetrics {
            trs,
            mtbf: MetricValue::ratio(operating_hours, failures as f64),
            mttr: MetricValue::ratio(repair.repair_hours, repair.repairs as f64),
        }
    }

    fn build_row(
        &self,
        equipment: &Equipment,
        tally: ReliabilityTally,
        trs: Option<f64>,
        now: DateTime<Utc>,
    ) -> EquipmentIndicators {
        let operating_hours = equipment.operating_hours(now);
        EquipmentIndicators {
            equipment_id: equipment.id.clone(),
            name: equipment.name.clone(),
            operating_hours,
            failure_count: tally.failures,
            repair_count: tally.repairs,
            mtbf: MetricValue::ratio(operating_hours, tally.failures as f64),
            mttr: MetricValue::ratio(tally.repair_hours, tally.repairs as f64),
            trs: MetricValue::from(trs.map(|v| v.clamp(0.0, 100.0))),
        }
    }
}

impl Default for ReliabilityEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        CriticalityLevel, EquipmentStatus, InterventionStatus, InterventionType, Priority,
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn equipment(id: &str, installed_days_ago: Option<i64>) -> Equipment {
        Equipment {
            id: id.to_string(),
            name: format!("Moteur {}", id),
            equipment_type: "Moteur".to_string(),
            location: String::new(),
            manufacturer: String::new(),
            model: String::new(),
            serial_number: String::new(),
            status: EquipmentStatus::Operational,
            criticality_level: CriticalityLevel::Medium,
            installation_date: installed_days_ago.map(|d| (now() - Duration::days(d)).date_naive()),
            last_maintenance_date: None,
            next_maintenance_date: None,
        }
    }

    fn intervention(
        id: &str,
        equipment_id: &str,
        t: InterventionType,
        status: InterventionStatus,
        duration: Option<f64>,
    ) -> Intervention {
        Intervention {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            equipment_id: equipment_id.to_string(),
            equipment_name: String::new(),
            intervention_type: t,
            status,
            priority: Priority::Medium,
            start_date: now() - Duration::days(1),
            end_date: (status == InterventionStatus::Completed).then(now),
            duration_hours: duration,
            technicians: vec![],
            causes_of_failure: vec![],
            spare_parts: vec![],
            notes: vec![],
        }
    }

    #[test]
    fn test_mtbf_scenario_two_failures_over_100_days() {
        let eq = equipment("EQ1", Some(100));
        let list = vec![
            intervention("I1", "EQ1", InterventionType::Corrective, InterventionStatus::Completed, Some(3.0)),
            intervention("I2", "EQ1", InterventionType::Corrective, InterventionStatus::Scheduled, None),
            intervention("I3", "EQ2", InterventionType::Corrective, InterventionStatus::Completed, Some(9.0)),
        ];
        let row = ReliabilityEngine::new().equipment_indicators(&eq, &list, None, now());
        assert_eq!(row.failure_count, 2);
        assert_eq!(row.mtbf, MetricValue::Value(1200.0));
        assert_eq!(row.mttr, MetricValue::Value(3.0));
        assert_eq!(row.trs, MetricValue::Undefined);
    }

    #[test]
    fn test_no_failures_means_undefined_mtbf() {
        let eq = equipment("EQ1", Some(10));
        let list = vec![intervention(
            "I1",
            "EQ1",
            InterventionType::Preventive,
            InterventionStatus::Completed,
            None,
        )];
        let row = ReliabilityEngine::new().equipment_indicators(&eq, &list, None, now());
        assert_eq!(row.mtbf, MetricValue::Undefined);
        // 已完成但无时长不计入修复
        assert_eq!(row.repair_count, 0);
        assert_eq!(row.mttr, MetricValue::Undefined);
    }

    #[test]
    fn test_missing_installation_date_clamps_to_one_hour() {
        let eq = equipment("EQ1", None);
        let list = vec![intervention(
            "I1",
            "EQ1",
            InterventionType::Corrective,
            InterventionStatus::InProgress,
            None,
        )];
        let row = ReliabilityEngine::new().equipment_indicators(&eq, &list, None, now());
        assert_eq!(row.operating_hours, 1.0);
        assert_eq!(row.mtbf, MetricValue::Value(1.0));
    }

    #[test]
    fn test_calculate_indicators_uses_external_trs() {
        let list_eq = vec![equipment("EQ1", Some(10)), equipment("EQ2", Some(20))];
        let mut trs = HashMap::new();
        trs.insert("EQ2".to_string(), 82.5);

        let rows = ReliabilityEngine::new().calculate_indicators(&list_eq, &[], &trs, now());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].equipment_id, "EQ1");
        assert_eq!(rows[0].trs, MetricValue::Undefined);
        assert_eq!(rows[1].trs, MetricValue::Value(82.5));
        assert!(rows.iter().all(|r| r.mtbf == MetricValue::Undefined));
    }

    #[test]
    fn test_fleet_performance() {
        let list_eq = vec![equipment("EQ1", Some(100)), equipment("EQ2", Some(50))];
        let list = vec![
            intervention("I1", "EQ1", InterventionType::Corrective, InterventionStatus::Completed, Some(2.0)),
            intervention("I2", "EQ2", InterventionType::Corrective, InterventionStatus::Completed, Some(4.0)),
            intervention("I3", "EQ2", InterventionType::Corrective, InterventionStatus::InProgress, None),
            // 孤立干预
            intervention("I4", "EQ9", InterventionType::Corrective, InterventionStatus::Completed, Some(6.0)),
        ];
        let pm = ReliabilityEngine::new().fleet_performance(
            &list_eq,
            &list,
            MetricValue::Value(80.0),
            now(),
        );
        assert_eq!(pm.mtbf, MetricValue::Value(150.0 * 24.0 / 3.0));
        assert_eq!(pm.mttr, MetricValue::Value(4.0));
        assert_eq!(pm.trs, MetricValue::Value(80.0));
    }

    #[test]
    fn test_fleet_performance_empty() {
        let pm = ReliabilityEngine::new().fleet_performance(&[], &[], MetricValue::Undefined, now());
        assert_eq!(pm, PerformanceMetrics::default());
    }
}
