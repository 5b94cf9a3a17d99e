// ==========================================
// 设备维护管理系统 - 性能指标评级
// ==========================================
// 目标值（可配置）:
// - TRS  >= 85 %
// - MTBF >= 150 h
// - MTTR <= 3 h
// 未定义的指标评级为 unknown
// ==========================================

use crate::domain::metrics::{MetricValue, PerformanceMetrics};
use crate::domain::types::IndicatorGrade;
use serde::{Deserialize, Serialize};

/// 性能目标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceTargets {
    pub trs_pct: f64,
    pub mtbf_hours: f64,
    pub mttr_hours: f64,
}

impl Default for PerformanceTargets {
    fn default() -> Self {
        Self {
            trs_pct: 85.0,
            mtbf_hours: 150.0,
            mttr_hours: 3.0,
        }
    }
}

/// 单项指标卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedIndicator {
    pub value: MetricValue,
    pub target: f64,
    pub grade: IndicatorGrade,
}

/// 三项指标卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub trs: GradedIndicator,
    pub mtbf: GradedIndicator,
    pub mttr: GradedIndicator,
}

pub struct PerformanceGrader {
    targets: PerformanceTargets,
}

impl PerformanceGrader {
    pub fn new(targets: PerformanceTargets) -> Self {
        Self { targets }
    }

    pub fn grade(&self, metrics: &PerformanceMetrics) -> PerformanceReport {
        PerformanceReport {
            trs: Self::at_least(metrics.trs, self.targets.trs_pct),
            mtbf: Self::at_least(metrics.mtbf, self.targets.mtbf_hours),
            mttr: Self::at_most(metrics.mttr, self.targets.mttr_hours),
        }
    }

    fn at_least(value: MetricValue, target: f64) -> GradedIndicator {
        let grade = match value.value() {
            Some(v) if v >= target => IndicatorGrade::Success,
            Some(_) => IndicatorGrade::Warning,
            None => IndicatorGrade::Unknown,
        };
        GradedIndicator { value, target, grade }
    }

    fn at_most(value: MetricValue, target: f64) -> GradedIndicator {
        let grade = match value.value() {
            Some(v) if v <= target => IndicatorGrade::Success,
            Some(_) => IndicatorGrade::Warning,
            None => IndicatorGrade::Unknown,
        };
        GradedIndicator { value, target, grade }
    }
}

impl Default for PerformanceGrader {
    fn default() -> Self {
        Self::new(PerformanceTargets::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grades_against_default_targets() {
        let report = PerformanceGrader::default().grade(&PerformanceMetrics {
            trs: MetricValue::Value(85.0),
            mtbf: MetricValue::Value(120.0),
            mttr: MetricValue::Value(3.0),
        });
        assert_eq!(report.trs.grade, IndicatorGrade::Success);
        assert_eq!(report.mtbf.grade, IndicatorGrade::Warning);
        assert_eq!(report.mttr.grade, IndicatorGrade::Success);
        assert_eq!(report.mtbf.target, 150.0);
    }

    #[test]
    fn test_undefined_is_unknown() {
        let report = PerformanceGrader::default().grade(&PerformanceMetrics::default());
        assert_eq!(report.trs.grade, IndicatorGrade::Unknown);
        assert_eq!(report.mtbf.grade, IndicatorGrade::Unknown);
        assert_eq!(report.mttr.grade, IndicatorGrade::Unknown);
    }

    #[test]
    fn test_custom_targets() {
        let grader = PerformanceGrader::new(PerformanceTargets {
            trs_pct: 60.0,
            mtbf_hours: 100.0,
            mttr_hours: 1.0,
        });
        let report = grader.grade(&PerformanceMetrics {
            trs: MetricValue::Value(70.0),
            mtbf: MetricValue::Value(120.0),
            mttr: MetricValue::Value(2.0),
        });
        assert_eq!(report.trs.grade, IndicatorGrade::Success);
        assert_eq!(report.mtbf.grade, IndicatorGrade::Success);
        assert_eq!(report.mttr.grade, IndicatorGrade::Warning);
    }
}
