// ==========================================
// 设备维护管理系统 - 指标值对象
// ==========================================
// 职责: 仪表盘计数、可靠性指标、帕累托条目、维护事件视图
// 红线: 分母为 0 时输出显式 "未定义"，不输出 NaN / 0
// ==========================================

use crate::domain::dates::iso_datetime;
use crate::domain::types::{DisplayStatus, InterventionType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ==========================================
// MetricValue - 可能未定义的指标值
// ==========================================

/// 指标值
///
/// 序列化: 有值为数字，未定义为 null；展示文本为 "-"
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MetricValue {
    Value(f64),
    #[default]
    Undefined,
}

impl MetricValue {
    /// 比值计算；分母为 0 或结果非有限数时为未定义
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            return MetricValue::Undefined;
        }
        let v = numerator / denominator;
        if v.is_finite() {
            MetricValue::Value(v)
        } else {
            MetricValue::Undefined
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, MetricValue::Value(_))
    }

    /// 保留一位小数（展示用）
    pub fn rounded(&self) -> Self {
        match self {
            MetricValue::Value(v) => MetricValue::Value((v * 10.0).round() / 10.0),
            MetricValue::Undefined => MetricValue::Undefined,
        }
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(x) if x.is_finite() => MetricValue::Value(x),
            _ => MetricValue::Undefined,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(v) => write!(f, "{:.1}", v),
            MetricValue::Undefined => write!(f, "-"),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Value(v) => s.serialize_f64(*v),
            MetricValue::Undefined => s.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<Raw>::deserialize(d)? {
            Some(Raw::Number(v)) => MetricValue::from(Some(v)),
            Some(Raw::Text(t)) => MetricValue::from(t.trim().parse::<f64>().ok()),
            None => MetricValue::Undefined,
        })
    }
}

// ==========================================
// TRS - 综合效率（外部提供）
// ==========================================

/// TRS 组成因子（可用率 × 性能率 × 合格率），各因子取值 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrsComponents {
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
}

impl TrsComponents {
    /// TRS 百分比 [0, 100]
    pub fn trs_percent(&self) -> f64 {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        clamp(self.availability) * clamp(self.performance) * clamp(self.quality) * 100.0
    }
}

// ==========================================
// 仪表盘计数
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_equipment: usize,
    pub equipment_in_breakdown: usize,
    pub total_interventions: usize,
    pub active_interventions: usize,
    pub preventive_interventions: usize,
    pub corrective_interventions: usize,
    /// 派生状态为 planned（scheduled 且开始时间未过）的干预数
    pub planned_interventions: usize,
    /// 派生状态为 overdue 的干预数
    pub overdue_interventions: usize,
    pub low_stock_parts: usize,
}

// ==========================================
// 可靠性指标
// ==========================================

/// 单台设备的可靠性指标（指标表的一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentIndicators {
    pub equipment_id: String,
    pub name: String,
    pub operating_hours: f64,
    pub failure_count: usize,
    pub repair_count: usize,
    pub mtbf: MetricValue,
    pub mttr: MetricValue,
    pub trs: MetricValue,
}

/// 设备群整体性能快照（存储键 performanceMetrics）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default)]
    pub trs: MetricValue,
    #[serde(default)]
    pub mtbf: MetricValue,
    #[serde(default)]
    pub mttr: MetricValue,
}

// ==========================================
// 帕累托
// ==========================================

/// 原始故障原因权重（存储键 paretoCauses）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoItem {
    pub name: String,
    pub value: f64,
}

impl ParetoItem {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// 排序后的帕累托条目（附累计百分比）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedParetoItem {
    pub name: String,
    pub value: f64,
    pub cumulative_percent: i64,
}

// ==========================================
// 维护事件（日历 / 列表视图）
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceEvent {
    pub id: String,
    pub title: String,
    #[serde(with = "iso_datetime")]
    pub date: DateTime<Utc>,
    pub equipment_id: String,
    pub equipment_name: String,
    #[serde(rename = "type")]
    pub event_type: InterventionType,
    pub status: DisplayStatus,
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_zero_denominator_is_undefined() {
        assert_eq!(MetricValue::ratio(10.0, 0.0), MetricValue::Undefined);
        assert_eq!(MetricValue::ratio(0.0, 0.0), MetricValue::Undefined);
        assert_eq!(MetricValue::ratio(10.0, 4.0), MetricValue::Value(2.5));
    }

    #[test]
    fn test_metric_value_display_and_serde() {
        assert_eq!(MetricValue::Undefined.to_string(), "-");
        assert_eq!(MetricValue::Value(1200.0).to_string(), "1200.0");

        let pm = PerformanceMetrics {
            trs: MetricValue::Undefined,
            mtbf: MetricValue::Value(120.0),
            mttr: MetricValue::Value(2.5),
        };
        let json = serde_json::to_string(&pm).unwrap();
        assert_eq!(json, r#"{"trs":null,"mtbf":120.0,"mttr":2.5}"#);
        let back: PerformanceMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pm);
    }

    #[test]
    fn test_metric_value_reads_dash_text() {
        let v: MetricValue = serde_json::from_str("\"-\"").unwrap();
        assert_eq!(v, MetricValue::Undefined);
        let v: MetricValue = serde_json::from_str("\"82.5\"").unwrap();
        assert_eq!(v, MetricValue::Value(82.5));
        let pm: PerformanceMetrics = serde_json::from_str(r#"{"mtbf":130}"#).unwrap();
        assert_eq!(pm.trs, MetricValue::Undefined);
        assert_eq!(pm.mtbf, MetricValue::Value(130.0));
    }

    #[test]
    fn test_trs_components() {
        let c = TrsComponents {
            availability: 0.9,
            performance: 0.95,
            quality: 0.99,
        };
        assert!((c.trs_percent() - 84.645).abs() < 1e-9);

        let over = TrsComponents {
            availability: 1.4,
            performance: 1.0,
            quality: -0.2,
        };
        assert_eq!(over.trs_percent(), 0.0);
    }
}
