// ==========================================
// 设备维护管理系统 - 领域类型定义
// ==========================================
// 序列化格式: 与本地存储的 JSON 键值保持一致 (小写 / kebab-case)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 设备状态 (Equipment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Operational, // 运行中
    Maintenance, // 维护中
    Breakdown,   // 故障停机
    Standby,     // 备用
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 4] = [
        EquipmentStatus::Operational,
        EquipmentStatus::Maintenance,
        EquipmentStatus::Breakdown,
        EquipmentStatus::Standby,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "operational",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Breakdown => "breakdown",
            EquipmentStatus::Standby => "standby",
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| format!("未知设备状态: {}", s))
    }
}

// ==========================================
// 关键等级 (Criticality Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityLevel {
    Low,
    Medium,
    High,
}

impl CriticalityLevel {
    pub const ALL: [CriticalityLevel; 3] = [
        CriticalityLevel::Low,
        CriticalityLevel::Medium,
        CriticalityLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CriticalityLevel::Low => "low",
            CriticalityLevel::Medium => "medium",
            CriticalityLevel::High => "high",
        }
    }
}

impl fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 干预类型 (Intervention Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionType {
    Preventive, // 预防性维护
    Corrective, // 纠正性维护（故障）
}

impl InterventionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionType::Preventive => "preventive",
            InterventionType::Corrective => "corrective",
        }
    }
}

impl fmt::Display for InterventionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InterventionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "preventive" => Ok(InterventionType::Preventive),
            "corrective" => Ok(InterventionType::Corrective),
            other => Err(format!("未知干预类型: {}", other)),
        }
    }
}

// ==========================================
// 干预存储状态 (Intervention Status)
// ==========================================
// 红线: 只持久化这四种状态; planned/overdue 仅为派生显示状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterventionStatus {
    // 旧数据中写入的 planned/overdue 读取时归一为 scheduled
    #[serde(alias = "planned", alias = "overdue")]
    Scheduled,
    InProgress,
    Completed,
    Canceled,
}

impl InterventionStatus {
    pub const ALL: [InterventionStatus; 4] = [
        InterventionStatus::Scheduled,
        InterventionStatus::InProgress,
        InterventionStatus::Completed,
        InterventionStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionStatus::Scheduled => "scheduled",
            InterventionStatus::InProgress => "in-progress",
            InterventionStatus::Completed => "completed",
            InterventionStatus::Canceled => "canceled",
        }
    }

    /// 状态机: scheduled → in-progress → completed, scheduled/in-progress → canceled
    pub fn can_transition_to(&self, next: InterventionStatus) -> bool {
        use InterventionStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Completed)
                | (InProgress, Completed)
                | (Scheduled, Canceled)
                | (InProgress, Canceled)
        )
    }
}

impl fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InterventionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| format!("未知干预状态: {}", s))
    }
}

// ==========================================
// 优先级 (Priority)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 派生显示状态 (Display Status)
// ==========================================
// 依赖 "当前时间"，读取时计算，不可缓存，不可持久化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStatus {
    Planned,
    InProgress,
    Completed,
    Overdue,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Planned => "planned",
            DisplayStatus::InProgress => "in-progress",
            DisplayStatus::Completed => "completed",
            DisplayStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 指标评级 (Indicator Grade)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorGrade {
    Success, // 达标
    Warning, // 未达标
    Unknown, // 无数据
}

impl fmt::Display for IndicatorGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorGrade::Success => write!(f, "success"),
            IndicatorGrade::Warning => write!(f, "warning"),
            IndicatorGrade::Unknown => write!(f, "unknown"),
        }
    }
}
