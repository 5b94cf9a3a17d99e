// ==========================================
// 设备维护管理系统 - 领域模型层
// ==========================================
// 职责: 定义实体、枚举、指标值对象及日期序列化规则
// 红线: 不含存储访问逻辑,不含指标计算逻辑
// ==========================================

pub mod dates;
pub mod equipment;
pub mod intervention;
pub mod metrics;
pub mod spare_part;
pub mod types;

// 重导出核心类型
pub use equipment::{Equipment, EquipmentDraft};
pub use intervention::{minutes_to_hours, Intervention, InterventionDraft, SparePartUsage};
pub use metrics::{
    DashboardStats, EquipmentIndicators, MaintenanceEvent, MetricValue, ParetoItem,
    PerformanceMetrics, RankedParetoItem, TrsComponents,
};
pub use spare_part::{SparePart, SparePartDraft};
pub use types::{
    CriticalityLevel, DisplayStatus, EquipmentStatus, IndicatorGrade, InterventionStatus,
    InterventionType, Priority,
};
