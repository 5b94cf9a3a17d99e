// ==========================================
// 设备维护管理系统 - 指标引擎层
// ==========================================
// 职责: 从实体快照计算派生指标
// 红线: 纯函数，无内部状态，无 I/O，不修改输入
// 红线: 空输入不报错；分母为 0 输出 "未定义"
// ==========================================

pub mod dashboard;
pub mod event_status;
pub mod pareto;
pub mod performance;
pub mod reliability;

// 重导出核心引擎
pub use dashboard::DashboardEngine;
pub use event_status::{recent_interventions, EventStatusEngine};
pub use pareto::{ParetoEngine, CAUSE_CATALOGUE};
pub use performance::{GradedIndicator, PerformanceGrader, PerformanceReport, PerformanceTargets};
pub use reliability::ReliabilityEngine;
