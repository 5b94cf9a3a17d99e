// ==========================================
// 设备维护管理系统 - API 层
// ==========================================
// 职责: 为展示层提供调用入口，输入校验 + 错误转换
// ==========================================

pub mod dashboard_api;
pub mod equipment_api;
pub mod error;
pub mod intervention_api;
pub mod spare_part_api;

// 重导出
pub use dashboard_api::{DashboardApi, DashboardSnapshot};
pub use equipment_api::{EquipmentApi, EquipmentDetail, EquipmentFilter};
pub use error::{ApiError, ApiResult};
pub use intervention_api::{InterventionApi, InterventionFilter, UNKNOWN_EQUIPMENT_LABEL};
pub use spare_part_api::{SparePartApi, SparePartFilter, StockSummary};
