// ==========================================
// 设备维护管理系统 - 应用层
// ==========================================
// 职责: 组装存储 / 配置 / API，运行仪表盘轮询
// ==========================================

pub mod refresh;
pub mod state;

// 重导出
pub use refresh::{DashboardRefresher, RefreshHandle};
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
