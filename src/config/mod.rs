// ==========================================
// 设备维护管理系统 - 配置层
// ==========================================
// 职责: 运行参数读取与覆写
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
