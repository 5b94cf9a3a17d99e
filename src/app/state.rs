// ==========================================
// 设备维护管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 键值存储与配置共用同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::api::{DashboardApi, EquipmentApi, InterventionApi, SparePartApi};
use crate::config::ConfigManager;
use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::generator::MockDataGenerator;
use crate::repository::{EntityStore, InitReport, KeyValueStore, RepositoryResult, SqliteKvStore};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "MAINTENANCE_CMMS_DB";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径（内存库为 None）
    pub db_path: Option<String>,

    pub store: Arc<EntityStore>,
    pub config: Arc<ConfigManager>,

    pub equipment_api: Arc<EquipmentApi>,
    pub intervention_api: Arc<InterventionApi>,
    pub spare_part_api: Arc<SparePartApi>,
    pub dashboard_api: Arc<DashboardApi>,

    generator: MockDataGenerator,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let mut state = Self::from_connection(Arc::new(Mutex::new(conn)))?;
        state.db_path = Some(db_path);
        Ok(state)
    }

    /// 内存库（测试 / 临时会话）
    pub fn in_memory() -> Result<Self, String> {
        let conn = open_in_memory_connection()
            .map_err(|e| format!("无法打开内存数据库: {}", e))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        let kv = SqliteKvStore::from_connection(conn.clone())
            .map_err(|e| format!("无法创建键值存储: {}", e))?;
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        Ok(Self::with_store(Arc::new(kv), Arc::new(config)))
    }

    /// 由任意键值存储组装（配置仍走 SQLite）
    pub fn with_store(kv: Arc<dyn KeyValueStore>, config: Arc<ConfigManager>) -> Self {
        let store = Arc::new(EntityStore::new(kv));

        let equipment_api = Arc::new(EquipmentApi::new(store.clone()));
        let intervention_api = Arc::new(InterventionApi::new(store.clone()));
        let spare_part_api = Arc::new(SparePartApi::new(store.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(store.clone(), config.clone()));

        Self {
            db_path: None,
            store,
            config,
            equipment_api,
            intervention_api,
            spare_part_api,
            dashboard_api,
            generator: MockDataGenerator::new(),
        }
    }

    /// 首次启动时填充演示数据（设备数量取配置）
    pub fn initialize_if_empty(&self, now: DateTime<Utc>) -> RepositoryResult<InitReport> {
        let count = self.config.get_mock_equipment_count().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "读取设备数量配置失败，使用默认值");
            crate::generator::DEFAULT_EQUIPMENT_COUNT
        });
        self.store.initialize_if_empty(&self.generator, count, now)
    }
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 MAINTENANCE_CMMS_DB 非空时直接使用
/// - 否则: 用户数据目录/maintenance-cmms/maintenance_cmms.db
/// - 拿不到用户数据目录时: ./maintenance_cmms.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./maintenance_cmms.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("maintenance-cmms");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("maintenance_cmms.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_in_memory_state_initializes_once() {
        let state = AppState::in_memory().unwrap();
        let now = Utc::now();
        let first = state.initialize_if_empty(now).unwrap();
        assert_eq!(first.seeded_equipment, 42);
        assert!(state.initialize_if_empty(now).unwrap().is_noop());
    }
}
