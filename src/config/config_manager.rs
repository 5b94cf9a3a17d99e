// ==========================================
// 设备维护管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 说明: 配置缺失或无法解析时使用默认值，不报错
// ==========================================

use crate::db::{ensure_schema, open_in_memory_connection, open_sqlite_connection};
use crate::engine::PerformanceTargets;
use crate::generator::DEFAULT_EQUIPMENT_COUNT;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认刷新间隔（秒）
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5;

/// 默认 "最近干预" 条数
pub const DEFAULT_RECENT_INTERVENTIONS_LIMIT: usize = 5;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 内存库（测试 / 临时会话）
    pub fn in_memory() -> Result<Self, Box<dyn Error>> {
        let conn = open_in_memory_connection()?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager（与键值存储共用连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入（覆写）一个 global 配置项
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let key = key.trim();
        if key.is_empty() {
            return Err("配置键不能为空".into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON 格式，按键排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取并解析配置；缺失或格式错误时返回默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let raw = match self.get_global_config_value(key)? {
            Some(raw) => raw,
            None => return Ok(default),
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    // ===== 运行参数 =====

    /// 仪表盘轮询间隔（下限 1 秒）
    pub fn get_refresh_interval(&self) -> Result<Duration, Box<dyn Error>> {
        let secs = self.get_parsed_or(
            config_keys::REFRESH_INTERVAL_SECS,
            DEFAULT_REFRESH_INTERVAL_SECS,
        )?;
        Ok(Duration::from_secs(secs.max(1)))
    }

    /// 首次初始化时生成的设备数量
    pub fn get_mock_equipment_count(&self) -> Result<usize, Box<dyn Error>> {
        self.get_parsed_or(config_keys::MOCK_EQUIPMENT_COUNT, DEFAULT_EQUIPMENT_COUNT)
    }

    pub fn get_recent_interventions_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_parsed_or(
            config_keys::RECENT_INTERVENTIONS_LIMIT,
            DEFAULT_RECENT_INTERVENTIONS_LIMIT,
        )
    }

    // ===== 性能目标 =====

    pub fn get_performance_targets(&self) -> Result<PerformanceTargets, Box<dyn Error>> {
        let defaults = PerformanceTargets::default();
        Ok(PerformanceTargets {
            trs_pct: self.get_parsed_or(config_keys::TARGET_TRS_PCT, defaults.trs_pct)?,
            mtbf_hours: self.get_parsed_or(config_keys::TARGET_MTBF_HOURS, defaults.mtbf_hours)?,
            mttr_hours: self.get_parsed_or(config_keys::TARGET_MTTR_HOURS, defaults.mttr_hours)?,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 刷新
    pub const REFRESH_INTERVAL_SECS: &str = "refresh_interval_secs";

    // 初始化
    pub const MOCK_EQUIPMENT_COUNT: &str = "mock_equipment_count";

    // 仪表盘
    pub const RECENT_INTERVENTIONS_LIMIT: &str = "recent_interventions_limit";

    // 性能目标
    pub const TARGET_TRS_PCT: &str = "target_trs_pct";
    pub const TARGET_MTBF_HOURS: &str = "target_mtbf_hours";
    pub const TARGET_MTTR_HOURS: &str = "target_mttr_hours";
}
