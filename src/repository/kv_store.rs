// ==========================================
// 设备维护管理系统 - 键值持久化
// ==========================================
// 职责: 按字符串键读写字符串值（实体集合的 JSON 快照）
// 约束: set_many 原子写入（同一事务内全部成功或全部回滚）
// 实现: SqliteKvStore (app_kv 表) / MemoryKvStore (测试、临时会话)
// ==========================================

use crate::db::{
    ensure_schema, open_in_memory_connection, open_sqlite_connection, read_schema_version,
    CURRENT_SCHEMA_VERSION,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 存储键
pub mod keys {
    pub const EQUIPMENT: &str = "equipment";
    pub const INTERVENTIONS: &str = "interventions";
    pub const SPARE_PARTS: &str = "spareParts";
    pub const PERFORMANCE_METRICS: &str = "performanceMetrics";
    pub const PARETO_CAUSES: &str = "paretoCauses";
}

/// 键值持久化协作方
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> RepositoryResult<()>;

    fn remove(&self, key: &str) -> RepositoryResult<()>;

    /// 原子写入多个键
    fn set_many(&self, entries: &[(String, String)]) -> RepositoryResult<()>;

    fn contains(&self, key: &str) -> RepositoryResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

// ==========================================
// SqliteKvStore
// ==========================================

pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKvStore {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = open_in_memory_connection()?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let store = Self { conn };
        {
            let guard = store.get_conn()?;
            ensure_schema(&guard)?;
            // 拒绝由更新版本程序写过的库
            if let Some(version) = read_schema_version(&guard)? {
                if version > CURRENT_SCHEMA_VERSION {
                    return Err(RepositoryError::DatabaseConnectionError(format!(
                        "数据库 schema_version={} 高于当前支持的 {}",
                        version, CURRENT_SCHEMA_VERSION
                    )));
                }
            }
        }
        Ok(store)
    }

    /// 共享连接（供 ConfigManager 复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

const UPSERT_SQL: &str = r#"
    INSERT INTO app_kv (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM app_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM app_kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn set_many(&self, entries: &[(String, String)]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        for (key, value) in entries {
            tx.execute(UPSERT_SQL, params![key, value])?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}

// ==========================================
// MemoryKvStore
// ==========================================

#[derive(Default)]
pub struct MemoryKvStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_data(&self) -> RepositoryResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.get_data()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.get_data()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RepositoryResult<()> {
        self.get_data()?.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(String, String)]) -> RepositoryResult<()> {
        // 持锁期间一次写完，对读者整体可见
        let mut data = self.get_data()?;
        for (key, value) in entries {
            data.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("equipment").unwrap(), None);
        assert!(!store.contains("equipment").unwrap());

        store.set("equipment", "[]").unwrap();
        assert_eq!(store.get("equipment").unwrap().as_deref(), Some("[]"));

        store.set("equipment", "[1]").unwrap();
        assert_eq!(store.get("equipment").unwrap().as_deref(), Some("[1]"));

        store
            .set_many(&[
                ("equipment".to_string(), "[2]".to_string()),
                ("interventions".to_string(), "[3]".to_string()),
            ])
            .unwrap();
        assert_eq!(store.get("equipment").unwrap().as_deref(), Some("[2]"));
        assert_eq!(store.get("interventions").unwrap().as_deref(), Some("[3]"));

        store.remove("equipment").unwrap();
        assert!(!store.contains("equipment").unwrap());
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryKvStore::new());
    }

    #[test]
    fn test_sqlite_store() {
        exercise(&SqliteKvStore::in_memory().unwrap());
    }

    #[test]
    fn test_rejects_newer_schema_version() {
        let conn = open_in_memory_connection().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION + 1],
        )
        .unwrap();

        let result = SqliteKvStore::from_connection(Arc::new(Mutex::new(conn)));
        assert!(matches!(result, Err(RepositoryError::DatabaseConnectionError(_))));
    }
}
