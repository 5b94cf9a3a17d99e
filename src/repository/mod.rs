// ==========================================
// 设备维护管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含指标计算以外的业务逻辑
// ==========================================
// 职责: 键值持久化 + 三类实体集合的读写
// 约束: 读取失败降级为空集合，写入失败向上返回
// ==========================================

pub mod entity_store;
pub mod error;
pub mod kv_store;

// 重导出核心仓储
pub use entity_store::{
    EntityStore, InitReport, StoreCommit, StoreSnapshot, EQUIPMENT_ID_PREFIX, SPARE_PART_ID_PREFIX,
};
pub use error::{RepositoryError, RepositoryResult};
pub use kv_store::{keys, KeyValueStore, MemoryKvStore, SqliteKvStore};
