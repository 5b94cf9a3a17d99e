// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、固定时间、实体构造
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use maintenance_cmms::domain::{
    CriticalityLevel, Equipment, EquipmentStatus, Intervention, InterventionStatus,
    InterventionType, Priority, SparePart,
};
use maintenance_cmms::repository::{EntityStore, MemoryKvStore, SqliteKvStore};
use tempfile::NamedTempFile;

/// 创建临时测试数据库
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();
    Ok((temp_file, db_path))
}

/// SQLite 支撑的实体存储（返回临时文件以保持存活）
pub fn sqlite_store() -> (NamedTempFile, String, Arc<EntityStore>) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let kv = SqliteKvStore::new(&db_path).expect("Failed to open kv store");
    (temp_file, db_path, Arc::new(EntityStore::new(Arc::new(kv))))
}

/// 内存实体存储
pub fn memory_store() -> Arc<EntityStore> {
    Arc::new(EntityStore::new(Arc::new(MemoryKvStore::new())))
}

/// 固定的 "当前时间"
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn equipment(id: &str, installed_days_ago: i64, now: DateTime<Utc>) -> Equipment {
    Equipment {
        id: id.to_string(),
        name: format!("Pompe {}", id),
        equipment_type: "Pompe".to_string(),
        location: "Atelier 1".to_string(),
        manufacturer: "Grundfos".to_string(),
        model: "CR-10".to_string(),
        serial_number: format!("SN-{}", id),
        status: EquipmentStatus::Operational,
        criticality_level: CriticalityLevel::High,
        installation_date: Some(now.date_naive() - Duration::days(installed_days_ago)),
        last_maintenance_date: None,
        next_maintenance_date: None,
    }
}

pub fn intervention(
    id: &str,
    equipment_id: &str,
    intervention_type: InterventionType,
    status: InterventionStatus,
    start_date: DateTime<Utc>,
) -> Intervention {
    Intervention {
        id: id.to_string(),
        title: format!("Intervention {}", id),
        description: String::new(),
        equipment_id: equipment_id.to_string(),
        equipment_name: format!("Pompe {}", equipment_id),
        intervention_type,
        status,
        priority: Priority::Medium,
        start_date,
        end_date: (status == InterventionStatus::Completed).then(|| start_date + Duration::hours(2)),
        duration_hours: None,
        technicians: vec!["Martin".to_string()],
        causes_of_failure: Vec::new(),
        spare_parts: Vec::new(),
        notes: Vec::new(),
    }
}

pub fn spare_part(id: &str, current_stock: u32, minimum_stock: u32) -> SparePart {
    SparePart {
        id: id.to_string(),
        reference: format!("REF-{}", id),
        name: format!("Pièce {}", id),
        description: String::new(),
        supplier: "SKF".to_string(),
        category: "Mécanique".to_string(),
        location: "A-12".to_string(),
        current_stock,
        minimum_stock,
        unit_price: 10.0,
        last_restock_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    }
}
