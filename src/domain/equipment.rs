// ==========================================
// 设备维护管理系统 - 设备实体
// ==========================================
// 存储键: equipment (整表快照)
// 红线: next_maintenance_date 仅供展示，不作为排程截止约束
// ==========================================

use crate::domain::dates::iso_date_opt;
use crate::domain::types::{CriticalityLevel, EquipmentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 设备
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,                              // 设备ID (如 EQ001)
    pub name: String,                            // 设备名称
    #[serde(rename = "type", default)]
    pub equipment_type: String,                  // 设备类型
    #[serde(default)]
    pub location: String,                        // 安装位置
    #[serde(default)]
    pub manufacturer: String,                    // 制造商
    #[serde(default)]
    pub model: String,                           // 型号
    #[serde(default)]
    pub serial_number: String,                   // 序列号
    pub status: EquipmentStatus,                 // 设备状态
    #[serde(default = "default_criticality")]
    pub criticality_level: CriticalityLevel,     // 关键等级
    #[serde(default, with = "iso_date_opt")]
    pub installation_date: Option<NaiveDate>,    // 投运日期
    #[serde(default, with = "iso_date_opt", alias = "lastMaintenance")]
    pub last_maintenance_date: Option<NaiveDate>, // 上次维护日期
    #[serde(default, with = "iso_date_opt", alias = "nextMaintenance")]
    pub next_maintenance_date: Option<NaiveDate>, // 下次维护日期
}

fn default_criticality() -> CriticalityLevel {
    CriticalityLevel::Medium
}

impl Equipment {
    /// 投运以来的运行小时数
    ///
    /// 缺少投运日期或时钟回拨导致结果 <= 0 时，钳制为 1 小时。
    pub fn operating_hours(&self, now: DateTime<Utc>) -> f64 {
        let hours = self
            .installation_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|start| (now.naive_utc() - start).num_seconds() as f64 / 3600.0)
            .unwrap_or(0.0);
        hours.max(1.0)
    }

    pub fn is_in_breakdown(&self) -> bool {
        self.status == EquipmentStatus::Breakdown
    }
}

/// 设备表单输入（新建 / 编辑共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub location: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub status: EquipmentStatus,
    pub criticality_level: CriticalityLevel,
    pub installation_date: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
}

impl EquipmentDraft {
    pub fn into_equipment(self, id: String) -> Equipment {
        Equipment {
            id,
            name: self.name.trim().to_string(),
            equipment_type: self.equipment_type,
            location: self.location,
            manufacturer: self.manufacturer,
            model: self.model,
            serial_number: self.serial_number,
            status: self.status,
            criticality_level: self.criticality_level,
            installation_date: self.installation_date,
            last_maintenance_date: self.last_maintenance_date,
            next_maintenance_date: self.next_maintenance_date,
        }
    }
}
