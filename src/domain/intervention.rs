// ==========================================
// 设备维护管理系统 - 干预（维护工单）实体
// ==========================================
// 存储键: interventions (整表快照)
// 红线: end_date 有值 ⇔ status == completed
// 说明: equipment_name 为创建时的冗余快照，设备改名后允许不一致
// 单位: duration 统一为小时 (f64)，分钟输入在 API 边界换算
// ==========================================

use crate::domain::dates::{iso_datetime, iso_datetime_opt};
use crate::domain::types::{InterventionStatus, InterventionType, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 干预中使用的备件记录（仅记录，不联动库存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePartUsage {
    pub id: String,
    pub name: String,
    pub quantity: u32,
}

/// 干预（维护工单）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub equipment_id: String,
    #[serde(default)]
    pub equipment_name: String,
    #[serde(rename = "type")]
    pub intervention_type: InterventionType,
    pub status: InterventionStatus,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(with = "iso_datetime", alias = "date")]
    pub start_date: DateTime<Utc>,
    #[serde(default, with = "iso_datetime_opt")]
    pub end_date: Option<DateTime<Utc>>,
    /// 持续时间（小时）
    #[serde(rename = "duration", default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub technicians: Vec<String>,
    #[serde(default)]
    pub causes_of_failure: Vec<String>,
    #[serde(default)]
    pub spare_parts: Vec<SparePartUsage>,
    #[serde(default)]
    pub notes: Vec<String>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

/// 分钟 → 小时（表单输入边界换算）
pub fn minutes_to_hours(minutes: f64) -> f64 {
    minutes / 60.0
}

impl Intervention {
    pub fn is_corrective(&self) -> bool {
        self.intervention_type == InterventionType::Corrective
    }

    pub fn is_completed(&self) -> bool {
        self.status == InterventionStatus::Completed
    }

    /// 可计入 MTTR 的修复时长（已完成且有持续时间）
    pub fn repair_hours(&self) -> Option<f64> {
        if self.is_completed() {
            self.duration_hours
        } else {
            None
        }
    }

    /// 校验实体不变量
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("干预ID不能为空".to_string());
        }
        if self.title.trim().is_empty() {
            return Err(format!("干预 {} 标题不能为空", self.id));
        }
        if self.equipment_id.trim().is_empty() {
            return Err(format!("干预 {} 未关联设备", self.id));
        }
        if self.end_date.is_some() != self.is_completed() {
            return Err(format!(
                "干预 {} 结束时间与状态不一致: status={}, end_date={}",
                self.id,
                self.status,
                if self.end_date.is_some() { "有" } else { "无" }
            ));
        }
        if let Some(d) = self.duration_hours {
            if !d.is_finite() || d < 0.0 {
                return Err(format!("干预 {} 持续时间无效: {}", self.id, d));
            }
        }
        Ok(())
    }
}

/// 干预表单输入
///
/// 表单的持续时间以分钟填写，入库前换算为小时。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionDraft {
    pub title: String,
    pub description: String,
    pub equipment_id: String,
    #[serde(rename = "type")]
    pub intervention_type: InterventionType,
    pub priority: Priority,
    pub start_date: DateTime<Utc>,
    pub duration_minutes: Option<f64>,
    pub technicians: Vec<String>,
    pub causes_of_failure: Vec<String>,
    pub spare_parts: Vec<SparePartUsage>,
}

impl InterventionDraft {
    /// 生成新干预；状态默认 scheduled，设备名取创建时刻的快照
    pub fn into_intervention(self, id: String, equipment_name: String) -> Intervention {
        Intervention {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            equipment_id: self.equipment_id,
            equipment_name,
            intervention_type: self.intervention_type,
            status: InterventionStatus::Scheduled,
            priority: self.priority,
            start_date: self.start_date,
            end_date: None,
            duration_hours: self.duration_minutes.map(minutes_to_hours),
            technicians: self
                .technicians
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            causes_of_failure: self.causes_of_failure,
            spare_parts: self.spare_parts,
            notes: Vec::new(),
        }
    }
}
