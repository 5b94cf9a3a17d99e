// ==========================================
// 设备维护管理系统 - 设备 API
// ==========================================
// 职责: 设备列表筛选、详情、新建、编辑、删除（级联）
// 红线: 删除设备必须同时删除其全部干预并重算指标缓存
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::equipment::{Equipment, EquipmentDraft};
use crate::domain::intervention::Intervention;
use crate::domain::types::EquipmentStatus;
use crate::repository::EntityStore;

/// 设备列表筛选条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFilter {
    /// 匹配名称 / ID / 位置 / 类型（不区分大小写）
    pub search: Option<String>,
    pub status: Option<EquipmentStatus>,
}

impl EquipmentFilter {
    pub fn matches(&self, equipment: &Equipment) -> bool {
        if let Some(status) = self.status {
            if equipment.status != status {
                return false;
            }
        }
        match normalized_search(self.search.as_deref()) {
            Some(needle) => [
                &equipment.name,
                &equipment.id,
                &equipment.location,
                &equipment.equipment_type,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle)),
            None => true,
        }
    }
}

/// 搜索词规整：去空白、转小写；空串视为不筛选
pub(crate) fn normalized_search(search: Option<&str>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// 设备详情（含该设备的干预历史，按开始时间倒序）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDetail {
    pub equipment: Equipment,
    pub interventions: Vec<Intervention>,
}

// ==========================================
// EquipmentApi - 设备 API
// ==========================================
pub struct EquipmentApi {
    store: Arc<EntityStore>,
}

impl EquipmentApi {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    pub fn list_equipment(&self, filter: &EquipmentFilter) -> Vec<Equipment> {
        self.store
            .load_equipment()
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect()
    }

    pub fn get_equipment(&self, id: &str) -> ApiResult<Equipment> {
        self.store
            .find_equipment(id)
            .ok_or_else(|| ApiError::NotFound(format!("设备(id={})不存在", id)))
    }

    pub fn get_equipment_detail(&self, id: &str) -> ApiResult<EquipmentDetail> {
        let equipment = self.get_equipment(id)?;
        let mut interventions = self.store.interventions_for_equipment(id);
        interventions.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(EquipmentDetail {
            equipment,
            interventions,
        })
    }

    /// 新建设备，ID 按 EQnnn 顺延
    pub fn create_equipment(&self, draft: EquipmentDraft) -> ApiResult<Equipment> {
        validate_draft(&draft)?;
        let equipment = self.store.insert_new_equipment(|id| draft.into_equipment(id))?;

        tracing::info!(equipment_id = %equipment.id, name = %equipment.name, "设备已创建");
        Ok(equipment)
    }

    /// 编辑设备（ID 不变）
    pub fn update_equipment(&self, id: &str, draft: EquipmentDraft) -> ApiResult<Equipment> {
        validate_draft(&draft)?;
        self.get_equipment(id)?;
        let equipment = draft.into_equipment(id.to_string());
        self.store.upsert_equipment(equipment.clone())?;

        tracing::info!(equipment_id = id, "设备已更新");
        Ok(equipment)
    }

    /// 删除设备及其全部干预
    ///
    /// # 返回
    /// 级联删除的干预数
    pub fn delete_equipment(&self, id: &str, now: DateTime<Utc>) -> ApiResult<usize> {
        if id.trim().is_empty() {
            return Err(ApiError::InvalidInput("设备ID不能为空".to_string()));
        }
        Ok(self.store.delete_equipment(id, now)?)
    }
}

fn validate_draft(draft: &EquipmentDraft) -> ApiResult<()> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("设备名称不能为空".to_string()));
    }
    if let (Some(last), Some(next)) = (draft.last_maintenance_date, draft.next_maintenance_date) {
        if next < last {
            return Err(ApiError::InvalidInput(format!(
                "下次维护日期({})早于上次维护日期({})",
                next, last
            )));
        }
    }
    Ok(())
}
