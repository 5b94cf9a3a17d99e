// ==========================================
// 设备维护管理系统 - 干预 API
// ==========================================
// 职责: 干预新建、编辑、生命周期变更、备注、删除、日历视图
// 红线: end_date 有值 ⇔ status == completed（写入前校验）
// 单位: 表单持续时间为分钟，此处换算为小时入库
// ==========================================
// 生命周期:
// scheduled → in-progress → completed
// scheduled / in-progress → canceled
// scheduled → completed（直接完工）
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::intervention::{minutes_to_hours, Intervention, InterventionDraft};
use crate::domain::metrics::MaintenanceEvent;
use crate::domain::types::{DisplayStatus, InterventionStatus, InterventionType};
use crate::engine::EventStatusEngine;
use crate::repository::EntityStore;

/// 设备已删除时的显示占位
pub const UNKNOWN_EQUIPMENT_LABEL: &str = "Équipement inconnu";

/// 干预列表筛选条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionFilter {
    pub status: Option<InterventionStatus>,
    #[serde(rename = "type")]
    pub intervention_type: Option<InterventionType>,
    pub equipment_id: Option<String>,
}

impl InterventionFilter {
    pub fn matches(&self, intervention: &Intervention) -> bool {
        self.status.map_or(true, |s| intervention.status == s)
            && self
                .intervention_type
                .map_or(true, |t| intervention.intervention_type == t)
            && self
                .equipment_id
                .as_deref()
                .map_or(true, |id| intervention.equipment_id == id)
    }
}

// ==========================================
// InterventionApi - 干预 API
// ==========================================
pub struct InterventionApi {
    store: Arc<EntityStore>,
    status_engine: EventStatusEngine,
}

impl InterventionApi {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self {
            store,
            status_engine: EventStatusEngine::new(),
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 筛选后按开始时间倒序
    pub fn list_interventions(&self, filter: &InterventionFilter) -> Vec<Intervention> {
        let mut list: Vec<Intervention> = self
            .store
            .load_interventions()
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect();
        list.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        list
    }

    pub fn get_intervention(&self, id: &str) -> ApiResult<Intervention> {
        self.store
            .find_intervention(id)
            .ok_or_else(|| ApiError::NotFound(format!("干预(id={})不存在", id)))
    }

    /// 干预所属设备的显示名称
    ///
    /// 优先取创建时的设备名快照；快照为空才查当前设备，设备已删除则用占位文本。
    pub fn equipment_label(&self, intervention: &Intervention) -> String {
        if !intervention.equipment_name.trim().is_empty() {
            return intervention.equipment_name.clone();
        }
        self.store
            .find_equipment(&intervention.equipment_id)
            .map(|eq| eq.name)
            .unwrap_or_else(|| UNKNOWN_EQUIPMENT_LABEL.to_string())
    }

    // ==========================================
    // 新建 / 编辑
    // ==========================================

    /// 新建干预（状态 scheduled，设备名取当前快照）
    pub fn create_intervention(
        &self,
        draft: InterventionDraft,
        now: DateTime<Utc>,
    ) -> ApiResult<Intervention> {
        validate_draft(&draft)?;
        let equipment = self.store.find_equipment(&draft.equipment_id).ok_or_else(|| {
            ApiError::InvalidInput(format!("关联设备(id={})不存在", draft.equipment_id))
        })?;

        let id = format!("INT-{}", Uuid::new_v4().simple());
        let intervention = draft.into_intervention(id, equipment.name);
        self.store.upsert_intervention(intervention.clone(), now)?;

        tracing::info!(
            intervention_id = %intervention.id,
            equipment_id = %intervention.equipment_id,
            intervention_type = %intervention.intervention_type,
            "干预已创建"
        );
        Ok(intervention)
    }

    /// 编辑干预的表单字段；状态、结束时间、备注保持不变
    ///
    /// 更换关联设备时刷新设备名快照，否则保留原快照。
    pub fn update_intervention(
        &self,
        id: &str,
        draft: InterventionDraft,
        now: DateTime<Utc>,
    ) -> ApiResult<Intervention> {
        validate_draft(&draft)?;
        let existing = self.get_intervention(id)?;

        let equipment_name = if draft.equipment_id == existing.equipment_id {
            existing.equipment_name.clone()
        } else {
            self.store
                .find_equipment(&draft.equipment_id)
                .map(|e| e.name)
                .ok_or_else(|| {
                    ApiError::InvalidInput(format!("关联设备(id={})不存在", draft.equipment_id))
                })?
        };

        let mut updated = draft.into_intervention(existing.id.clone(), equipment_name);
        updated.status = existing.status;
        updated.end_date = existing.end_date;
        updated.notes = existing.notes;
        if updated.duration_hours.is_none() {
            updated.duration_hours = existing.duration_hours;
        }
        self.store.upsert_intervention(updated.clone(), now)?;

        tracing::info!(intervention_id = id, "干预已更新");
        Ok(updated)
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// scheduled → in-progress
    pub fn start_intervention(&self, id: &str, at: DateTime<Utc>) -> ApiResult<Intervention> {
        Ok(self
            .store
            .transition_intervention(id, InterventionStatus::InProgress, at, None)?)
    }

    /// → completed，写入结束时间；时长（分钟）可选
    pub fn complete_intervention(
        &self,
        id: &str,
        at: DateTime<Utc>,
        duration_minutes: Option<f64>,
    ) -> ApiResult<Intervention> {
        if let Some(minutes) = duration_minutes {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(ApiError::InvalidInput(format!("持续时间无效: {}", minutes)));
            }
        }
        Ok(self.store.transition_intervention(
            id,
            InterventionStatus::Completed,
            at,
            duration_minutes.map(minutes_to_hours),
        )?)
    }

    /// scheduled / in-progress → canceled
    pub fn cancel_intervention(&self, id: &str, at: DateTime<Utc>) -> ApiResult<Intervention> {
        Ok(self
            .store
            .transition_intervention(id, InterventionStatus::Canceled, at, None)?)
    }

    pub fn add_note(&self, id: &str, note: &str) -> ApiResult<Intervention> {
        if note.trim().is_empty() {
            return Err(ApiError::InvalidInput("备注不能为空".to_string()));
        }
        Ok(self.store.add_intervention_note(id, note)?)
    }

    pub fn delete_intervention(&self, id: &str, now: DateTime<Utc>) -> ApiResult<()> {
        Ok(self.store.delete_intervention(id, now)?)
    }

    // ==========================================
    // 日历视图
    // ==========================================

    /// 维护事件（显示状态按 `now` 现算，canceled 不出现）
    pub fn maintenance_events(&self, now: DateTime<Utc>) -> Vec<MaintenanceEvent> {
        self.status_engine
            .to_events(&self.store.load_interventions(), now)
    }

    /// 某日的事件
    pub fn events_on(&self, date: NaiveDate, now: DateTime<Utc>) -> Vec<MaintenanceEvent> {
        let events = self.maintenance_events(now);
        self.status_engine
            .events_on(&events, date)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 日历日标记
    pub fn day_marker(&self, date: NaiveDate, now: DateTime<Utc>) -> Option<DisplayStatus> {
        let events = self.maintenance_events(now);
        self.status_engine.day_marker(&events, date)
    }
}

fn validate_draft(draft: &InterventionDraft) -> ApiResult<()> {
    if draft.title.trim().is_empty() {
        return Err(ApiError::InvalidInput("干预标题不能为空".to_string()));
    }
    if draft.equipment_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("必须选择关联设备".to_string()));
    }
    if let Some(minutes) = draft.duration_minutes {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(ApiError::InvalidInput(format!("持续时间无效: {}", minutes)));
        }
    }
    Ok(())
}
