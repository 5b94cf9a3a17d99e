// ==========================================
// 干预生命周期集成测试
// ==========================================
// 测试目标: 状态流转、完工联动设备、非法流转、备注、日历标记
// ==========================================

mod test_helpers;

use chrono::Duration;
use maintenance_cmms::api::{ApiError, InterventionFilter, UNKNOWN_EQUIPMENT_LABEL};
use maintenance_cmms::app::AppState;
use maintenance_cmms::domain::{
    DisplayStatus, EquipmentStatus, InterventionDraft, InterventionStatus, InterventionType,
    MetricValue, Priority,
};
use test_helpers::*;

fn state_with_equipment() -> AppState {
    let state = AppState::in_memory().expect("Failed to create AppState");
    let now = fixed_now();
    let mut broken = equipment("EQ1", 200, now);
    broken.status = EquipmentStatus::Breakdown;
    state
        .store
        .save_equipment(&[broken, equipment("EQ2", 50, now)])
        .unwrap();
    state
}

fn draft(equipment_id: &str) -> InterventionDraft {
    InterventionDraft {
        title: "Remplacement roulement".to_string(),
        description: "Bruit anormal".to_string(),
        equipment_id: equipment_id.to_string(),
        intervention_type: InterventionType::Corrective,
        priority: Priority::High,
        start_date: fixed_now() - Duration::hours(3),
        duration_minutes: Some(90.0),
        technicians: vec![" Martin ".to_string(), "".to_string()],
        causes_of_failure: vec!["Usure mécanique".to_string()],
        spare_parts: vec![],
    }
}

#[test]
fn test_create_snapshots_equipment_name_and_converts_minutes() {
    let state = state_with_equipment();
    let api = &state.intervention_api;

    let created = api.create_intervention(draft("EQ1"), fixed_now()).unwrap();
    assert_eq!(created.status, InterventionStatus::Scheduled);
    assert_eq!(created.equipment_name, "Pompe EQ1");
    assert_eq!(created.duration_hours, Some(1.5));
    assert_eq!(created.technicians, vec!["Martin"]);
    assert!(created.end_date.is_none());

    // 设备改名后快照与显示名都保持创建时的名称
    let mut eq = state.store.find_equipment("EQ1").unwrap();
    eq.name = "Pompe renommée".to_string();
    state.store.upsert_equipment(eq).unwrap();
    let stored = api.get_intervention(&created.id).unwrap();
    assert_eq!(stored.equipment_name, "Pompe EQ1");
    assert_eq!(api.equipment_label(&stored), "Pompe EQ1");
}

#[test]
fn test_equipment_label_falls_back_when_snapshot_empty() {
    let state = state_with_equipment();
    let api = &state.intervention_api;

    let mut created = api.create_intervention(draft("EQ1"), fixed_now()).unwrap();
    created.equipment_name = String::new();
    assert_eq!(api.equipment_label(&created), "Pompe EQ1");

    created.equipment_id = "EQ404".to_string();
    assert_eq!(api.equipment_label(&created), UNKNOWN_EQUIPMENT_LABEL);
}

#[test]
fn test_create_rejects_unknown_equipment() {
    let state = state_with_equipment();
    let err = state
        .intervention_api
        .create_intervention(draft("EQ404"), fixed_now())
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_full_lifecycle_restores_equipment() {
    let state = state_with_equipment();
    let api = &state.intervention_api;
    let now = fixed_now();

    let created = api.create_intervention(draft("EQ1"), fixed_now()).unwrap();
    let started = api.start_intervention(&created.id, now).unwrap();
    assert_eq!(started.status, InterventionStatus::InProgress);
    assert!(started.end_date.is_none());

    let done = api
        .complete_intervention(&created.id, now + Duration::hours(2), Some(120.0))
        .unwrap();
    assert_eq!(done.status, InterventionStatus::Completed);
    assert_eq!(done.end_date, Some(now + Duration::hours(2)));
    assert_eq!(done.duration_hours, Some(2.0));

    let eq = state.store.find_equipment("EQ1").unwrap();
    assert_eq!(eq.status, EquipmentStatus::Operational);
    assert_eq!(eq.last_maintenance_date, Some(now.date_naive()));
}

#[test]
fn test_intervention_writes_refresh_dashboard_metrics() {
    let state = state_with_equipment();
    let api = &state.intervention_api;
    let now = fixed_now();

    let created = api.create_intervention(draft("EQ1"), now).unwrap();
    let before = state.dashboard_api.get_dashboard_snapshot(now).unwrap();
    assert!(before.performance.mtbf.value.is_defined());
    assert_eq!(before.performance.mttr.value, MetricValue::Undefined);
    assert_eq!(before.pareto.len(), 1);
    assert_eq!(before.pareto[0].name, "Usure mécanique");

    api.start_intervention(&created.id, now).unwrap();
    api.complete_intervention(&created.id, now, Some(180.0)).unwrap();

    let after = state.dashboard_api.get_dashboard_snapshot(now).unwrap();
    assert_eq!(after.performance.mttr.value, MetricValue::Value(3.0));
    assert_eq!(state.dashboard_api.get_performance_metrics().mttr, MetricValue::Value(3.0));
}

#[test]
fn test_completion_keeps_standby_equipment_status() {
    let state = state_with_equipment();
    let mut eq = state.store.find_equipment("EQ2").unwrap();
    eq.status = EquipmentStatus::Standby;
    state.store.upsert_equipment(eq).unwrap();

    let created = state.intervention_api.create_intervention(draft("EQ2"), fixed_now()).unwrap();
    state
        .intervention_api
        .complete_intervention(&created.id, fixed_now(), None)
        .unwrap();
    assert_eq!(
        state.store.find_equipment("EQ2").unwrap().status,
        EquipmentStatus::Standby
    );
}

#[test]
fn test_invalid_transitions_are_rejected() {
    let state = state_with_equipment();
    let api = &state.intervention_api;
    let now = fixed_now();

    let created = api.create_intervention(draft("EQ2"), fixed_now()).unwrap();
    api.cancel_intervention(&created.id, now).unwrap();

    let err = api.start_intervention(&created.id, now).unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
    let err = api.complete_intervention(&created.id, now, None).unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));

    let stored = api.get_intervention(&created.id).unwrap();
    assert_eq!(stored.status, InterventionStatus::Canceled);
    assert!(stored.end_date.is_none());

    let err = api.start_intervention("INT-missing", now).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_notes_and_update_preserve_status() {
    let state = state_with_equipment();
    let api = &state.intervention_api;
    let created = api.create_intervention(draft("EQ1"), fixed_now()).unwrap();
    api.start_intervention(&created.id, fixed_now()).unwrap();
    api.add_note(&created.id, "  Roulement commandé ").unwrap();
    assert!(api.add_note(&created.id, "   ").is_err());

    let mut edit = draft("EQ2");
    edit.title = "Remplacement courroie".to_string();
    edit.duration_minutes = None;
    let updated = api.update_intervention(&created.id, edit, fixed_now()).unwrap();

    assert_eq!(updated.status, InterventionStatus::InProgress);
    assert_eq!(updated.notes, vec!["Roulement commandé"]);
    assert_eq!(updated.equipment_id, "EQ2");
    assert_eq!(updated.equipment_name, "Pompe EQ2");
    assert_eq!(updated.duration_hours, Some(1.5));
}

#[test]
fn test_filters_and_calendar() {
    let state = state_with_equipment();
    let api = &state.intervention_api;
    let now = fixed_now();

    let overdue = api.create_intervention(draft("EQ1"), fixed_now()).unwrap();
    let mut future = draft("EQ2");
    future.intervention_type = InterventionType::Preventive;
    future.start_date = now + Duration::days(2);
    api.create_intervention(future, fixed_now()).unwrap();

    let by_eq = api.list_interventions(&InterventionFilter {
        equipment_id: Some("EQ1".to_string()),
        ..InterventionFilter::default()
    });
    assert_eq!(by_eq.len(), 1);
    let preventive = api.list_interventions(&InterventionFilter {
        intervention_type: Some(InterventionType::Preventive),
        ..InterventionFilter::default()
    });
    assert_eq!(preventive.len(), 1);

    assert_eq!(
        api.day_marker(overdue.start_date.date_naive(), now),
        Some(DisplayStatus::Overdue)
    );
    assert_eq!(
        api.day_marker((now + Duration::days(2)).date_naive(), now),
        Some(DisplayStatus::Planned)
    );
    assert_eq!(api.events_on((now + Duration::days(2)).date_naive(), now).len(), 1);
}

#[test]
fn test_orphan_label_after_equipment_delete() {
    let state = state_with_equipment();
    let created = state.intervention_api.create_intervention(draft("EQ1"), fixed_now()).unwrap();

    // 直接写入孤立干预（设备不存在且无快照）
    let mut orphan = created.clone();
    orphan.equipment_id = "EQ999".to_string();
    orphan.equipment_name = String::new();
    assert_eq!(
        state.intervention_api.equipment_label(&orphan),
        UNKNOWN_EQUIPMENT_LABEL
    );

    state.equipment_api.delete_equipment("EQ1", fixed_now()).unwrap();
    assert!(state.intervention_api.get_intervention(&created.id).is_err());
}
