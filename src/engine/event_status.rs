// ==========================================
// 设备维护管理系统 - 维护事件状态派生
// ==========================================
// 职责: 存储状态 + 开始时间 + 当前时间 → 显示状态
// 红线: 读取时计算，不缓存（干预会因时间流逝自动变为逾期）
// ==========================================
// 规则:
// - completed   → completed
// - in-progress → in-progress
// - scheduled, start < now  → overdue
// - scheduled, start >= now → planned
// - canceled    → 不出现在维护事件视图
// ==========================================

use crate::domain::intervention::Intervention;
use crate::domain::metrics::MaintenanceEvent;
use crate::domain::types::{DisplayStatus, InterventionStatus};
use chrono::{DateTime, NaiveDate, Utc};

pub struct EventStatusEngine {
    // 无状态引擎
}

impl EventStatusEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 派生显示状态；canceled 返回 None
    pub fn derive(&self, intervention: &Intervention, now: DateTime<Utc>) -> Option<DisplayStatus> {
        match intervention.status {
            InterventionStatus::Completed => Some(DisplayStatus::Completed),
            InterventionStatus::InProgress => Some(DisplayStatus::InProgress),
            InterventionStatus::Scheduled if intervention.start_date < now => {
                Some(DisplayStatus::Overdue)
            }
            InterventionStatus::Scheduled => Some(DisplayStatus::Planned),
            InterventionStatus::Canceled => None,
        }
    }

    /// 生成维护事件视图（排除 canceled，保持输入顺序）
    pub fn to_events(&self, interventions: &[Intervention], now: DateTime<Utc>) -> Vec<MaintenanceEvent> {
        interventions
            .iter()
            .filter_map(|it| {
                self.derive(it, now).map(|status| MaintenanceEvent {
                    id: it.id.clone(),
                    title: it.title.clone(),
                    date: it.start_date,
                    equipment_id: it.equipment_id.clone(),
                    equipment_name: it.equipment_name.clone(),
                    event_type: it.intervention_type,
                    status,
                    duration: it.duration_hours,
                })
            })
            .collect()
    }

    /// 某日的事件（按 UTC 日历日匹配）
    pub fn events_on<'a>(
        &self,
        events: &'a [MaintenanceEvent],
        date: NaiveDate,
    ) -> Vec<&'a MaintenanceEvent> {
        events.iter().filter(|e| e.date.date_naive() == date).collect()
    }

    /// 日历日标记
    ///
    /// 优先级: 有逾期 → overdue；有进行中 → in-progress；全部完成 → completed；否则 planned。
    /// 当日无事件返回 None。
    pub fn day_marker(&self, events: &[MaintenanceEvent], date: NaiveDate) -> Option<DisplayStatus> {
        let day = self.events_on(events, date);
        if day.is_empty() {
            return None;
        }
        if day.iter().any(|e| e.status == DisplayStatus::Overdue) {
            return Some(DisplayStatus::Overdue);
        }
        if day.iter().any(|e| e.status == DisplayStatus::InProgress) {
            return Some(DisplayStatus::InProgress);
        }
        if day.iter().all(|e| e.status == DisplayStatus::Completed) {
            return Some(DisplayStatus::Completed);
        }
        Some(DisplayStatus::Planned)
    }
}

impl Default for EventStatusEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 最近的干预（按开始时间倒序，取前 limit 条）
pub fn recent_interventions(interventions: &[Intervention], limit: usize) -> Vec<Intervention> {
    let mut sorted: Vec<Intervention> = interventions.to_vec();
    sorted.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{InterventionType, Priority};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn intervention(id: &str, status: InterventionStatus, start: DateTime<Utc>) -> Intervention {
        Intervention {
            id: id.to_string(),
            title: format!("Intervention {}", id),
            description: String::new(),
            equipment_id: "EQ001".to_string(),
            equipment_name: "Pompe A1".to_string(),
            intervention_type: InterventionType::Preventive,
            status,
            priority: Priority::Medium,
            start_date: start,
            end_date: (status == InterventionStatus::Completed).then_some(start),
            duration_hours: Some(2.0),
            technicians: vec![],
            causes_of_failure: vec![],
            spare_parts: vec![],
            notes: vec![],
        }
    }

    #[test]
    fn test_derive_rules() {
        let engine = EventStatusEngine::new();
        let past = now() - Duration::hours(1);
        let future = now() + Duration::hours(1);

        assert_eq!(
            engine.derive(&intervention("a", InterventionStatus::Completed, past), now()),
            Some(DisplayStatus::Completed)
        );
        assert_eq!(
            engine.derive(&intervention("b", InterventionStatus::InProgress, past), now()),
            Some(DisplayStatus::InProgress)
        );
        assert_eq!(
            engine.derive(&intervention("c", InterventionStatus::Scheduled, past), now()),
            Some(DisplayStatus::Overdue)
        );
        assert_eq!(
            engine.derive(&intervention("d", InterventionStatus::Scheduled, future), now()),
            Some(DisplayStatus::Planned)
        );
        assert_eq!(
            engine.derive(&intervention("e", InterventionStatus::Canceled, future), now()),
            None
        );
    }

    #[test]
    fn test_start_equal_to_now_is_planned() {
        let engine = EventStatusEngine::new();
        let it = intervention("a", InterventionStatus::Scheduled, now());
        assert_eq!(engine.derive(&it, now()), Some(DisplayStatus::Planned));
    }

    #[test]
    fn test_becomes_overdue_with_time() {
        let engine = EventStatusEngine::new();
        let it = intervention("a", InterventionStatus::Scheduled, now() + Duration::days(1));
        assert_eq!(engine.derive(&it, now()), Some(DisplayStatus::Planned));
        assert_eq!(
            engine.derive(&it, now() + Duration::days(2)),
            Some(DisplayStatus::Overdue)
        );
    }

    #[test]
    fn test_to_events_excludes_canceled() {
        let engine = EventStatusEngine::new();
        let list = vec![
            intervention("a", InterventionStatus::Scheduled, now()),
            intervention("b", InterventionStatus::Canceled, now()),
            intervention("c", InterventionStatus::Completed, now()),
        ];
        let events = engine.to_events(&list, now());
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_day_marker_priority() {
        let engine = EventStatusEngine::new();
        let today = now().date_naive();
        let morning = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();

        let list = vec![
            intervention("a", InterventionStatus::Completed, morning),
            intervention("b", InterventionStatus::Scheduled, evening),
        ];
        let events = engine.to_events(&list, now());
        assert_eq!(engine.day_marker(&events, today), Some(DisplayStatus::Planned));

        let list = vec![
            intervention("a", InterventionStatus::Completed, morning),
            intervention("b", InterventionStatus::Scheduled, morning),
            intervention("c", InterventionStatus::InProgress, evening),
        ];
        let events = engine.to_events(&list, now());
        assert_eq!(engine.day_marker(&events, today), Some(DisplayStatus::Overdue));

        let list = vec![intervention("a", InterventionStatus::Completed, morning)];
        let events = engine.to_events(&list, now());
        assert_eq!(engine.day_marker(&events, today), Some(DisplayStatus::Completed));
        assert_eq!(engine.day_marker(&events, today + Duration::days(1)), None);
    }

    #[test]
    fn test_recent_interventions_sorted_desc() {
        let list = vec![
            intervention("old", InterventionStatus::Completed, now() - Duration::days(3)),
            intervention("new", InterventionStatus::Scheduled, now() + Duration::days(1)),
            intervention("mid", InterventionStatus::InProgress, now()),
        ];
        let recent = recent_interventions(&list, 2);
        let ids: Vec<&str> = recent.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);
    }
}
