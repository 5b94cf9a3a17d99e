// ==========================================
// 设备维护管理系统 - 实体存储
// ==========================================
// 职责: 设备 / 干预 / 备件三个集合的唯一数据源
// 持久化: 整表快照（每次修改重写整个集合，不做增量合并）
// ==========================================
// 红线:
// - 读取失败降级为空集合并记录告警，不向调用方抛错
// - 多集合修改（设备级联删除）在同一次 commit 内原子写入
// - 指标缓存 (performanceMetrics / paretoCauses) 随干预写入与删除同步重算
// ==========================================

use crate::domain::equipment::Equipment;
use crate::domain::intervention::Intervention;
use crate::domain::metrics::{MetricValue, ParetoItem, PerformanceMetrics};
use crate::domain::spare_part::SparePart;
use crate::domain::types::{EquipmentStatus, InterventionStatus};
use crate::engine::{ParetoEngine, ReliabilityEngine};
use crate::generator::MockDataGenerator;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::kv_store::{keys, KeyValueStore};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// 设备ID前缀（EQ001, EQ002, ...）
pub const EQUIPMENT_ID_PREFIX: &str = "EQ";
/// 备件ID前缀（PDR001, PDR002, ...）
pub const SPARE_PART_ID_PREFIX: &str = "PDR";

// ==========================================
// StoreSnapshot - 某一时刻的三集合快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub equipment: Vec<Equipment>,
    pub interventions: Vec<Intervention>,
    pub spare_parts: Vec<SparePart>,
}

// ==========================================
// StoreCommit - 一次原子写入包含的集合
// ==========================================
#[derive(Debug, Default)]
pub struct StoreCommit {
    entries: Vec<(String, String)>,
}

impl StoreCommit {
    pub fn new() -> Self {
        Self::default()
    }

    fn put<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> RepositoryResult<Self> {
        let json = serde_json::to_string(value).map_err(|e| RepositoryError::SerializationError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.entries.retain(|(k, _)| k != key);
        self.entries.push((key.to_string(), json));
        Ok(self)
    }

    pub fn equipment(self, list: &[Equipment]) -> RepositoryResult<Self> {
        self.put(keys::EQUIPMENT, list)
    }

    pub fn interventions(self, list: &[Intervention]) -> RepositoryResult<Self> {
        self.put(keys::INTERVENTIONS, list)
    }

    pub fn spare_parts(self, list: &[SparePart]) -> RepositoryResult<Self> {
        self.put(keys::SPARE_PARTS, list)
    }

    pub fn performance_metrics(self, metrics: &PerformanceMetrics) -> RepositoryResult<Self> {
        self.put(keys::PERFORMANCE_METRICS, metrics)
    }

    pub fn pareto_causes(self, causes: &[ParetoItem]) -> RepositoryResult<Self> {
        self.put(keys::PARETO_CAUSES, causes)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 首次初始化结果（哪些键被填充）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub seeded_equipment: usize,
    pub seeded_interventions: usize,
    pub seeded_spare_parts: usize,
    pub seeded_performance_metrics: bool,
    pub seeded_pareto_causes: bool,
}

impl InitReport {
    pub fn is_noop(&self) -> bool {
        *self == InitReport::default()
    }
}

// ==========================================
// EntityStore
// ==========================================
pub struct EntityStore {
    kv: Arc<dyn KeyValueStore>,
    // 串行化 "读-改-写" 序列（刷新任务只读，不取此锁）
    write_lock: Mutex<()>,
}

impl EntityStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> RepositoryResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 读取（失败降级）
    // ==========================================

    /// 读取并反序列化一个键；缺失、存储错误、JSON 损坏均返回 None
    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "读取存储失败，按空数据处理");
                return None;
            }
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "存储数据解析失败，按空数据处理");
                None
            }
        }
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.read_key::<Vec<T>>(key).unwrap_or_default()
    }

    pub fn load_equipment(&self) -> Vec<Equipment> {
        self.load_collection(keys::EQUIPMENT)
    }

    pub fn load_interventions(&self) -> Vec<Intervention> {
        self.load_collection(keys::INTERVENTIONS)
    }

    pub fn load_spare_parts(&self) -> Vec<SparePart> {
        self.load_collection(keys::SPARE_PARTS)
    }

    pub fn load_pareto_causes(&self) -> Vec<ParetoItem> {
        self.load_collection(keys::PARETO_CAUSES)
    }

    /// 缓存的设备群性能；缺失或损坏时各项均为未定义
    pub fn load_performance_metrics(&self) -> PerformanceMetrics {
        self.read_key(keys::PERFORMANCE_METRICS).unwrap_or_default()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            equipment: self.load_equipment(),
            interventions: self.load_interventions(),
            spare_parts: self.load_spare_parts(),
        }
    }

    pub fn find_equipment(&self, id: &str) -> Option<Equipment> {
        self.load_equipment().into_iter().find(|e| e.id == id)
    }

    pub fn find_intervention(&self, id: &str) -> Option<Intervention> {
        self.load_interventions().into_iter().find(|i| i.id == id)
    }

    pub fn find_spare_part(&self, id: &str) -> Option<SparePart> {
        self.load_spare_parts().into_iter().find(|p| p.id == id)
    }

    pub fn interventions_for_equipment(&self, equipment_id: &str) -> Vec<Intervention> {
        self.load_interventions()
            .into_iter()
            .filter(|i| i.equipment_id == equipment_id)
            .collect()
    }

    // ==========================================
    // 写入（整表快照）
    // ==========================================

    /// 原子提交
    pub fn commit(&self, commit: StoreCommit) -> RepositoryResult<()> {
        if commit.is_empty() {
            return Ok(());
        }
        tracing::debug!(keys = ?commit.keys(), "提交存储快照");
        self.kv.set_many(&commit.entries)
    }

    pub fn save_equipment(&self, list: &[Equipment]) -> RepositoryResult<()> {
        self.commit(StoreCommit::new().equipment(list)?)
    }

    pub fn save_interventions(&self, list: &[Intervention]) -> RepositoryResult<()> {
        for it in list {
            it.validate().map_err(RepositoryError::ValidationError)?;
        }
        self.commit(StoreCommit::new().interventions(list)?)
    }

    pub fn save_spare_parts(&self, list: &[SparePart]) -> RepositoryResult<()> {
        for p in list {
            p.validate().map_err(RepositoryError::ValidationError)?;
        }
        self.commit(StoreCommit::new().spare_parts(list)?)
    }

    pub fn save_performance_metrics(&self, metrics: &PerformanceMetrics) -> RepositoryResult<()> {
        self.commit(StoreCommit::new().performance_metrics(metrics)?)
    }

    pub fn save_pareto_causes(&self, causes: &[ParetoItem]) -> RepositoryResult<()> {
        self.commit(StoreCommit::new().pareto_causes(causes)?)
    }

    /// 在写锁内分配下一个 EQnnn 并追加设备
    pub fn insert_new_equipment(
        &self,
        build: impl FnOnce(String) -> Equipment,
    ) -> RepositoryResult<Equipment> {
        let _guard = self.lock_writes()?;
        let mut list = self.load_equipment();
        let id = next_sequential_id(EQUIPMENT_ID_PREFIX, list.iter().map(|e| e.id.as_str()));
        let equipment = build(id);
        if list.iter().any(|e| e.id == equipment.id) {
            return Err(RepositoryError::ValidationError(format!(
                "设备ID重复: {}",
                equipment.id
            )));
        }
        list.push(equipment.clone());
        self.save_equipment(&list)?;
        Ok(equipment)
    }

    /// 新增或按ID替换设备
    pub fn upsert_equipment(&self, equipment: Equipment) -> RepositoryResult<()> {
        if equipment.id.trim().is_empty() {
            return Err(RepositoryError::ValidationError("设备ID不能为空".to_string()));
        }
        let _guard = self.lock_writes()?;
        let mut list = self.load_equipment();
        upsert_by_id(&mut list, equipment, |e| &e.id);
        self.save_equipment(&list)
    }

    /// 新增或按ID替换干预（校验 end_date ⇔ completed），同时重算指标缓存
    pub fn upsert_intervention(
        &self,
        intervention: Intervention,
        now: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        intervention.validate().map_err(RepositoryError::ValidationError)?;
        let _guard = self.lock_writes()?;
        let mut list = self.load_interventions();
        upsert_by_id(&mut list, intervention, |i| &i.id);
        let equipment = self.load_equipment();
        self.commit(self.interventions_commit(&equipment, &list, now)?)
    }

    /// 在写锁内分配下一个 PDRnnn 并追加备件
    pub fn insert_new_spare_part(
        &self,
        build: impl FnOnce(String) -> SparePart,
    ) -> RepositoryResult<SparePart> {
        let _guard = self.lock_writes()?;
        let mut parts = self.load_spare_parts();
        let id = next_sequential_id(SPARE_PART_ID_PREFIX, parts.iter().map(|p| p.id.as_str()));
        let part = build(id);
        if parts.iter().any(|p| p.id == part.id) {
            return Err(RepositoryError::ValidationError(format!("备件ID重复: {}", part.id)));
        }
        parts.push(part.clone());
        self.save_spare_parts(&parts)?;
        Ok(part)
    }

    pub fn upsert_spare_part(&self, part: SparePart) -> RepositoryResult<()> {
        part.validate().map_err(RepositoryError::ValidationError)?;
        let _guard = self.lock_writes()?;
        let mut list = self.load_spare_parts();
        upsert_by_id(&mut list, part, |p| &p.id);
        self.save_spare_parts(&list)
    }

    // ==========================================
    // 删除
    // ==========================================

    /// 删除设备并级联删除其全部干预，同时重算指标缓存
    ///
    /// # 返回
    /// 被级联删除的干预数
    pub fn delete_equipment(&self, id: &str, now: DateTime<Utc>) -> RepositoryResult<usize> {
        let _guard = self.lock_writes()?;

        let mut equipment = self.load_equipment();
        let before = equipment.len();
        equipment.retain(|e| e.id != id);
        if equipment.len() == before {
            return Err(RepositoryError::not_found("Equipment", id));
        }

        let mut interventions = self.load_interventions();
        let before_interventions = interventions.len();
        interventions.retain(|i| i.equipment_id != id);
        let cascaded = before_interventions - interventions.len();

        let (metrics, causes) = self.recompute_caches(&equipment, &interventions, now);
        let commit = StoreCommit::new()
            .equipment(&equipment)?
            .interventions(&interventions)?
            .performance_metrics(&metrics)?
            .pareto_causes(&causes)?;
        self.commit(commit)?;

        tracing::info!(equipment_id = id, cascaded, "设备已删除（含级联干预）");
        Ok(cascaded)
    }

    /// 删除干预，同时重算指标缓存
    pub fn delete_intervention(&self, id: &str, now: DateTime<Utc>) -> RepositoryResult<()> {
        let _guard = self.lock_writes()?;

        let mut interventions = self.load_interventions();
        let before = interventions.len();
        interventions.retain(|i| i.id != id);
        if interventions.len() == before {
            return Err(RepositoryError::not_found("Intervention", id));
        }

        let equipment = self.load_equipment();
        self.commit(self.interventions_commit(&equipment, &interventions, now)?)?;

        tracing::info!(intervention_id = id, "干预已删除");
        Ok(())
    }

    pub fn delete_spare_part(&self, id: &str) -> RepositoryResult<()> {
        let _guard = self.lock_writes()?;

        let mut parts = self.load_spare_parts();
        let before = parts.len();
        parts.retain(|p| p.id != id);
        if parts.len() == before {
            return Err(RepositoryError::not_found("SparePart", id));
        }
        self.commit(StoreCommit::new().spare_parts(&parts)?)?;

        tracing::info!(spare_part_id = id, "备件已删除");
        Ok(())
    }

    // ==========================================
    // 库存 / 生命周期
    // ==========================================

    /// 调整备件库存（下限 0）
    pub fn adjust_stock(&self, id: &str, delta: i64, today: NaiveDate) -> RepositoryResult<SparePart> {
        let _guard = self.lock_writes()?;

        let mut parts = self.load_spare_parts();
        let part = parts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RepositoryError::not_found("SparePart", id))?;
        let before = part.current_stock;
        let after = part.adjust_stock(delta, today);
        let updated = part.clone();
        self.commit(StoreCommit::new().spare_parts(&parts)?)?;

        tracing::info!(spare_part_id = id, delta, before, after, "库存已调整");
        Ok(updated)
    }

    /// 变更干预状态
    ///
    /// 完成时写入结束时间与时长；若关联设备处于 maintenance / breakdown，
    /// 在同一次提交中恢复为 operational 并更新上次维护日期。
    /// 指标缓存按 `at` 时刻一并重算。
    pub fn transition_intervention(
        &self,
        id: &str,
        next: InterventionStatus,
        at: DateTime<Utc>,
        duration_hours: Option<f64>,
    ) -> RepositoryResult<Intervention> {
        let _guard = self.lock_writes()?;

        let mut interventions = self.load_interventions();
        let it = interventions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| RepositoryError::not_found("Intervention", id))?;

        if !it.status.can_transition_to(next) {
            return Err(RepositoryError::InvalidStateTransition {
                from: it.status.to_string(),
                to: next.to_string(),
            });
        }

        it.status = next;
        if next == InterventionStatus::Completed {
            it.end_date = Some(at);
            if duration_hours.is_some() {
                it.duration_hours = duration_hours;
            }
        }
        it.validate().map_err(RepositoryError::ValidationError)?;
        let updated = it.clone();

        let mut equipment = self.load_equipment();
        let mut equipment_changed = false;
        if next == InterventionStatus::Completed {
            if let Some(eq) = equipment.iter_mut().find(|e| e.id == updated.equipment_id) {
                if matches!(eq.status, EquipmentStatus::Maintenance | EquipmentStatus::Breakdown) {
                    eq.status = EquipmentStatus::Operational;
                }
                eq.last_maintenance_date = Some(at.date_naive());
                equipment_changed = true;
            }
        }
        let mut commit = self.interventions_commit(&equipment, &interventions, at)?;
        if equipment_changed {
            commit = commit.equipment(&equipment)?;
        }
        self.commit(commit)?;

        tracing::info!(intervention_id = id, status = %next, "干预状态已变更");
        Ok(updated)
    }

    /// 追加备注
    pub fn add_intervention_note(&self, id: &str, note: &str) -> RepositoryResult<Intervention> {
        let _guard = self.lock_writes()?;

        let mut interventions = self.load_interventions();
        let it = interventions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| RepositoryError::not_found("Intervention", id))?;
        it.notes.push(note.trim().to_string());
        let updated = it.clone();
        self.commit(StoreCommit::new().interventions(&interventions)?)?;
        Ok(updated)
    }

    // ==========================================
    // 指标缓存
    // ==========================================

    /// 按当前数据重算指标缓存
    ///
    /// - MTBF / MTTR: 设备群口径重算
    /// - TRS: 沿用已存值（外部提供，不在此推算）
    /// - 故障原因: 统计干预中的 causes_of_failure
    fn recompute_caches(
        &self,
        equipment: &[Equipment],
        interventions: &[Intervention],
        now: DateTime<Utc>,
    ) -> (PerformanceMetrics, Vec<ParetoItem>) {
        let trs = self.load_performance_metrics().trs;
        let metrics = ReliabilityEngine::new().fleet_performance(equipment, interventions, trs, now);
        let causes = ParetoEngine::new().cause_histogram(interventions);
        tracing::debug!(
            mtbf = %metrics.mtbf,
            mttr = %metrics.mttr,
            causes = causes.len(),
            "指标缓存已重算"
        );
        (metrics, causes)
    }

    /// 干预集合连同重算后的指标缓存
    fn interventions_commit(
        &self,
        equipment: &[Equipment],
        interventions: &[Intervention],
        now: DateTime<Utc>,
    ) -> RepositoryResult<StoreCommit> {
        let (metrics, causes) = self.recompute_caches(equipment, interventions, now);
        StoreCommit::new()
            .interventions(interventions)?
            .performance_metrics(&metrics)?
            .pareto_causes(&causes)
    }

    /// 以当前数据刷新指标缓存
    pub fn refresh_metric_caches(&self, now: DateTime<Utc>) -> RepositoryResult<PerformanceMetrics> {
        let _guard = self.lock_writes()?;
        let equipment = self.load_equipment();
        let interventions = self.load_interventions();
        let (metrics, causes) = self.recompute_caches(&equipment, &interventions, now);
        self.commit(
            StoreCommit::new()
                .performance_metrics(&metrics)?
                .pareto_causes(&causes)?,
        )?;
        Ok(metrics)
    }

    /// 写入外部提供的 TRS（百分比）
    pub fn set_trs(&self, trs: MetricValue) -> RepositoryResult<PerformanceMetrics> {
        let _guard = self.lock_writes()?;
        let mut metrics = self.load_performance_metrics();
        metrics.trs = trs;
        self.save_performance_metrics(&metrics)?;
        Ok(metrics)
    }

    // ==========================================
    // 首次初始化
    // ==========================================

    /// 首次启动时填充演示数据（幂等，每次启动都可调用）
    ///
    /// 各键独立判断:
    /// - equipment 缺失 → 生成设备
    /// - interventions 缺失 → 按现有设备生成
    /// - spareParts 缺失或为空 → 写入固定备件清单
    /// - performanceMetrics / paretoCauses 缺失 → 按现有数据计算（原因为空时用种子）
    pub fn initialize_if_empty(
        &self,
        generator: &MockDataGenerator,
        equipment_count: usize,
        now: DateTime<Utc>,
    ) -> RepositoryResult<InitReport> {
        let _guard = self.lock_writes()?;
        let mut report = InitReport::default();

        if !self.kv.contains(keys::EQUIPMENT)? {
            let equipment = generator.generate_equipment(equipment_count, now);
            report.seeded_equipment = equipment.len();
            self.save_equipment(&equipment)?;
        }

        if !self.kv.contains(keys::INTERVENTIONS)? {
            let equipment = self.load_equipment();
            let interventions = generator.generate_interventions(&equipment, now);
            report.seeded_interventions = interventions.len();
            self.save_interventions(&interventions)?;
        }

        if !self.kv.contains(keys::SPARE_PARTS)? || self.load_spare_parts().is_empty() {
            let parts = generator.bootstrap_spare_parts(now.date_naive());
            report.seeded_spare_parts = parts.len();
            self.save_spare_parts(&parts)?;
        }

        if !self.kv.contains(keys::PERFORMANCE_METRICS)? {
            let metrics = ReliabilityEngine::new().fleet_performance(
                &self.load_equipment(),
                &self.load_interventions(),
                MetricValue::Undefined,
                now,
            );
            self.save_performance_metrics(&metrics)?;
            report.seeded_performance_metrics = true;
        }

        if !self.kv.contains(keys::PARETO_CAUSES)? {
            let mut causes = ParetoEngine::new().cause_histogram(&self.load_interventions());
            if causes.is_empty() {
                causes = generator.generate_pareto_causes();
            }
            self.save_pareto_causes(&causes)?;
            report.seeded_pareto_causes = true;
        }

        if report.is_noop() {
            tracing::debug!("存储已有数据，跳过初始化");
        } else {
            tracing::info!(
                equipment = report.seeded_equipment,
                interventions = report.seeded_interventions,
                spare_parts = report.seeded_spare_parts,
                "首次初始化完成"
            );
        }
        Ok(report)
    }
}

/// 生成 `<前缀><三位序号>` 形式的下一个ID（取已有同前缀数字ID的最大值 + 1）
fn next_sequential_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let max = existing
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|digits| digits.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:03}", prefix, max + 1)
}

/// 按ID替换或追加
fn upsert_by_id<T>(list: &mut Vec<T>, item: T, id_of: impl Fn(&T) -> &String) {
    let position = list.iter().position(|existing| id_of(existing) == id_of(&item));
    match position {
        Some(idx) => list[idx] = item,
        None => list.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::kv_store::MemoryKvStore;

    #[test]
    fn test_commit_replaces_duplicate_key() {
        let commit = StoreCommit::new()
            .spare_parts(&[])
            .unwrap()
            .equipment(&[])
            .unwrap()
            .spare_parts(&[])
            .unwrap();
        assert_eq!(commit.keys(), vec![keys::EQUIPMENT, keys::SPARE_PARTS]);
    }

    #[test]
    fn test_malformed_json_loads_as_empty() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(keys::EQUIPMENT, "{not json").unwrap();
        kv.set(keys::PERFORMANCE_METRICS, "[1,2").unwrap();
        let store = EntityStore::new(kv);
        assert!(store.load_equipment().is_empty());
        assert_eq!(store.load_performance_metrics(), PerformanceMetrics::default());
    }

    #[test]
    fn test_upsert_by_id_replaces_in_place() {
        let mut list = vec!["a".to_string(), "b".to_string()];
        upsert_by_id(&mut list, "b".to_string(), |s| s);
        upsert_by_id(&mut list, "c".to_string(), |s| s);
        assert_eq!(list, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_next_sequential_id() {
        let ids = ["EQ001", "EQ042", "EQ-x", "PDR099"];
        assert_eq!(next_sequential_id("EQ", ids.iter().copied()), "EQ043");
        assert_eq!(next_sequential_id("PDR", std::iter::empty()), "PDR001");
    }
}
