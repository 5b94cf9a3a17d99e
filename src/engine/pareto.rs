// ==========================================
// 设备维护管理系统 - 帕累托故障原因分析
// ==========================================
// 步骤:
// 1. 按 value 降序（稳定排序，相同值保持输入顺序）
// 2. total = Σ value
// 3. 逐项累计，cumulative_percent = round(100 × 累计 / total)
// 说明: 逐项取整，末项允许 ±1 漂移
// ==========================================

use crate::domain::intervention::Intervention;
use crate::domain::metrics::{ParetoItem, RankedParetoItem};

/// 故障原因目录（种子数据 / 表单候选项）
pub const CAUSE_CATALOGUE: [(&str, f64); 6] = [
    ("Panne électrique", 35.0),
    ("Usure mécanique", 25.0),
    ("Défaut lubrification", 18.0),
    ("Erreur opérateur", 12.0),
    ("Problème hydraulique", 8.0),
    ("Autres", 5.0),
];

pub struct ParetoEngine {
    // 无状态引擎
}

impl ParetoEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 帕累托排序并附累计百分比
    ///
    /// total 为 0（全为 0 或空输入）时累计百分比全部为 0。
    pub fn rank(&self, items: &[ParetoItem]) -> Vec<RankedParetoItem> {
        let mut sorted: Vec<&ParetoItem> = items.iter().collect();
        // sort_by 为稳定排序
        sorted.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total: f64 = sorted.iter().map(|i| i.value).sum();
        let mut cumulative = 0.0;

        sorted
            .into_iter()
            .map(|item| {
                cumulative += item.value;
                let cumulative_percent = if total > 0.0 {
                    (100.0 * cumulative / total).round() as i64
                } else {
                    0
                };
                RankedParetoItem {
                    name: item.name.clone(),
                    value: item.value,
                    cumulative_percent,
                }
            })
            .collect()
    }

    /// 统计干预记录中的故障原因次数（保持首次出现顺序）
    pub fn cause_histogram(&self, interventions: &[Intervention]) -> Vec<ParetoItem> {
        let mut histogram: Vec<ParetoItem> = Vec::new();
        for cause in interventions
            .iter()
            .flat_map(|it| it.causes_of_failure.iter())
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
        {
            match histogram.iter_mut().find(|p| p.name == cause) {
                Some(existing) => existing.value += 1.0,
                None => histogram.push(ParetoItem::new(cause, 1.0)),
            }
        }
        histogram
    }

    /// "关键少数": 累计百分比首次达到阈值（含）之前的条目
    pub fn vital_few<'a>(
        &self,
        ranked: &'a [RankedParetoItem],
        threshold_percent: i64,
    ) -> &'a [RankedParetoItem] {
        match ranked
            .iter()
            .position(|r| r.cumulative_percent >= threshold_percent)
        {
            Some(idx) => &ranked[..=idx],
            None => ranked,
        }
    }
}

impl Default for ParetoEngine {
    fn default() -> Self {
        Self::new()
    }
}
