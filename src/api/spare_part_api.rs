// ==========================================
// 设备维护管理系统 - 备件 API
// ==========================================
// 职责: 备件列表筛选、新建、编辑、删除、库存 ±调整
// 红线: 库存不得为负（调整下限 0）
// 说明: 干预中的备件使用记录不联动库存
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::equipment_api::normalized_search;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::spare_part::{SparePart, SparePartDraft};
use crate::repository::EntityStore;

/// 备件列表筛选条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePartFilter {
    /// 匹配名称 / 零件号 / 供应商（不区分大小写）
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub low_stock_only: bool,
}

impl SparePartFilter {
    pub fn matches(&self, part: &SparePart) -> bool {
        if self.low_stock_only && !part.is_low_stock() {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if !part.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        match normalized_search(self.search.as_deref()) {
            Some(needle) => [&part.name, &part.reference, &part.supplier]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle)),
            None => true,
        }
    }
}

/// 库存汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub total_parts: usize,
    pub low_stock_parts: usize,
    pub total_value: f64,
}

// ==========================================
// SparePartApi - 备件 API
// ==========================================
pub struct SparePartApi {
    store: Arc<EntityStore>,
}

impl SparePartApi {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    pub fn list_spare_parts(&self, filter: &SparePartFilter) -> Vec<SparePart> {
        self.store
            .load_spare_parts()
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect()
    }

    /// 去重后的类别列表（保持首次出现顺序）
    pub fn list_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for part in self.store.load_spare_parts() {
            if !part.category.is_empty() && !categories.contains(&part.category) {
                categories.push(part.category);
            }
        }
        categories
    }

    pub fn get_spare_part(&self, id: &str) -> ApiResult<SparePart> {
        self.store
            .find_spare_part(id)
            .ok_or_else(|| ApiError::NotFound(format!("备件(id={})不存在", id)))
    }

    /// 新建备件，ID 按 PDRnnn 顺延；补货日期记为当天
    pub fn create_spare_part(&self, draft: SparePartDraft, today: NaiveDate) -> ApiResult<SparePart> {
        validate_draft(&draft)?;
        let part = self
            .store
            .insert_new_spare_part(|id| draft.into_spare_part(id, today))?;

        tracing::info!(spare_part_id = %part.id, reference = %part.reference, "备件已创建");
        Ok(part)
    }

    /// 编辑备件；保留原补货日期
    pub fn update_spare_part(&self, id: &str, draft: SparePartDraft) -> ApiResult<SparePart> {
        validate_draft(&draft)?;
        let existing = self.get_spare_part(id)?;
        let part = draft.into_spare_part(existing.id, existing.last_restock_date);
        self.store.upsert_spare_part(part.clone())?;

        tracing::info!(spare_part_id = id, "备件已更新");
        Ok(part)
    }

    pub fn delete_spare_part(&self, id: &str) -> ApiResult<()> {
        Ok(self.store.delete_spare_part(id)?)
    }

    /// 库存调整（正数入库并刷新补货日期，负数出库，下限 0）
    pub fn adjust_stock(&self, id: &str, delta: i64, today: NaiveDate) -> ApiResult<SparePart> {
        if delta == 0 {
            return self.get_spare_part(id);
        }
        Ok(self.store.adjust_stock(id, delta, today)?)
    }

    pub fn stock_summary(&self) -> StockSummary {
        let parts = self.store.load_spare_parts();
        StockSummary {
            total_parts: parts.len(),
            low_stock_parts: parts.iter().filter(|p| p.is_low_stock()).count(),
            total_value: parts.iter().map(|p| p.stock_value()).sum(),
        }
    }
}

fn validate_draft(draft: &SparePartDraft) -> ApiResult<()> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("备件名称不能为空".to_string()));
    }
    if draft.reference.trim().is_empty() {
        return Err(ApiError::InvalidInput("零件号不能为空".to_string()));
    }
    if !draft.unit_price.is_finite() || draft.unit_price < 0.0 {
        return Err(ApiError::InvalidInput(format!("单价无效: {}", draft.unit_price)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(current: u32, minimum: u32) -> SparePart {
        SparePartDraft {
            reference: "BELT-456".to_string(),
            name: "Courroie de transmission".to_string(),
            description: String::new(),
            supplier: "Gates".to_string(),
            category: "Transmission".to_string(),
            location: "B-03".to_string(),
            current_stock: current,
            minimum_stock: minimum,
            unit_price: 78.5,
        }
        .into_spare_part("PDR002".to_string(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_filter_low_stock_and_category() {
        let low = part(3, 4);
        let ok = part(10, 4);
        let filter = SparePartFilter {
            low_stock_only: true,
            ..SparePartFilter::default()
        };
        assert!(filter.matches(&low));
        assert!(!filter.matches(&ok));

        let filter = SparePartFilter {
            category: Some("transmission".to_string()),
            search: Some("gates".to_string()),
            low_stock_only: false,
        };
        assert!(filter.matches(&ok));
    }
}
