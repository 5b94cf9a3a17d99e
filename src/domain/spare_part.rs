// ==========================================
// 设备维护管理系统 - 备件实体
// ==========================================
// 存储键: spareParts (整表快照)
// 红线: 低库存 = current_stock <= minimum_stock (相等也算低库存)
// 红线: 库存不可为负
// ==========================================

use crate::domain::dates::iso_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 备件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    pub id: String,               // 备件ID (如 PDR001)
    pub reference: String,        // 零件号
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,         // 库位
    pub current_stock: u32,
    pub minimum_stock: u32,
    pub unit_price: f64,          // 单价（非负）
    #[serde(with = "iso_date")]
    pub last_restock_date: NaiveDate,
}

impl SparePart {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }

    /// 按增量调整库存，下限钳制为 0；返回调整后的库存
    ///
    /// 入库（delta > 0）同时刷新最近补货日期。
    pub fn adjust_stock(&mut self, delta: i64, today: NaiveDate) -> u32 {
        let next = (self.current_stock as i64).saturating_add(delta).clamp(0, u32::MAX as i64);
        self.current_stock = next as u32;
        if delta > 0 {
            self.last_restock_date = today;
        }
        self.current_stock
    }

    /// 库存金额
    pub fn stock_value(&self) -> f64 {
        self.current_stock as f64 * self.unit_price
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("备件ID不能为空".to_string());
        }
        if self.reference.trim().is_empty() {
            return Err(format!("备件 {} 零件号不能为空", self.id));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(format!("备件 {} 单价无效: {}", self.id, self.unit_price));
        }
        Ok(())
    }
}

/// 备件表单输入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePartDraft {
    pub reference: String,
    pub name: String,
    pub description: String,
    pub supplier: String,
    pub category: String,
    pub location: String,
    pub current_stock: u32,
    pub minimum_stock: u32,
    pub unit_price: f64,
}

impl SparePartDraft {
    pub fn into_spare_part(self, id: String, today: NaiveDate) -> SparePart {
        SparePart {
            id,
            reference: self.reference.trim().to_string(),
            name: self.name.trim().to_string(),
            description: self.description,
            supplier: self.supplier,
            category: self.category,
            location: self.location,
            current_stock: self.current_stock,
            minimum_stock: self.minimum_stock,
            unit_price: self.unit_price,
            last_restock_date: today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(current: u32, minimum: u32) -> SparePart {
        SparePart {
            id: "PDR001".to_string(),
            reference: "ROU-123".to_string(),
            name: "Roulement à billes".to_string(),
            description: String::new(),
            supplier: "SKF".to_string(),
            category: "Mécanique".to_string(),
            location: "Étagère A-12".to_string(),
            current_stock: current,
            minimum_stock: minimum,
            unit_price: 45.99,
            last_restock_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(part(5, 10).is_low_stock());
        assert!(part(10, 10).is_low_stock());
        assert!(!part(11, 10).is_low_stock());
    }

    #[test]
    fn test_adjust_stock_never_negative() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let mut p = part(0, 2);
        for _ in 0..5 {
            assert_eq!(p.adjust_stock(-1, today), 0);
        }
        assert_eq!(p.adjust_stock(-100, today), 0);
        // 出库不刷新补货日期
        assert_eq!(p.last_restock_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_restock_updates_date() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let mut p = part(3, 2);
        assert_eq!(p.adjust_stock(4, today), 7);
        assert_eq!(p.last_restock_date, today);
    }

    #[test]
    fn test_plain_date_string_round_trip() {
        let p = part(3, 2);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["lastRestockDate"], "2024-03-15");
        assert_eq!(json["currentStock"], 3);
        let back: SparePart = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut p = part(3, 2);
        p.unit_price = -1.0;
        assert!(p.validate().is_err());
    }
}
