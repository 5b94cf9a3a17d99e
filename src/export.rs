// ==========================================
// 设备维护管理系统 - CSV 导出
// ==========================================
// 导出内容: 设备指标表、低库存清单
// 约定: 未定义指标写 "-"；数值保留一位小数
// ==========================================

use std::io::Write;

use crate::api::ApiResult;
use crate::domain::dates::format_date;
use crate::domain::metrics::EquipmentIndicators;
use crate::domain::spare_part::SparePart;

const INDICATOR_HEADERS: [&str; 8] = [
    "equipment_id",
    "name",
    "operating_hours",
    "failures",
    "repairs",
    "mtbf_h",
    "mttr_h",
    "trs_pct",
];

const LOW_STOCK_HEADERS: [&str; 7] = [
    "id",
    "reference",
    "name",
    "supplier",
    "current_stock",
    "minimum_stock",
    "last_restock_date",
];

/// 写出设备指标表
///
/// # 返回
/// 写出的数据行数（不含表头）
pub fn write_indicators_csv<W: Write>(writer: W, rows: &[EquipmentIndicators]) -> ApiResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(INDICATOR_HEADERS)?;

    for row in rows {
        wtr.write_record([
            row.equipment_id.clone(),
            row.name.clone(),
            format!("{:.1}", row.operating_hours),
            row.failure_count.to_string(),
            row.repair_count.to_string(),
            row.mtbf.to_string(),
            row.mttr.to_string(),
            row.trs.to_string(),
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    tracing::debug!(rows = rows.len(), "指标表已导出");
    Ok(rows.len())
}

/// 写出低库存清单（只写 current_stock <= minimum_stock 的备件）
pub fn write_low_stock_csv<W: Write>(writer: W, parts: &[SparePart]) -> ApiResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(LOW_STOCK_HEADERS)?;

    let mut written = 0;
    for part in parts.iter().filter(|p| p.is_low_stock()) {
        wtr.write_record([
            part.id.clone(),
            part.reference.clone(),
            part.name.clone(),
            part.supplier.clone(),
            part.current_stock.to_string(),
            part.minimum_stock.to_string(),
            format_date(&part.last_restock_date),
        ])?;
        written += 1;
    }

    wtr.flush().map_err(csv::Error::from)?;
    tracing::debug!(rows = written, "低库存清单已导出");
    Ok(written)
}
