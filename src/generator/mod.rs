// ==========================================
// 设备维护管理系统 - 模拟数据生成器
// ==========================================
// 用途: 首次启动时为三类实体填充演示数据
// 说明: 随机生成，不保证确定性；只保证实体结构合法
// ==========================================

use crate::domain::equipment::Equipment;
use crate::domain::intervention::Intervention;
use crate::domain::metrics::ParetoItem;
use crate::domain::spare_part::SparePart;
use crate::domain::types::{
    CriticalityLevel, EquipmentStatus, InterventionStatus, InterventionType, Priority,
};
use crate::engine::pareto::CAUSE_CATALOGUE;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// 默认设备数量
pub const DEFAULT_EQUIPMENT_COUNT: usize = 42;

const EQUIPMENT_TYPES: [&str; 5] = ["Pompe", "Compresseur", "Moteur", "Ventilateur", "Convoyeur"];
const MANUFACTURERS: [&str; 5] = ["Grundfos", "Atlas Copco", "Siemens", "ABB", "Schneider"];
const LOCATIONS: [&str; 4] = ["Atelier 1", "Atelier 2", "Zone de production", "Magasin"];
const INTERVENTION_TITLES: [&str; 4] = [
    "Maintenance préventive",
    "Remplacement",
    "Réparation",
    "Inspection",
];
const TECHNICIANS: [&str; 5] = ["Martin", "Bernard", "Dubois", "Thomas", "Robert"];

pub struct MockDataGenerator {
    // 无状态生成器，每次调用使用线程随机数
}

impl MockDataGenerator {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成设备
    ///
    /// - ID: EQ001, EQ002, ...
    /// - 名称: `<类型> <字母><数字>`，每 10 台换一个字母
    /// - 上次维护: 过去 30 天内；下次维护: 未来 30 天内；投运: 1~10 年前
    pub fn generate_equipment(&self, count: usize, now: DateTime<Utc>) -> Vec<Equipment> {
        let mut rng = rand::thread_rng();
        let today = now.date_naive();

        (0..count)
            .map(|i| {
                let equipment_type = *EQUIPMENT_TYPES.choose(&mut rng).unwrap_or(&"Pompe");
                let letter = (b'A' + ((i / 10) % 26) as u8) as char;
                let status = *EquipmentStatus::ALL
                    .choose(&mut rng)
                    .unwrap_or(&EquipmentStatus::Operational);
                let criticality = *CriticalityLevel::ALL
                    .choose(&mut rng)
                    .unwrap_or(&CriticalityLevel::Medium);

                Equipment {
                    id: format!("EQ{:03}", i + 1),
                    name: format!("{} {}{}", equipment_type, letter, i % 10 + 1),
                    equipment_type: equipment_type.to_string(),
                    location: LOCATIONS.choose(&mut rng).unwrap_or(&"Atelier 1").to_string(),
                    manufacturer: MANUFACTURERS.choose(&mut rng).unwrap_or(&"ABB").to_string(),
                    model: format!("M-{}", rng.gen_range(100..1000)),
                    serial_number: format!("SN{:06}", rng.gen_range(0..1_000_000)),
                    status,
                    criticality_level: criticality,
                    installation_date: Some(today - Duration::days(rng.gen_range(365..3650))),
                    last_maintenance_date: Some(today - Duration::days(rng.gen_range(0..30))),
                    next_maintenance_date: Some(today + Duration::days(rng.gen_range(0..30))),
                }
            })
            .collect()
    }

    /// 生成干预：每台设备 1~3 条，开始时间在 now ±7 天内
    ///
    /// 已完成的干预带结束时间与时长；纠正性干预附 1~2 个故障原因。
    pub fn generate_interventions(&self, equipment: &[Equipment], now: DateTime<Utc>) -> Vec<Intervention> {
        let mut rng = rand::thread_rng();
        let types = [InterventionType::Preventive, InterventionType::Corrective];

        equipment
            .iter()
            .flat_map(|eq| {
                let count = rng.gen_range(1..=3);
                (0..count)
                    .map(|n| {
                        let offset_hours = rng.gen_range(-7 * 24..=7 * 24);
                        let start_date = now + Duration::hours(offset_hours);
                        let status = *InterventionStatus::ALL
                            .choose(&mut rng)
                            .unwrap_or(&InterventionStatus::Scheduled);
                        let intervention_type = *types.choose(&mut rng).unwrap_or(&types[0]);
                        let duration_hours = if rng.gen_bool(0.5) || status == InterventionStatus::Completed {
                            Some(rng.gen_range(1..=10) as f64)
                        } else {
                            None
                        };
                        let end_date = (status == InterventionStatus::Completed)
                            .then(|| start_date + Duration::hours(duration_hours.unwrap_or(1.0) as i64));
                        let causes_of_failure = if intervention_type == InterventionType::Corrective {
                            let k = rng.gen_range(1..=2);
                            CAUSE_CATALOGUE
                                .choose_multiple(&mut rng, k)
                                .map(|(name, _)| name.to_string())
                                .collect()
                        } else {
                            Vec::new()
                        };
                        let technicians = if rng.gen_bool(0.5) {
                            vec![TECHNICIANS.choose(&mut rng).unwrap_or(&"Martin").to_string()]
                        } else {
                            Vec::new()
                        };
                        let title = INTERVENTION_TITLES
                            .choose(&mut rng)
                            .unwrap_or(&"Inspection");

                        Intervention {
                            id: format!("INT{}{}", eq.id, n),
                            title: format!("{} - {}", title, eq.name),
                            description: String::new(),
                            equipment_id: eq.id.clone(),
                            equipment_name: eq.name.clone(),
                            intervention_type,
                            status,
                            priority: *Priority::ALL.choose(&mut rng).unwrap_or(&Priority::Medium),
                            start_date,
                            end_date,
                            duration_hours,
                            technicians,
                            causes_of_failure,
                            spare_parts: Vec::new(),
                            notes: Vec::new(),
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// 故障原因种子：目录基准值 ±20%，下限 1
    pub fn generate_pareto_causes(&self) -> Vec<ParetoItem> {
        let mut rng = rand::thread_rng();
        CAUSE_CATALOGUE
            .iter()
            .map(|(name, base)| {
                let factor: f64 = rng.gen_range(0.8..1.2);
                ParetoItem::new(*name, (base * factor).floor().max(1.0))
            })
            .collect()
    }

    /// 固定的备件初始清单
    pub fn bootstrap_spare_parts(&self, today: NaiveDate) -> Vec<SparePart> {
        vec![
            SparePart {
                id: "PDR001".to_string(),
                reference: "ROU-123".to_string(),
                name: "Roulement à billes".to_string(),
                description: "Roulement à billes pour moteur électrique".to_string(),
                supplier: "SKF".to_string(),
                category: "Mécanique".to_string(),
                location: "Étagère A-12".to_string(),
                current_stock: 15,
                minimum_stock: 5,
                unit_price: 45.99,
                last_restock_date: today,
            },
            SparePart {
                id: "PDR002".to_string(),
                reference: "BELT-456".to_string(),
                name: "Courroie de transmission".to_string(),
                description: "Courroie de transmission pour convoyeur".to_string(),
                supplier: "Gates".to_string(),
                category: "Transmission".to_string(),
                location: "Étagère B-03".to_string(),
                current_stock: 3,
                minimum_stock: 4,
                unit_price: 78.50,
                last_restock_date: today,
            },
            SparePart {
                id: "PDR003".to_string(),
                reference: "FIL-789".to_string(),
                name: "Filtre à huile".to_string(),
                description: "Filtre à huile pour compresseur".to_string(),
                supplier: "Parker".to_string(),
                category: "Filtration".to_string(),
                location: "Étagère C-08".to_string(),
                current_stock: 8,
                minimum_stock: 6,
                unit_price: 22.75,
                last_restock_date: today,
            },
        ]
    }
}

impl Default for MockDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}
