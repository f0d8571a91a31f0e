//! BOM 成本與用料彙總
//!
//! 對產品做兩層彙總：產品本體的直接用料 + 每個零件的直接用料。
//! 零件不再往下展開。

use std::collections::HashMap;

use rust_decimal::Decimal;
use spool_core::{BomView, Filament, FilamentId, PartView, Result, SpoolError};

/// BOM 成本計算器
pub struct CostCalculator;

impl CostCalculator {
    /// 總列印工時 = 產品本體 + 所有零件
    pub fn total_print_time(bom: &BomView) -> Decimal {
        let mut total = bom.product.print_time_hours;
        for part in &bom.parts {
            total += part.part.print_time_hours;
        }
        total
    }

    /// 總用料：線材 → 每單位所需克數
    ///
    /// 同一線材出現在產品與多個零件時累加，不覆寫。
    pub fn total_filament_usage(bom: &BomView) -> HashMap<FilamentId, Decimal> {
        let mut usage: HashMap<FilamentId, Decimal> = HashMap::new();

        for entry in &bom.direct_usage {
            *usage.entry(entry.filament_id).or_insert(Decimal::ZERO) += entry.grams_needed;
        }

        for part in &bom.parts {
            for entry in &part.usage {
                *usage.entry(entry.filament_id).or_insert(Decimal::ZERO) += entry.grams_needed;
            }
        }

        usage
    }

    /// 零件自身的用料（僅零件直接用料，無下層展開）
    pub fn part_filament_usage(part: &PartView) -> HashMap<FilamentId, Decimal> {
        let mut usage: HashMap<FilamentId, Decimal> = HashMap::new();
        for entry in &part.usage {
            *usage.entry(entry.filament_id).or_insert(Decimal::ZERO) += entry.grams_needed;
        }
        usage
    }

    /// 產品一單位的材料總成本
    ///
    /// 每筆 = 克數 / 每捲克數 × 每捲成本；加總後才以
    /// 四捨六入五成雙（banker's rounding）取 2 位小數，逐筆不取整。
    pub fn total_cost(
        bom: &BomView,
        filaments: &HashMap<FilamentId, Filament>,
    ) -> Result<Decimal> {
        Self::material_cost(&Self::total_filament_usage(bom), filaments)
    }

    /// 零件一單位的材料成本（規則同 [`CostCalculator::total_cost`]）
    pub fn part_cost(
        part: &PartView,
        filaments: &HashMap<FilamentId, Filament>,
    ) -> Result<Decimal> {
        Self::material_cost(&Self::part_filament_usage(part), filaments)
    }

    /// 單筆線材用量的未取整成本
    pub fn usage_cost(grams: Decimal, filament: &Filament) -> Result<Decimal> {
        if filament.grams_per_roll <= Decimal::ZERO {
            return Err(SpoolError::Validation(format!(
                "線材 {} 的每捲克數必須為正",
                filament.id
            )));
        }
        Ok(grams / filament.grams_per_roll * filament.cost_per_roll)
    }

    fn material_cost(
        usage: &HashMap<FilamentId, Decimal>,
        filaments: &HashMap<FilamentId, Filament>,
    ) -> Result<Decimal> {
        let mut total = Decimal::ZERO;
        for (filament_id, grams) in usage {
            let filament = filaments
                .get(filament_id)
                .ok_or_else(|| SpoolError::NotFound(format!("線材 {filament_id}")))?;
            total += Self::usage_cost(*grams, filament)?;
        }
        Ok(total.round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spool_core::{FilamentUsage, Part, Product};

    fn filament(id: FilamentId, cost_per_roll: i64, grams_per_roll: i64) -> Filament {
        let mut fil = Filament::new(
            "Generic",
            "PLA",
            format!("Color-{id}"),
            Decimal::from(cost_per_roll),
            Decimal::from(grams_per_roll),
        );
        fil.id = id;
        fil
    }

    fn bom_with_parts() -> BomView {
        // 產品本體用線材1 50g；零件A用線材1 30g + 線材2 20g；零件B用線材2 10g
        let product = Product::new("Dragon", "Large", "Red").with_print_time(Decimal::from(2));
        let mut part_a = Part::new(1, "Head", Decimal::from(1));
        part_a.id = 1;
        let mut part_b = Part::new(1, "Tail", Decimal::new(50, 2));
        part_b.id = 2;

        BomView {
            product,
            direct_usage: vec![FilamentUsage::new(1, Decimal::from(50))],
            parts: vec![
                PartView {
                    part: part_a,
                    usage: vec![
                        FilamentUsage::new(1, Decimal::from(30)),
                        FilamentUsage::new(2, Decimal::from(20)),
                    ],
                },
                PartView {
                    part: part_b,
                    usage: vec![FilamentUsage::new(2, Decimal::from(10))],
                },
            ],
        }
    }

    #[test]
    fn test_total_print_time_includes_parts() {
        let bom = bom_with_parts();
        // 2 + 1 + 0.5 = 3.5
        assert_eq!(CostCalculator::total_print_time(&bom), Decimal::new(350, 2));
    }

    #[test]
    fn test_usage_sums_across_product_and_parts() {
        let bom = bom_with_parts();
        let usage = CostCalculator::total_filament_usage(&bom);

        assert_eq!(usage.len(), 2);
        // 線材1：50（本體）+ 30（零件A）= 80
        assert_eq!(usage[&1], Decimal::from(80));
        // 線材2：20 + 10 = 30
        assert_eq!(usage[&2], Decimal::from(30));
    }

    #[test]
    fn test_total_cost_rounds_once_at_end() {
        let bom = bom_with_parts();
        let mut filaments = HashMap::new();
        filaments.insert(1, filament(1, 25, 1000));
        filaments.insert(2, filament(2, 30, 1000));

        // 80/1000*25 + 30/1000*30 = 2.00 + 0.90 = 2.90
        let cost = CostCalculator::total_cost(&bom, &filaments).unwrap();
        assert_eq!(cost, Decimal::new(290, 2));
    }

    #[test]
    fn test_bankers_rounding_on_final_total() {
        // 單一線材 5g / 每捲 800g × 每捲 20 元 = 0.125 → 半數成雙 → 0.12
        let product = Product::new("Chip", "S", "Grey");
        let bom = BomView {
            product,
            direct_usage: vec![FilamentUsage::new(1, Decimal::from(5))],
            parts: vec![],
        };
        let mut filaments = HashMap::new();
        filaments.insert(1, filament(1, 20, 800));

        let cost = CostCalculator::total_cost(&bom, &filaments).unwrap();
        assert_eq!(cost, Decimal::new(12, 2));
    }

    #[test]
    fn test_missing_filament_is_not_found() {
        let bom = bom_with_parts();
        let filaments = HashMap::new();
        assert!(matches!(
            CostCalculator::total_cost(&bom, &filaments),
            Err(SpoolError::NotFound(_))
        ));
    }

    #[test]
    fn test_part_cost_scoped_to_part() {
        let bom = bom_with_parts();
        let mut filaments = HashMap::new();
        filaments.insert(1, filament(1, 25, 1000));
        filaments.insert(2, filament(2, 30, 1000));

        // 零件A：30/1000*25 + 20/1000*30 = 0.75 + 0.60 = 1.35
        let cost = CostCalculator::part_cost(&bom.parts[0], &filaments).unwrap();
        assert_eq!(cost, Decimal::new(135, 2));
    }

    #[test]
    fn test_zero_grams_per_roll_rejected() {
        let bom = bom_with_parts();
        let mut filaments = HashMap::new();
        filaments.insert(1, filament(1, 25, 0));
        filaments.insert(2, filament(2, 30, 1000));

        assert!(matches!(
            CostCalculator::total_cost(&bom, &filaments),
            Err(SpoolError::Validation(_))
        ));
    }
}
