//! 可印數計算
//!
//! 以最稀缺的線材為上限：每種所需線材各算一次
//! `floor(總可用克數 / 每單位克數)`，取最小值。

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use spool_core::{BomView, Filament, FilamentId, Result, SpoolError};

use crate::costing::CostCalculator;

/// 可印數計算器
pub struct PrintableCalculator;

impl PrintableCalculator {
    /// 目前線材庫存可生產的產品單位數
    ///
    /// 無任何用料、或所有用料克數皆非正時回傳 0。
    /// 線材赤字時結果可為負，呼叫端自行決定如何呈現。
    pub fn calculate(
        bom: &BomView,
        filaments: &HashMap<FilamentId, Filament>,
    ) -> Result<i64> {
        let usage = CostCalculator::total_filament_usage(bom);
        if usage.is_empty() {
            return Ok(0);
        }

        let mut limit: Option<i64> = None;
        for (filament_id, grams_needed) in &usage {
            if *grams_needed <= Decimal::ZERO {
                continue;
            }

            let filament = filaments
                .get(filament_id)
                .ok_or_else(|| SpoolError::NotFound(format!("線材 {filament_id}")))?;

            let can_print = (filament.total_available() / grams_needed)
                .floor()
                .to_i64()
                .unwrap_or(0);

            limit = Some(match limit {
                Some(current) => current.min(can_print),
                None => can_print,
            });
        }

        Ok(limit.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use spool_core::{FilamentUsage, Product};

    fn filament(id: FilamentId, grams_remaining: i64, rolls: u32) -> Filament {
        let mut fil = Filament::new(
            "Generic",
            "PLA",
            format!("Color-{id}"),
            Decimal::from(25),
            Decimal::from(1000),
        )
        .with_grams_remaining(Decimal::from(grams_remaining))
        .with_rolls_in_stock(rolls);
        fil.id = id;
        fil
    }

    fn single_usage_bom(grams_needed: i64) -> BomView {
        BomView {
            product: Product::new("Dragon", "Large", "Red"),
            direct_usage: vec![FilamentUsage::new(1, Decimal::from(grams_needed))],
            parts: vec![],
        }
    }

    // 2000g 可用：100g/件 → 20 件；300g/件 → 6 件（向下取整）
    #[rstest]
    #[case(100, 20)]
    #[case(300, 6)]
    #[case(2000, 1)]
    #[case(2001, 0)]
    fn test_floor_division(#[case] grams_needed: i64, #[case] expected: i64) {
        let bom = single_usage_bom(grams_needed);
        let mut filaments = HashMap::new();
        filaments.insert(1, filament(1, 1000, 1));

        assert_eq!(
            PrintableCalculator::calculate(&bom, &filaments).unwrap(),
            expected
        );
    }

    #[test]
    fn test_empty_usage_returns_zero() {
        let bom = BomView {
            product: Product::new("Dragon", "Large", "Red"),
            direct_usage: vec![],
            parts: vec![],
        };
        let filaments = HashMap::new();
        assert_eq!(PrintableCalculator::calculate(&bom, &filaments).unwrap(), 0);
    }

    #[test]
    fn test_non_positive_usage_returns_zero() {
        let bom = single_usage_bom(0);
        let mut filaments = HashMap::new();
        filaments.insert(1, filament(1, 1000, 1));
        assert_eq!(PrintableCalculator::calculate(&bom, &filaments).unwrap(), 0);
    }

    #[test]
    fn test_scarcest_filament_bounds_result() {
        // 線材1 充足（4000g / 100g = 40），線材2 稀缺（500g / 200g = 2）
        let bom = BomView {
            product: Product::new("Dragon", "Large", "Red"),
            direct_usage: vec![
                FilamentUsage::new(1, Decimal::from(100)),
                FilamentUsage::new(2, Decimal::from(200)),
            ],
            parts: vec![],
        };
        let mut filaments = HashMap::new();
        filaments.insert(1, filament(1, 1000, 3));
        filaments.insert(2, filament(2, 500, 0));

        assert_eq!(PrintableCalculator::calculate(&bom, &filaments).unwrap(), 2);
    }
}
