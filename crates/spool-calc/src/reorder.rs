//! 補貨規劃
//!
//! 「待印清單」挑出庫存不足且最暢銷的產品；
//! 「訂購清單」估算每種線材的缺口並換算成整捲數。

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spool_core::{BomView, Filament, FilamentId, Product, ProductId};

use crate::costing::CostCalculator;

/// 補貨目標庫存：低於此數的產品列為待印候選，並補到此數
pub const RESTOCK_TARGET: i64 = 3;

/// 待印清單長度上限
pub const TO_PRINT_LIMIT: usize = 4;

/// 緩衝量：最耗料的單一產品再印幾個所需的料
pub const BUFFER_UNITS: i64 = 6;

/// 單筆線材訂購建議
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 線材ID
    pub filament_id: FilamentId,

    /// 建議訂購整捲數（缺口克數對每捲克數向上取整）
    pub rolls: u32,

    /// 缺口克數
    pub grams: Decimal,
}

/// 補貨規劃結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoData {
    /// 優先補印的產品（銷量高者在前，至多 [`TO_PRINT_LIMIT`] 個）
    pub to_print: Vec<Product>,

    /// 各線材的訂購建議（僅含缺口為正者）
    pub to_order: Vec<OrderLine>,
}

/// 補貨規劃計算器
pub struct ReorderCalculator;

impl ReorderCalculator {
    /// 產生待印清單與線材訂購建議
    ///
    /// `sale_counts` 為各產品的歷史銷售筆數（全期間）。
    pub fn todo(
        boms: &[BomView],
        filaments: &[Filament],
        sale_counts: &HashMap<ProductId, u64>,
    ) -> TodoData {
        let usage_by_product: HashMap<ProductId, HashMap<FilamentId, Decimal>> = boms
            .iter()
            .map(|bom| (bom.product.id, CostCalculator::total_filament_usage(bom)))
            .collect();

        // 候選：庫存低於補貨目標；穩定排序保留同銷量時的原順序
        let mut to_print: Vec<Product> = boms
            .iter()
            .map(|bom| bom.product.clone())
            .filter(|product| product.inventory_count < RESTOCK_TARGET)
            .collect();
        to_print.sort_by_key(|product| {
            std::cmp::Reverse(sale_counts.get(&product.id).copied().unwrap_or(0))
        });
        to_print.truncate(TO_PRINT_LIMIT);

        tracing::debug!("待印候選: {} 項", to_print.len());

        let mut to_order = Vec::new();
        for filament in filaments {
            let per_unit = |product_id: ProductId| -> Decimal {
                usage_by_product
                    .get(&product_id)
                    .and_then(|usage| usage.get(&filament.id))
                    .copied()
                    .unwrap_or(Decimal::ZERO)
            };

            // 待印清單補到目標庫存所需的克數
            let mut grams_todo = Decimal::ZERO;
            for product in &to_print {
                let units_needed = (RESTOCK_TARGET - product.inventory_count).max(0);
                grams_todo += per_unit(product.id) * Decimal::from(units_needed);
            }

            // 緩衝：最耗這種線材的單一產品印 BUFFER_UNITS 個所需
            let mut grams_buffer = Decimal::ZERO;
            for bom in boms {
                grams_buffer =
                    grams_buffer.max(per_unit(bom.product.id) * Decimal::from(BUFFER_UNITS));
            }

            let total_needed = grams_todo + grams_buffer;
            let grams_to_order = (total_needed - filament.total_available()).max(Decimal::ZERO);

            if grams_to_order > Decimal::ZERO {
                let rolls = if filament.grams_per_roll > Decimal::ZERO {
                    (grams_to_order / filament.grams_per_roll)
                        .ceil()
                        .to_u32()
                        .unwrap_or(0)
                } else {
                    0
                };

                tracing::debug!(
                    "線材 {} 缺口 {}g，建議訂購 {} 捲",
                    filament.id,
                    grams_to_order,
                    rolls
                );

                to_order.push(OrderLine {
                    filament_id: filament.id,
                    rolls,
                    grams: grams_to_order,
                });
            }
        }

        TodoData { to_print, to_order }
    }
}
