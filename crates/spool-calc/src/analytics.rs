//! 銷售分析彙總
//!
//! 把日期區間內的銷售滾成營收、成本、利潤，以及
//! 按產品、按日、按線材的分項。成本一律以「目前的」
//! BOM 與線材價格重算，不使用歷史快照。

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spool_core::{BomView, Filament, FilamentId, ProductId, Result, Sale, SpoolError};

use crate::costing::CostCalculator;

/// 單一產品的銷售統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    /// 售出件數
    pub count: u64,
    /// 營收
    pub revenue: Decimal,
    /// 材料成本
    pub cost: Decimal,
}

/// 單日統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// 單一線材的耗用統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilamentStats {
    /// 耗用克數
    pub grams: Decimal,
    /// 按比例折算的材料成本（未取整累加）
    pub cost: Decimal,
}

/// 分析報表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// 銷售筆數
    pub total_sales_count: usize,

    /// 總營收
    pub gross_revenue: Decimal,

    /// 總材料成本
    pub total_cost: Decimal,

    /// 淨利 = 營收 − 成本
    pub net_profit: Decimal,

    /// 產品標籤 → 統計
    pub product_breakdown: BTreeMap<String, ProductStats>,

    /// 線材標籤 → 耗用統計
    pub filament_usage: BTreeMap<String, FilamentStats>,

    /// 日期（YYYY-MM-DD）→ 統計
    pub daily_stats: BTreeMap<String, DailyStats>,
}

/// 分析彙總計算器
pub struct AnalyticsCalculator;

impl AnalyticsCalculator {
    /// 彙總給定銷售集合
    ///
    /// 呼叫端負責先以日期區間篩選 `sales`；`boms` 必須涵蓋
    /// 每筆銷售指到的產品，缺漏時回傳 `NotFound`。
    pub fn aggregate(
        sales: &[Sale],
        boms: &HashMap<ProductId, BomView>,
        filaments: &HashMap<FilamentId, Filament>,
    ) -> Result<AnalyticsReport> {
        let mut report = AnalyticsReport {
            total_sales_count: sales.len(),
            ..AnalyticsReport::default()
        };

        for sale in sales {
            let bom = boms
                .get(&sale.product_id)
                .ok_or_else(|| SpoolError::NotFound(format!("產品 {}", sale.product_id)))?;

            report.gross_revenue += sale.total_value;

            let sale_cost = CostCalculator::total_cost(bom, filaments)?;
            report.total_cost += sale_cost;

            // 按產品分項
            let product_stats = report
                .product_breakdown
                .entry(bom.product.to_string())
                .or_default();
            product_stats.count += 1;
            product_stats.revenue += sale.total_value;
            product_stats.cost += sale_cost;

            // 按日分項
            let daily = report.daily_stats.entry(sale.day_key()).or_default();
            daily.revenue += sale.total_value;
            daily.cost += sale_cost;
            daily.profit += sale.total_value - sale_cost;

            // 按線材分項
            for (filament_id, grams) in CostCalculator::total_filament_usage(bom) {
                let filament = filaments
                    .get(&filament_id)
                    .ok_or_else(|| SpoolError::NotFound(format!("線材 {filament_id}")))?;

                let stats = report
                    .filament_usage
                    .entry(filament.to_string())
                    .or_default();
                stats.grams += grams;
                stats.cost += CostCalculator::usage_cost(grams, filament)?;
            }
        }

        report.net_profit = report.gross_revenue - report.total_cost;

        tracing::debug!(
            "分析彙總完成：{} 筆銷售，營收 {}",
            report.total_sales_count,
            report.gross_revenue
        );

        Ok(report)
    }
}
