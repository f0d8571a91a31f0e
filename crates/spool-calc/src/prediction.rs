//! 銷售預測
//!
//! 簡單移動平均：過去 90 天的銷量除以 3，當作未來 30 天的預估。

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use spool_core::{ProductId, Sale};

/// 回看天數
pub const LOOKBACK_DAYS: i64 = 90;

/// 銷售預測計算器
pub struct PredictionCalculator;

impl PredictionCalculator {
    /// 預估某產品未來 30 天的銷量（2位小數）
    ///
    /// `now` 由呼叫端注入，方便測試固定時間點。
    pub fn sales_next_30_days(sales: &[Sale], product_id: ProductId, now: DateTime<Utc>) -> Decimal {
        let cutoff = now - Duration::days(LOOKBACK_DAYS);

        let recent = sales
            .iter()
            .filter(|sale| sale.product_id == product_id && sale.date >= cutoff)
            .count();

        let prediction = (Decimal::from(recent as u64) / Decimal::from(3)).round_dp(2);

        tracing::debug!("產品 {} 預估未來 30 天銷量: {}", product_id, prediction);

        prediction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale_days_ago(product_id: ProductId, now: DateTime<Utc>, days: i64) -> Sale {
        Sale::new(product_id, Decimal::from(10)).with_date(now - Duration::days(days))
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_ninety_day_window() {
        let now = fixed_now();
        let sales = vec![
            sale_days_ago(1, now, 10),
            sale_days_ago(1, now, 89),
            sale_days_ago(1, now, 91), // 超出窗口
            sale_days_ago(2, now, 5),  // 別的產品
        ];

        // 2 筆 / 3 = 0.67
        assert_eq!(
            PredictionCalculator::sales_next_30_days(&sales, 1, now),
            Decimal::new(67, 2)
        );
    }

    #[test]
    fn test_no_sales_predicts_zero() {
        assert_eq!(
            PredictionCalculator::sales_next_30_days(&[], 1, fixed_now()),
            Decimal::ZERO.round_dp(2)
        );
    }

    #[test]
    fn test_whole_number_average() {
        let now = fixed_now();
        let sales: Vec<Sale> = (0..9).map(|i| sale_days_ago(1, now, i)).collect();
        // 9 / 3 = 3.00
        assert_eq!(
            PredictionCalculator::sales_next_30_days(&sales, 1, now),
            Decimal::from(3).round_dp(2)
        );
    }
}
