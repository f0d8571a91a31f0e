//! 銷售記錄模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::ProductId;

/// 單筆銷售記錄
///
/// 一筆記錄恰代表「售出一單位」；多件成交由交易管理器
/// 拆成多筆記錄，`total_value` 為該單位實收金額（2位小數）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// 銷售記錄ID
    pub id: Uuid,

    /// 產品ID
    pub product_id: ProductId,

    /// 成交時間
    pub date: DateTime<Utc>,

    /// 該單位實收金額
    pub total_value: Decimal,
}

impl Sale {
    /// 創建新的銷售記錄（時間為當下）
    pub fn new(product_id: ProductId, total_value: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            date: Utc::now(),
            total_value,
        }
    }

    /// 建構器模式：設置成交時間
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// 成交日（`YYYY-MM-DD`，分析日報表的分組鍵）
    pub fn day_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
