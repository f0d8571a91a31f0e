//! 線材庫存模型與捲料帳本

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 線材ID（由儲存層配發）
pub type FilamentId = u64;

/// 進貨記錄ID
pub type PurchaseId = u64;

/// 線材庫存記錄
///
/// 以「開封中的一捲（grams_remaining）+ 未開封整捲（rolls_in_stock）」
/// 追蹤單一原料的存量。(brand, material, color) 為唯一鍵。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    /// 線材ID
    pub id: FilamentId,

    /// 品牌
    pub brand: String,

    /// 材質（PLA、PETG…）
    pub material: String,

    /// 顏色
    pub color: String,

    /// 每捲成本（2位小數）
    pub cost_per_roll: Decimal,

    /// 每捲克數
    pub grams_per_roll: Decimal,

    /// 開封捲剩餘克數
    ///
    /// 整捲庫存耗盡後可為負（赤字），見 [`Filament::adjust_inventory`]
    pub grams_remaining: Decimal,

    /// 未開封整捲數
    pub rolls_in_stock: u32,
}

impl Filament {
    /// 創建新的線材記錄（開封捲視為全滿、無備用整捲）
    pub fn new(
        brand: impl Into<String>,
        material: impl Into<String>,
        color: impl Into<String>,
        cost_per_roll: Decimal,
        grams_per_roll: Decimal,
    ) -> Self {
        Self {
            id: 0,
            brand: brand.into(),
            material: material.into(),
            color: color.into(),
            cost_per_roll,
            grams_per_roll,
            grams_remaining: grams_per_roll,
            rolls_in_stock: 0,
        }
    }

    /// 建構器模式：設置開封捲剩餘克數
    pub fn with_grams_remaining(mut self, grams: Decimal) -> Self {
        self.grams_remaining = grams;
        self
    }

    /// 建構器模式：設置未開封整捲數
    pub fn with_rolls_in_stock(mut self, rolls: u32) -> Self {
        self.rolls_in_stock = rolls;
        self
    }

    /// 總可用克數 = 開封捲剩餘 + 整捲數 × 每捲克數
    pub fn total_available(&self) -> Decimal {
        self.grams_remaining + Decimal::from(self.rolls_in_stock) * self.grams_per_roll
    }

    /// 調整庫存（帳本核心運算）
    ///
    /// `delta_grams` 為正表示消耗，為負表示回補（銷售沖銷）。
    /// 開封捲不足時自動開新捲；回補超過一捲時把滿捲折回整捲庫存。
    /// 整捲耗盡後剩餘赤字保留為負值，不做修正。
    pub fn adjust_inventory(&mut self, delta_grams: Decimal) {
        self.grams_remaining -= delta_grams;

        // 開新捲補足赤字
        while self.grams_remaining < Decimal::ZERO
            && self.rolls_in_stock > 0
            && self.grams_per_roll > Decimal::ZERO
        {
            self.rolls_in_stock -= 1;
            self.grams_remaining += self.grams_per_roll;
        }

        // 滿捲折回整捲庫存
        while self.grams_per_roll > Decimal::ZERO && self.grams_remaining >= self.grams_per_roll {
            self.rolls_in_stock += 1;
            self.grams_remaining -= self.grams_per_roll;
        }
    }
}

impl core::fmt::Display for Filament {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.color, self.material)
    }
}

/// 線材進貨記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilamentPurchase {
    /// 進貨記錄ID
    pub id: PurchaseId,

    /// 線材ID
    pub filament_id: FilamentId,

    /// 進貨日期
    pub date: DateTime<Utc>,

    /// 購入整捲數
    pub rolls_bought: u32,

    /// 購入總克數
    pub grams_added: Decimal,
}

impl FilamentPurchase {
    /// 創建新的進貨記錄（日期為當下）
    pub fn new(filament_id: FilamentId, rolls_bought: u32, grams_added: Decimal) -> Self {
        Self {
            id: 0,
            filament_id,
            date: Utc::now(),
            rolls_bought,
            grams_added,
        }
    }

    /// 建構器模式：設置進貨日期
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}
