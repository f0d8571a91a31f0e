//! 產品、零件與 BOM 用料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::filament::FilamentId;

/// 產品ID（由儲存層配發）
pub type ProductId = u64;

/// 零件ID
pub type PartId = u64;

/// 可銷售的列印產品
///
/// (product_type, size, color_variant) 為唯一鍵。
/// 一個產品可由多個零件（[`Part`]）組成。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: ProductId,

    /// 產品種類
    pub product_type: String,

    /// 尺寸
    pub size: String,

    /// 顏色款式
    pub color_variant: String,

    /// 本體列印工時（不含零件）
    pub print_time_hours: Decimal,

    /// 成品庫存數（交易過程中可為負）
    pub inventory_count: i64,
}

impl Product {
    /// 創建新的產品
    pub fn new(
        product_type: impl Into<String>,
        size: impl Into<String>,
        color_variant: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            product_type: product_type.into(),
            size: size.into(),
            color_variant: color_variant.into(),
            print_time_hours: Decimal::ZERO,
            inventory_count: 0,
        }
    }

    /// 建構器模式：設置本體列印工時
    pub fn with_print_time(mut self, hours: Decimal) -> Self {
        self.print_time_hours = hours;
        self
    }

    /// 建構器模式：設置成品庫存數
    pub fn with_inventory(mut self, count: i64) -> Self {
        self.inventory_count = count;
        self
    }

    /// 調整成品庫存（正負皆可）
    pub fn adjust_inventory(&mut self, amount: i64) {
        self.inventory_count += amount;
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {} - {}", self.product_type, self.size, self.color_variant)
    }
}

/// 產品的組成零件
///
/// 由產品獨占持有：產品刪除時零件與其用料一併刪除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// 零件ID
    pub id: PartId,

    /// 所屬產品ID
    pub product_id: ProductId,

    /// 零件名稱
    pub name: String,

    /// 零件列印工時
    pub print_time_hours: Decimal,
}

impl Part {
    /// 創建新的零件
    pub fn new(product_id: ProductId, name: impl Into<String>, print_time_hours: Decimal) -> Self {
        Self {
            id: 0,
            product_id,
            name: name.into(),
            print_time_hours,
        }
    }
}

/// 單筆用料：某線材每生產一單位所需克數
///
/// 同一持有者（產品或零件）對同一線材至多一筆；重複加入時覆寫克數。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilamentUsage {
    /// 線材ID
    pub filament_id: FilamentId,

    /// 每單位所需克數
    pub grams_needed: Decimal,
}

impl FilamentUsage {
    pub fn new(filament_id: FilamentId, grams_needed: Decimal) -> Self {
        Self {
            filament_id,
            grams_needed,
        }
    }
}

/// 零件視圖：零件本體 + 其直接用料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartView {
    pub part: Part,
    pub usage: Vec<FilamentUsage>,
}

/// BOM 視圖：產品本體、直接用料與所有零件
///
/// 由儲存層組裝，計算層（成本、可印數、補貨）只讀取不變更。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomView {
    pub product: Product,
    pub direct_usage: Vec<FilamentUsage>,
    pub parts: Vec<PartView>,
}
