//! # Spool — 3D 列印材料與庫存引擎
//!
//! 線材帳本（整捲 + 開封捲的兩段式庫存）、兩層 BOM 成本彙算、
//! 可精確沖銷的銷售交易、可印數計算、補貨規劃與銷售報表。
//!
//! 各層的分工：
//! - [`spool_core`]：資料模型與錯誤型別
//! - [`spool_calc`]：純函數計算層（成本、可印數、補貨、報表、預測）
//! - [`spool_store`]：儲存協作層（ID 配發、唯一鍵、串聯刪除、交易）
//! - [`spool_service`]：表現層進入點
//!
//! ## 快速開始
//!
//! ```
//! use rust_decimal::Decimal;
//! use spool::{FilamentFields, InventoryService, MemoryStore};
//!
//! let mut service = InventoryService::new(MemoryStore::new());
//! let filament = service
//!     .save_filament(
//!         None,
//!         FilamentFields {
//!             brand: Some("Prusament".to_string()),
//!             material: Some("PLA".to_string()),
//!             color: Some("Galaxy Black".to_string()),
//!             cost_per_roll: Some(Decimal::from(25)),
//!             grams_per_roll: Some(Decimal::from(1000)),
//!             ..FilamentFields::default()
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(filament.total_available(), Decimal::from(1000));
//! ```

pub use spool_calc::{
    AnalyticsCalculator, AnalyticsReport, CostCalculator, DailyStats, FilamentStats, OrderLine,
    PredictionCalculator, PrintableCalculator, ProductStats, ReorderCalculator, TodoData,
};
pub use spool_core::{
    BomView, Filament, FilamentId, FilamentPurchase, FilamentUsage, Part, PartId, PartView,
    Product, ProductId, PurchaseId, Result, Sale, SpoolError,
};
pub use spool_service::{
    FilamentFields, InventoryService, PartInput, ProductFields, SaleUpdate,
};
pub use spool_store::MemoryStore;
