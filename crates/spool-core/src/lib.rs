//! # Spool Core
//!
//! 核心資料模型與類型定義

pub mod filament;
pub mod product;
pub mod sale;

// Re-export 主要類型
pub use filament::{Filament, FilamentId, FilamentPurchase, PurchaseId};
pub use product::{BomView, FilamentUsage, Part, PartId, PartView, Product, ProductId};
pub use sale::Sale;

/// 庫存引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum SpoolError {
    #[error("驗證失敗: {0}")]
    Validation(String),

    #[error("找不到記錄: {0}")]
    NotFound(String),

    #[error("唯一鍵衝突: {0}")]
    Integrity(String),

    #[error("儲存層錯誤: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, SpoolError>;
