//! # Spool Service
//!
//! 對表現層曝露的同步操作集合：線材與產品維護、
//! 銷售交易管理、報表查詢。所有變更都在儲存層交易內執行。

pub mod service;

pub use service::{
    FilamentFields, InventoryService, PartInput, ProductFields, SaleUpdate,
};
