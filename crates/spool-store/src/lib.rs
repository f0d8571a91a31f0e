//! # Spool Store
//!
//! 儲存協作層：ID 配發、唯一鍵檢查、顯式串聯刪除與
//! 快照式交易（全部提交或全部回滾）。
//! 參考實作以記憶體為後端，可在同一介面後替換持久化技術。

pub mod memory;

pub use memory::MemoryStore;
