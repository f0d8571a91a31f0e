//! # Spool Calculation Engine
//!
//! BOM 成本、可印數、補貨規劃、銷售分析與預測的純計算層。
//! 所有計算器只讀取核心資料，不做任何變更。

pub mod analytics;
pub mod costing;
pub mod prediction;
pub mod printable;
pub mod reorder;

// Re-export 主要類型
pub use analytics::{AnalyticsCalculator, AnalyticsReport, DailyStats, FilamentStats, ProductStats};
pub use costing::CostCalculator;
pub use prediction::PredictionCalculator;
pub use printable::PrintableCalculator;
pub use reorder::{OrderLine, ReorderCalculator, TodoData};
