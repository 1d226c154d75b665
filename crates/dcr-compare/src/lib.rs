//! DCR Compare - manual vs AI agreement per tooth
//!
//! [`ComparisonEngine::compare`] turns a chart snapshot into a
//! [`ComparisonReport`] for rendering or saving.

pub mod engine;
pub mod report;

pub use engine::{chart_from_readings, classify, ComparisonEngine};
pub use report::{Agreement, ComparisonEntry, ComparisonReport, ComparisonSummary, ToothReading};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
