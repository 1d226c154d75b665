//! DCR Annotation - manual and AI entry into a tooth chart
//!
//! Two ways findings reach a chart:
//! - [`ManualAnnotationEngine`]: clinician picks presence, condition or
//!   diagnosis per tooth and submits it
//! - [`AiAnnotationAdapter`]: asks a [`DiagnosisOracle`] about a tooth,
//!   with timeout and retries; the caller writes the result
//!
//! # Example
//!
//! ```rust,ignore
//! use dcr_annotation::{AdapterConfig, AiAnnotationAdapter, TableOracle};
//! use std::sync::Arc;
//!
//! # async fn example(case: &mut dcr_chart::Case) -> Result<(), Box<dyn std::error::Error>> {
//! let adapter = AiAnnotationAdapter::new(Arc::new(TableOracle::new()), AdapterConfig::default());
//! let code = "47".parse()?;
//! let finding = adapter.diagnose(case.image(), code).await?;
//! case.record_ai_finding(code, finding)?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod manual;
pub mod oracle;

pub use adapter::{AdapterConfig, AiAnnotationAdapter};
pub use error::{AnnotationError, OracleError};
pub use manual::ManualAnnotationEngine;
pub use oracle::{DiagnosisOracle, TableOracle};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
