//! DCR Chart - canonical per-tooth state
//!
//! Foundation crate of the review workspace:
//! - [`ToothCode`] parsing and validation in FDI two-digit notation
//! - [`Tooth`], [`Finding`] and [`AiFinding`] for the manual and AI sides,
//!   with [`ConditionSet`] holding the combinable conditions of a tooth
//! - [`ToothChart`], the per-case map enforcing the finding invariants
//! - [`ImageContext`] and [`Case`] tying a chart to its uploaded image
//!
//! # Example
//!
//! ```rust
//! use dcr_chart::{Condition, Finding, Presence, ToothChart, ToothCode};
//!
//! let mut chart = ToothChart::default();
//! let code: ToothCode = "16".parse().unwrap();
//!
//! chart.set_presence(code, Presence::Present).unwrap();
//! chart
//!     .set_manual_finding(code, Finding::with_condition(Condition::DentalFilling))
//!     .unwrap();
//! chart.mark_submitted(code).unwrap();
//!
//! assert!(chart.get(code).unwrap().submitted);
//! ```

pub mod case;
pub mod chart;
pub mod error;
pub mod image;
pub mod tooth;

pub use case::{Case, CaseId};
pub use chart::ToothChart;
pub use error::ChartError;
pub use image::{ImageContext, ImageRef};
pub use tooth::{
    AiFinding, Condition, ConditionSet, Dentition, Finding, MissingTreatment, Presence, Tooth,
    ToothCode,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with charts
    pub use crate::{
        AiFinding, Case, ChartError, Condition, ConditionSet, Dentition, Finding, ImageContext,
        ImageRef, Presence, Tooth, ToothChart, ToothCode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
