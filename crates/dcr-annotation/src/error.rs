//! Error types for annotation
//!
//! Covers:
//! - chart invariant violations surfaced while annotating
//! - incomplete manual entries at submit time
//! - oracle failures (unavailable, timed out, unsupported tooth)

use dcr_chart::{ChartError, ToothCode};

/// Annotation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    /// Chart rejected the write
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Submit attempted before the entry is complete
    #[error("incomplete annotation for tooth {code}: {reason}")]
    IncompleteAnnotation {
        /// Tooth being submitted
        code: ToothCode,
        /// What is missing
        reason: String,
    },

    /// Oracle could not be reached or did not answer in time
    #[error("diagnosis oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Oracle cannot diagnose this tooth
    #[error("diagnosis oracle does not support tooth {0}")]
    UnsupportedTooth(ToothCode),
}

impl AnnotationError {
    /// Check if retrying the same call may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OracleUnavailable(_))
    }
}

/// Failures reported by a [`crate::DiagnosisOracle`] implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// Network or model failure
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// Tooth outside what the model was trained on
    #[error("unsupported tooth: {0}")]
    UnsupportedTooth(ToothCode),
}

impl From<OracleError> for AnnotationError {
    fn from(value: OracleError) -> Self {
        match value {
            OracleError::Unavailable(reason) => AnnotationError::OracleUnavailable(reason),
            OracleError::UnsupportedTooth(code) => AnnotationError::UnsupportedTooth(code),
        }
    }
}
