//! Error types for chart mutation

use crate::tooth::{Condition, ToothCode};

/// Chart-level failures
///
/// Every variant is recoverable: the chart is left exactly as it was
/// before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    /// Code is not valid FDI notation, or not part of this chart's dentition
    #[error("invalid tooth code: {0}")]
    InvalidToothCode(String),

    /// Finding conflicts with the tooth's presence
    #[error("invalid finding for tooth {code}: {reason}")]
    InvalidFindingState {
        /// Tooth the finding was aimed at
        code: ToothCode,
        /// Human-readable explanation
        reason: String,
    },

    /// Two conditions that cannot be recorded on the same tooth
    #[error("{requested} cannot be combined with {existing}")]
    IncompatibleConditions {
        /// Condition already recorded
        existing: Condition,
        /// Condition being added
        requested: Condition,
    },

    /// Root canal filling without a dental filling, crown or bridge
    #[error("a root canal filling needs a dental filling, crown or bridge")]
    RootCanalWithoutRestoration,

    /// AI findings need an uploaded image
    #[error("no image has been uploaded")]
    NoImageUploaded,
}

impl ChartError {
    /// Build an [`ChartError::InvalidFindingState`]
    #[inline]
    pub fn invalid_finding(code: ToothCode, reason: impl Into<String>) -> Self {
        Self::InvalidFindingState {
            code,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_error_display() {
        let err = ChartError::InvalidToothCode("19".to_string());
        assert_eq!(err.to_string(), "invalid tooth code: 19");

        let code: ToothCode = "21".parse().unwrap();
        let err = ChartError::invalid_finding(code, "tooth is present");
        assert!(err.to_string().contains("tooth 21"));

        let err = ChartError::IncompatibleConditions {
            existing: Condition::Crown,
            requested: Condition::DentalFilling,
        };
        assert_eq!(err.to_string(), "Dental filling cannot be combined with Crown");
    }
}
