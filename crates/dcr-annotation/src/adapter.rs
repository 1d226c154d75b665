//! AI annotation adapter
//!
//! Wraps a [`DiagnosisOracle`] with the image gate, a bounded timeout per
//! attempt and a retry budget. The adapter returns findings; it never
//! writes to a chart.

use crate::error::AnnotationError;
use crate::oracle::DiagnosisOracle;
use dcr_chart::{AiFinding, ChartError, ImageContext, ToothCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Timeout and retry settings for oracle calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Attempts before giving up (at least 1)
    pub max_attempts: u32,
}

impl AdapterConfig {
    /// Per-attempt timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_attempts: 2,
        }
    }
}

/// Gatekeeper between the workflow and the oracle
#[derive(Clone)]
pub struct AiAnnotationAdapter {
    oracle: Arc<dyn DiagnosisOracle>,
    config: AdapterConfig,
}

impl std::fmt::Debug for AiAnnotationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiAnnotationAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AiAnnotationAdapter {
    /// Create adapter over `oracle`
    #[must_use]
    pub fn new(oracle: Arc<dyn DiagnosisOracle>, config: AdapterConfig) -> Self {
        Self { oracle, config }
    }

    /// Adapter settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> AdapterConfig {
        self.config
    }

    /// Ask the oracle about one tooth
    ///
    /// Unavailability and timeouts are retried up to `max_attempts`;
    /// an unsupported tooth is reported at once.
    ///
    /// # Errors
    /// - `ChartError::NoImageUploaded` (wrapped) if `image` is empty; the
    ///   oracle is not called
    /// - `AnnotationError::OracleUnavailable` once every attempt failed
    /// - `AnnotationError::UnsupportedTooth` if the oracle refuses `code`
    pub async fn diagnose(
        &self,
        image: &ImageContext,
        code: ToothCode,
    ) -> Result<AiFinding, AnnotationError> {
        let image = image.current().ok_or(ChartError::NoImageUploaded)?;
        let attempts = self.config.max_attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.config.timeout(), self.oracle.diagnose(image, code)).await {
                Ok(Ok(finding)) => {
                    tracing::debug!(tooth = %code, attempt, "oracle answered");
                    return Ok(finding);
                }
                Ok(Err(err)) => {
                    let err = AnnotationError::from(err);
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    tracing::warn!(tooth = %code, attempt, error = %err, "oracle call failed");
                    last_failure = err.to_string();
                }
                Err(_) => {
                    tracing::warn!(tooth = %code, attempt, timeout_ms = self.config.timeout_ms, "oracle call timed out");
                    last_failure = format!("no answer within {}ms", self.config.timeout_ms);
                }
            }
        }

        Err(AnnotationError::OracleUnavailable(format!(
            "{last_failure} (after {attempts} attempts)"
        )))
    }
}
