//! Diagnosis oracle interface
//!
//! The inference engine is an external, possibly non-deterministic service.
//! It is reached only through [`DiagnosisOracle`], so the rest of the
//! workflow stays deterministic and can run against [`TableOracle`] or a
//! test stub.

use crate::error::OracleError;
use async_trait::async_trait;
use dcr_chart::{AiFinding, Condition, Dentition, ImageRef, ToothCode};
use std::collections::BTreeMap;

/// One capability: diagnose a tooth on an image
#[async_trait]
pub trait DiagnosisOracle: Send + Sync {
    /// Diagnose `code` on `image`
    ///
    /// # Errors
    /// - `OracleError::Unavailable` on network or model failure
    /// - `OracleError::UnsupportedTooth` if the model cannot judge `code`
    async fn diagnose(&self, image: &ImageRef, code: ToothCode) -> Result<AiFinding, OracleError>;
}

/// Oracle answering from a fixed per-tooth table
///
/// Unlisted teeth get the fallback finding. Teeth outside the supported
/// dentition are refused.
#[derive(Debug, Clone)]
pub struct TableOracle {
    entries: BTreeMap<ToothCode, AiFinding>,
    fallback: AiFinding,
    supported: Dentition,
}

impl TableOracle {
    /// Empty table: every permanent tooth reads as present and sound
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback: AiFinding::present(Condition::Sound).with_confidence(0.9),
            supported: Dentition::Permanent,
        }
    }

    /// Build from `(code, finding)` pairs
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (ToothCode, AiFinding)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            ..Self::new()
        }
    }

    /// Add or replace one entry
    #[inline]
    #[must_use]
    pub fn with_entry(mut self, code: ToothCode, finding: AiFinding) -> Self {
        self.entries.insert(code, finding);
        self
    }

    /// Finding used for unlisted teeth
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, fallback: AiFinding) -> Self {
        self.fallback = fallback;
        self
    }

    /// Dentition the table can answer for
    #[inline]
    #[must_use]
    pub fn supporting(mut self, dentition: Dentition) -> Self {
        self.supported = dentition;
        self
    }
}

impl Default for TableOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiagnosisOracle for TableOracle {
    async fn diagnose(&self, image: &ImageRef, code: ToothCode) -> Result<AiFinding, OracleError> {
        if code.dentition() != self.supported {
            return Err(OracleError::UnsupportedTooth(code));
        }
        tracing::debug!(tooth = %code, image = %image.file_name, "table oracle lookup");
        Ok(self
            .entries
            .get(&code)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
