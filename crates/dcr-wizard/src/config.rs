//! Wizard configuration
//!
//! Defaults cover a single-user review station. Hosts may load overrides
//! from TOML; missing keys keep their defaults.
//!
//! ```toml
//! oracle_timeout_ms = 5000
//! oracle_max_attempts = 2
//! upload_timeout_ms = 10000
//! accepted_extensions = ["jpeg", "jpg"]
//! session_idle_timeout_secs = 1800
//! lock_student_findings = true
//! ```

use dcr_annotation::AdapterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Not valid TOML for this structure
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but out of range
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Wizard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Per-attempt oracle timeout
    pub oracle_timeout_ms: u64,
    /// Oracle attempts per diagnosis, including the first
    pub oracle_max_attempts: u32,
    /// Image store timeout
    pub upload_timeout_ms: u64,
    /// Accepted upload extensions, lowercase without dot
    pub accepted_extensions: Vec<String>,
    /// Inactivity after which the session is destroyed
    pub session_idle_timeout_secs: u64,
    /// Lock student manual findings once the AI page was entered
    pub lock_student_findings: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            oracle_timeout_ms: 5_000,
            oracle_max_attempts: 2,
            upload_timeout_ms: 10_000,
            accepted_extensions: vec!["jpeg".to_string(), "jpg".to_string()],
            session_idle_timeout_secs: 1_800,
            lock_student_findings: true,
        }
    }
}

impl WizardConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` for out-of-range values
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - otherwise as [`WizardConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |field| ConfigError::Invalid {
            field,
            reason: "must be greater than zero",
        };
        if self.oracle_timeout_ms == 0 {
            return Err(zero("oracle_timeout_ms"));
        }
        if self.oracle_max_attempts == 0 {
            return Err(zero("oracle_max_attempts"));
        }
        if self.upload_timeout_ms == 0 {
            return Err(zero("upload_timeout_ms"));
        }
        if self.session_idle_timeout_secs == 0 {
            return Err(zero("session_idle_timeout_secs"));
        }
        if self.accepted_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "accepted_extensions",
                reason: "at least one extension is required",
            });
        }
        Ok(())
    }

    /// Set oracle timeout
    #[must_use]
    pub fn with_oracle_timeout_ms(mut self, ms: u64) -> Self {
        self.oracle_timeout_ms = ms;
        self
    }

    /// Set oracle attempts
    #[must_use]
    pub fn with_oracle_max_attempts(mut self, attempts: u32) -> Self {
        self.oracle_max_attempts = attempts;
        self
    }

    /// Set upload timeout
    #[must_use]
    pub fn with_upload_timeout_ms(mut self, ms: u64) -> Self {
        self.upload_timeout_ms = ms;
        self
    }

    /// Replace accepted extensions
    #[must_use]
    pub fn with_accepted_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set idle timeout
    #[must_use]
    pub fn with_session_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.session_idle_timeout_secs = secs;
        self
    }

    /// Toggle the student findings lock
    #[must_use]
    pub fn with_lock_student_findings(mut self, lock: bool) -> Self {
        self.lock_student_findings = lock;
        self
    }

    /// Oracle retry settings
    #[must_use]
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            timeout_ms: self.oracle_timeout_ms,
            max_attempts: self.oracle_max_attempts,
        }
    }

    /// Upload timeout as a duration
    #[inline]
    #[must_use]
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    /// Idle timeout as a duration
    #[inline]
    #[must_use]
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }

    /// True when `extension` is accepted, case-insensitively
    #[must_use]
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.accepted_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Accepted extensions for messages: `jpeg` or `jpeg' or 'jpg`
    #[must_use]
    pub fn expected_extensions(&self) -> String {
        self.accepted_extensions.join("' or '")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WizardConfig::default();
        assert_eq!(config.oracle_timeout_ms, 5_000);
        assert_eq!(config.oracle_max_attempts, 2);
        assert!(config.accepts_extension("JPEG"));
        assert!(config.accepts_extension("jpg"));
        assert!(!config.accepts_extension("png"));
        assert_eq!(config.expected_extensions(), "jpeg' or 'jpg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = WizardConfig::from_toml_str("oracle_timeout_ms = 250\n").unwrap();
        assert_eq!(config.oracle_timeout_ms, 250);
        assert_eq!(config.upload_timeout_ms, 10_000);
        assert_eq!(config.adapter_config().timeout_ms, 250);
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = WizardConfig::from_toml_str("oracle_max_attempts = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "oracle_max_attempts",
                ..
            }
        ));
    }

    #[test]
    fn empty_extensions_rejected() {
        let err = WizardConfig::from_toml_str("accepted_extensions = []").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "accepted_extensions",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = WizardConfig::from_toml_str("oracle_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn single_extension_message() {
        let config = WizardConfig::default().with_accepted_extensions(["jpeg"]);
        assert_eq!(config.expected_extensions(), "jpeg");
        assert!(!config.accepts_extension("jpg"));
    }
}
