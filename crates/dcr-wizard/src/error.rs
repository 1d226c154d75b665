//! Error types for the review wizard
//!
//! Every failure a dispatched action can produce. All of them except
//! `SessionExpired` leave the session on its current page; the host shows
//! [`WizardError::user_message`] and lets the user try again.

use crate::auth::AuthError;
use crate::page::Page;
use crate::sink::SaveError;
use crate::store::UploadError;
use dcr_annotation::AnnotationError;
use dcr_chart::ChartError;
use serde::{Deserialize, Serialize};

/// Wizard failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Chart rejected the write
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Manual or AI annotation failed
    #[error(transparent)]
    Annotation(AnnotationError),

    /// Image store refused the upload
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Credentials rejected
    #[error("authentication failed: {0}")]
    AuthenticationFailed(#[from] AuthError),

    /// Report sink refused the report
    #[error("save failed: {0}")]
    SaveFailed(#[from] SaveError),

    /// Edge outside the wizard graph
    #[error("illegal page transition: {from} -> {to}")]
    IllegalTransition {
        /// Current page
        from: Page,
        /// Requested page
        to: Page,
    },

    /// Action not accepted on the current page or by the current role
    #[error("action '{action}' is not available on the {page} page")]
    ActionNotAllowed {
        /// Action name
        action: &'static str,
        /// Current page
        page: Page,
    },

    /// Menu navigation attempted by a student, or towards the login page
    #[error("navigation to the {0} page is not allowed")]
    NavigationForbidden(Page),

    /// Student tried to edit manual findings after seeing the AI page
    #[error("manual findings are locked")]
    FindingsLocked,

    /// Dentition switch requested after data was recorded
    #[error("dentition cannot change once findings are recorded")]
    DentitionLocked,

    /// Patient or student identity field failed validation
    #[error("invalid {field}: {reason}")]
    InvalidPatientField {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Session idle for longer than the configured timeout
    #[error("session expired after {idle_secs}s of inactivity")]
    SessionExpired {
        /// Configured idle limit
        idle_secs: u64,
    },

    /// Action dispatched with no active session
    #[error("no active session")]
    NotLoggedIn,
}

impl From<AnnotationError> for WizardError {
    fn from(value: AnnotationError) -> Self {
        match value {
            AnnotationError::Chart(err) => WizardError::Chart(err),
            other => WizardError::Annotation(other),
        }
    }
}

/// Flat error taxonomy for hosts and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Tooth code outside the chart
    InvalidToothCode,
    /// Finding contradicts presence
    InvalidFindingState,
    /// Conditions that cannot be recorded together
    IncompatibleConditions,
    /// Submit before the entry is complete
    IncompleteAnnotation,
    /// AI action without an uploaded image
    NoImageUploaded,
    /// Wrong file extension
    UnsupportedImageFormat,
    /// Store did not answer in time
    UploadTimeout,
    /// Store failed for another reason
    UploadFailed,
    /// Credentials rejected
    AuthenticationFailed,
    /// Oracle unreachable or timed out
    OracleUnavailable,
    /// Oracle cannot diagnose the tooth
    UnsupportedTooth,
    /// Report sink failed
    SaveFailed,
    /// Wizard graph or page gating
    ActionNotAllowed,
    /// Menu navigation refused
    NavigationForbidden,
    /// Student findings locked
    FindingsLocked,
    /// Dentition switch refused
    DentitionLocked,
    /// Patient or identity validation
    InvalidPatientField,
    /// Idle timeout
    SessionExpired,
}

impl WizardError {
    /// Flat kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Chart(err) => chart_kind(err),
            Self::Annotation(err) => match err {
                AnnotationError::Chart(inner) => chart_kind(inner),
                AnnotationError::IncompleteAnnotation { .. } => ErrorKind::IncompleteAnnotation,
                AnnotationError::OracleUnavailable(_) => ErrorKind::OracleUnavailable,
                AnnotationError::UnsupportedTooth(_) => ErrorKind::UnsupportedTooth,
            },
            Self::Upload(err) => match err {
                UploadError::UnsupportedImageFormat { .. } => ErrorKind::UnsupportedImageFormat,
                UploadError::Timeout { .. } => ErrorKind::UploadTimeout,
                UploadError::Storage(_) => ErrorKind::UploadFailed,
            },
            Self::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            Self::SaveFailed(_) => ErrorKind::SaveFailed,
            Self::IllegalTransition { .. } | Self::ActionNotAllowed { .. } | Self::NotLoggedIn => {
                ErrorKind::ActionNotAllowed
            }
            Self::NavigationForbidden(_) => ErrorKind::NavigationForbidden,
            Self::FindingsLocked => ErrorKind::FindingsLocked,
            Self::DentitionLocked => ErrorKind::DentitionLocked,
            Self::InvalidPatientField { .. } => ErrorKind::InvalidPatientField,
            Self::SessionExpired { .. } => ErrorKind::SessionExpired,
        }
    }

    /// Check if the session survives this error on its current page
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SessionExpired { .. })
    }

    /// Check if repeating the same action may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::OracleUnavailable | ErrorKind::UploadTimeout | ErrorKind::SaveFailed
        )
    }

    /// Message shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Chart(ChartError::NoImageUploaded) => "No image has been uploaded yet.".to_string(),
            Self::Upload(UploadError::UnsupportedImageFormat { extension, expected }) => {
                format!("Cannot use files with extension '{extension}' use '{expected}' instead")
            }
            Self::AuthenticationFailed(AuthError::InvalidCredentials) => {
                "Username/password is incorrect".to_string()
            }
            Self::AuthenticationFailed(AuthError::Store(_)) => {
                "Login is unavailable right now. Please try again later.".to_string()
            }
            Self::FindingsLocked => "You already submitted your findings!".to_string(),
            Self::SessionExpired { .. } => "Your session has expired. Please log in again.".to_string(),
            other => {
                let text = other.to_string();
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => text,
                }
            }
        }
    }
}

fn chart_kind(err: &ChartError) -> ErrorKind {
    match err {
        ChartError::InvalidToothCode(_) => ErrorKind::InvalidToothCode,
        ChartError::InvalidFindingState { .. } => ErrorKind::InvalidFindingState,
        ChartError::IncompatibleConditions { .. } | ChartError::RootCanalWithoutRestoration => {
            ErrorKind::IncompatibleConditions
        }
        ChartError::NoImageUploaded => ErrorKind::NoImageUploaded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcr_chart::ToothCode;

    #[test]
    fn annotation_chart_errors_flatten() {
        let err = WizardError::from(AnnotationError::Chart(ChartError::NoImageUploaded));
        assert_eq!(err, WizardError::Chart(ChartError::NoImageUploaded));
        assert_eq!(err.kind(), ErrorKind::NoImageUploaded);
        assert_eq!(err.user_message(), "No image has been uploaded yet.");
    }

    #[test]
    fn oracle_failures_keep_their_kind() {
        let code: ToothCode = "47".parse().unwrap();
        let err = WizardError::from(AnnotationError::UnsupportedTooth(code));
        assert_eq!(err.kind(), ErrorKind::UnsupportedTooth);
        assert!(!err.is_retryable());

        let err = WizardError::from(AnnotationError::OracleUnavailable("down".to_string()));
        assert!(err.is_retryable());
        assert!(err.is_recoverable());
    }

    #[test]
    fn upload_format_message() {
        let err = WizardError::from(UploadError::UnsupportedImageFormat {
            extension: "png".to_string(),
            expected: "jpeg' or 'jpg".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::UnsupportedImageFormat);
        assert_eq!(
            err.user_message(),
            "Cannot use files with extension 'png' use 'jpeg' or 'jpg' instead"
        );
    }

    #[test]
    fn credential_store_fault_not_reported_as_bad_password() {
        let bad = WizardError::from(AuthError::InvalidCredentials);
        assert_eq!(bad.user_message(), "Username/password is incorrect");

        let broken = WizardError::from(AuthError::Store("invalid PHC string".to_string()));
        assert_eq!(broken.kind(), ErrorKind::AuthenticationFailed);
        assert_ne!(broken.user_message(), bad.user_message());
        assert!(!broken.user_message().contains("PHC"));
    }

    #[test]
    fn condition_conflicts_have_their_own_kind() {
        let err = WizardError::from(ChartError::RootCanalWithoutRestoration);
        assert_eq!(err.kind(), ErrorKind::IncompatibleConditions);
        assert_eq!(
            err.user_message(),
            "A root canal filling needs a dental filling, crown or bridge"
        );
    }

    #[test]
    fn only_expiry_is_unrecoverable() {
        assert!(!WizardError::SessionExpired { idle_secs: 1800 }.is_recoverable());
        assert!(WizardError::FindingsLocked.is_recoverable());
        assert_eq!(
            WizardError::FindingsLocked.user_message(),
            "You already submitted your findings!"
        );
    }

    #[test]
    fn generic_messages_are_capitalised() {
        let err = WizardError::NavigationForbidden(Page::Login);
        assert_eq!(err.user_message(), "Navigation to the Login page is not allowed");
    }
}
