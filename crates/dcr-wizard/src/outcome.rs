//! Result of dispatching one action

use crate::error::WizardError;
use crate::page::Page;
use dcr_chart::{AiFinding, Tooth, ToothCode};
use dcr_compare::ComparisonReport;
use serde::{Deserialize, Serialize};

/// Shown when an annotation page is used before any upload
pub const NO_IMAGE_WARNING: &str = "No image has been uploaded yet.";

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Neutral information
    Info,
    /// Completed action
    Success,
    /// Soft gate, the action still went through
    Warning,
}

/// Message for the user that does not block the action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

impl Notice {
    /// Info notice
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Warning notice
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Data an action produced for display
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Snapshot of the selected tooth
    Tooth(Box<Tooth>),
    /// Oracle answer written to the chart
    AiFinding {
        /// Tooth
        code: ToothCode,
        /// Finding
        finding: AiFinding,
    },
    /// Report computed on entering the comparison page
    Report(Box<ComparisonReport>),
}

/// Page the session is on after an action, plus what to show
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Current page after the action
    pub page: Page,
    /// Non-blocking messages
    pub notices: Vec<Notice>,
    /// Data to render
    pub payload: Option<Payload>,
    /// Failure, in which case `page` is unchanged
    pub error: Option<WizardError>,
}

impl Outcome {
    /// Successful outcome on `page`
    #[must_use]
    pub fn ok(page: Page) -> Self {
        Self {
            page,
            notices: Vec::new(),
            payload: None,
            error: None,
        }
    }

    /// Failed outcome, staying on `page`
    #[must_use]
    pub fn failed(page: Page, error: WizardError) -> Self {
        Self {
            page,
            notices: Vec::new(),
            payload: None,
            error: Some(error),
        }
    }

    /// Add a notice
    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    /// Attach a payload
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// True when the action succeeded
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Failure, if any
    #[must_use]
    pub fn error(&self) -> Option<&WizardError> {
        self.error.as_ref()
    }

    /// True when any warning notice carries `message`
    #[must_use]
    pub fn has_warning(&self, message: &str) -> bool {
        self.notices
            .iter()
            .any(|n| n.level == NoticeLevel::Warning && n.message == message)
    }

    /// Convert into a plain result
    ///
    /// # Errors
    /// The outcome's error, if any
    pub fn into_result(self) -> Result<Page, WizardError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.page),
        }
    }
}
