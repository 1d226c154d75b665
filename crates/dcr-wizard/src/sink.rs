//! Report sink collaborator

use crate::patient::{PatientProfile, StudentIdentity};
use crate::session::Role;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dcr_chart::{CaseId, ImageRef};
use dcr_compare::ComparisonReport;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Comparison report plus the case metadata it was produced for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    /// Case the report belongs to
    pub case_id: CaseId,
    /// Image the case was annotated on
    pub image: Option<ImageRef>,
    /// Role of the saving session
    pub role: Role,
    /// Patient profile, when entered
    pub patient: Option<PatientProfile>,
    /// Student identity, when entered
    pub student: Option<StudentIdentity>,
    /// Save time
    pub saved_at: DateTime<Utc>,
    /// The report
    pub report: ComparisonReport,
}

/// Save failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    /// Sink refused or failed to store the report
    #[error("report sink rejected the report: {0}")]
    Rejected(String),
}

/// Where saved reports go
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist a report
    ///
    /// # Errors
    /// - `SaveError::Rejected` when the report cannot be stored
    async fn save(&self, report: SavedReport) -> Result<(), SaveError>;
}

/// Keeps saved reports in memory
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    saved: Mutex<Vec<SavedReport>>,
}

impl MemoryReportSink {
    /// Create empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports saved so far, oldest first
    #[must_use]
    pub fn saved(&self) -> Vec<SavedReport> {
        self.saved.lock().clone()
    }

    /// Number of saved reports
    #[must_use]
    pub fn len(&self) -> usize {
        self.saved.lock().len()
    }

    /// True when nothing was saved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.lock().is_empty()
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn save(&self, report: SavedReport) -> Result<(), SaveError> {
        tracing::debug!(case = %report.case_id, "report kept in memory");
        self.saved.lock().push(report);
        Ok(())
    }
}
