//! Comparison report types
//!
//! A report is derived from a chart snapshot and never stored by the
//! workflow itself; saving it is up to the host.

use dcr_chart::{AiFinding, ConditionSet, Dentition, Presence, Tooth, ToothCode};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Outcome of comparing one tooth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    /// Both sides match
    Agree,
    /// Both sides populated and differ
    Disagree,
    /// At least one side has nothing recorded
    Incomplete,
}

impl Agreement {
    /// Short label for tables
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Agreement::Agree => "agree",
            Agreement::Disagree => "DISAGREE",
            Agreement::Incomplete => "incomplete",
        }
    }
}

/// One side of a comparison: what was recorded for a tooth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToothReading {
    /// Presence
    pub presence: Presence,
    /// Conditions of a present tooth
    #[serde(default, skip_serializing_if = "ConditionSet::is_empty")]
    pub conditions: ConditionSet,
    /// Diagnosis of a missing tooth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
}

impl ToothReading {
    /// Clinician side of a tooth, if anything was recorded
    #[must_use]
    pub fn manual(tooth: &Tooth) -> Option<Self> {
        if !tooth.has_manual_entry() {
            return None;
        }
        let finding = tooth.manual_finding.as_ref();
        Some(Self {
            presence: tooth.presence,
            conditions: tooth.manual_conditions(),
            diagnosis: finding.and_then(|f| f.diagnosis.clone()),
        })
    }

    /// Oracle side of a tooth
    #[must_use]
    pub fn ai(finding: &AiFinding) -> Self {
        Self {
            presence: finding.presence,
            conditions: finding.finding.conditions.clone(),
            diagnosis: finding.finding.diagnosis.clone(),
        }
    }

    fn describe(&self) -> String {
        match (self.presence, self.diagnosis.as_deref()) {
            (Presence::Present, _) if self.conditions.is_empty() => "present".to_string(),
            (Presence::Present, _) => format!("present, {}", self.conditions),
            (Presence::Missing, Some(diagnosis)) => format!("missing, {diagnosis}"),
            (Presence::Missing, None) => "missing".to_string(),
            (Presence::Unset, _) => "-".to_string(),
        }
    }
}

/// Comparison of one tooth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Tooth
    pub code: ToothCode,
    /// Agreement status
    pub status: Agreement,
    /// Clinician side
    pub manual: Option<ToothReading>,
    /// Oracle side
    pub ai: Option<ToothReading>,
    /// Oracle confidence, when the oracle answered
    pub ai_confidence: Option<f32>,
}

impl ComparisonEntry {
    /// Incomplete because only the clinician recorded something
    #[inline]
    #[must_use]
    pub fn is_manual_only(&self) -> bool {
        self.manual.is_some() && self.ai.is_none()
    }

    /// Incomplete because only the oracle recorded something
    #[inline]
    #[must_use]
    pub fn is_ai_only(&self) -> bool {
        self.manual.is_none() && self.ai.is_some()
    }
}

/// Counts per agreement status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Teeth where both sides agree
    pub agree: usize,
    /// Teeth where both sides disagree
    pub disagree: usize,
    /// Teeth missing at least one side
    pub incomplete: usize,
}

impl ComparisonSummary {
    /// Share of compared teeth that agree, `None` when nothing was compared
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn agreement_rate(&self) -> Option<f64> {
        let compared = self.agree + self.disagree;
        (compared > 0).then(|| self.agree as f64 / compared as f64)
    }
}

/// Per-tooth agreement between manual and AI findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Dentition of the compared chart
    pub dentition: Dentition,
    /// One entry per chart tooth, ascending by code
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonReport {
    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for a report over an empty chart
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for one tooth
    #[must_use]
    pub fn entry(&self, code: ToothCode) -> Option<&ComparisonEntry> {
        self.entries
            .binary_search_by_key(&code, |e| e.code)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Entries whose sides disagree
    pub fn disagreements(&self) -> impl Iterator<Item = &ComparisonEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == Agreement::Disagree)
    }

    /// Counts per status
    #[must_use]
    pub fn summary(&self) -> ComparisonSummary {
        self.entries
            .iter()
            .fold(ComparisonSummary::default(), |mut acc, e| {
                match e.status {
                    Agreement::Agree => acc.agree += 1,
                    Agreement::Disagree => acc.disagree += 1,
                    Agreement::Incomplete => acc.incomplete += 1,
                }
                acc
            })
    }

    /// Plain-text table, one line per tooth that has any data
    #[must_use]
    pub fn generate_text(&self) -> String {
        let summary = self.summary();
        let mut out = String::new();
        let _ = writeln!(out, "Comparison Report");
        let _ = writeln!(out, "=================");
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<6}{:<12}{:<30}{}", "Tooth", "Status", "Manual", "AI");
        for entry in &self.entries {
            if entry.manual.is_none() && entry.ai.is_none() {
                continue;
            }
            let manual = entry.manual.as_ref().map_or_else(|| "-".to_string(), ToothReading::describe);
            let ai = entry.ai.as_ref().map_or_else(|| "-".to_string(), ToothReading::describe);
            let _ = writeln!(
                out,
                "{:<6}{:<12}{:<30}{}",
                entry.code.to_string(),
                entry.status.label(),
                manual,
                ai
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Agree: {}  Disagree: {}  Incomplete: {}",
            summary.agree, summary.disagree, summary.incomplete
        );
        if let Some(rate) = summary.agreement_rate() {
            let _ = writeln!(out, "Agreement rate: {:.1}%", rate * 100.0);
        }
        out
    }
}
