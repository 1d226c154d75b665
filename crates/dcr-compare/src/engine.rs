//! Comparison engine
//!
//! Classifies every tooth of a chart:
//! - `Agree`: same presence and, for present teeth, the same set of
//!   conditions
//! - `Disagree`: both sides recorded and they differ
//! - `Incomplete`: either side has nothing recorded
//!
//! Total and deterministic: a well-formed chart always yields one entry
//! per tooth, in ascending code order.

use crate::report::{Agreement, ComparisonEntry, ComparisonReport, ToothReading};
use dcr_chart::{
    AiFinding, ChartError, Dentition, Finding, ImageContext, ImageRef, Presence, ToothChart,
    ToothCode,
};
use std::collections::BTreeMap;

/// Stateless comparer
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine;

impl ComparisonEngine {
    /// Create new engine instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compare manual and AI findings of every tooth
    #[must_use]
    pub fn compare(&self, chart: &ToothChart) -> ComparisonReport {
        let entries: Vec<ComparisonEntry> = chart
            .iter()
            .map(|tooth| {
                let manual = ToothReading::manual(tooth);
                let ai = tooth.ai_finding.as_ref().map(ToothReading::ai);
                ComparisonEntry {
                    code: tooth.code,
                    status: classify(manual.as_ref(), ai.as_ref()),
                    manual,
                    ai,
                    ai_confidence: tooth.ai_finding.as_ref().map(|f| f.confidence),
                }
            })
            .collect();

        let report = ComparisonReport {
            dentition: chart.dentition(),
            entries,
        };
        let summary = report.summary();
        tracing::debug!(
            agree = summary.agree,
            disagree = summary.disagree,
            incomplete = summary.incomplete,
            "chart compared"
        );
        report
    }
}

/// Agreement for one pair of readings
#[must_use]
pub fn classify(manual: Option<&ToothReading>, ai: Option<&ToothReading>) -> Agreement {
    let (Some(manual), Some(ai)) = (manual, ai) else {
        return Agreement::Incomplete;
    };
    if manual.presence != ai.presence {
        return Agreement::Disagree;
    }
    if manual.presence == Presence::Present && manual.conditions != ai.conditions {
        return Agreement::Disagree;
    }
    Agreement::Agree
}

/// Rebuild a chart from exported manual and AI readings
///
/// AI readings are recorded at full confidence against a placeholder
/// image, since the export carries neither.
///
/// # Errors
/// - `ChartError::InvalidToothCode` for a code outside `dentition`
/// - `ChartError::InvalidFindingState` for a reading that contradicts its
///   own presence
pub fn chart_from_readings(
    dentition: Dentition,
    manual: &BTreeMap<ToothCode, ToothReading>,
    ai: &BTreeMap<ToothCode, ToothReading>,
) -> Result<ToothChart, ChartError> {
    let mut chart = ToothChart::new(dentition);
    for (&code, reading) in manual {
        chart.set_presence(code, reading.presence)?;
        let finding = Finding {
            conditions: reading.conditions.clone(),
            diagnosis: reading.diagnosis.clone(),
        };
        if !finding.is_empty() {
            chart.set_manual_finding(code, finding)?;
        }
    }

    let image = ImageContext::with_image(ImageRef::new("imported"));
    for (&code, reading) in ai {
        let finding = AiFinding {
            presence: reading.presence,
            finding: Finding {
                conditions: reading.conditions.clone(),
                diagnosis: reading.diagnosis.clone(),
            },
            confidence: 1.0,
        };
        chart.set_ai_finding(code, finding, &image)?;
    }
    Ok(chart)
}
