//! Per-case tooth chart
//!
//! [`ToothChart`] owns one [`Tooth`] per code of its dentition and is the
//! only place the finding invariants are enforced:
//! - a condition needs a present tooth, and conditions on one tooth must
//!   combine (see [`ConditionSet`](crate::tooth::ConditionSet))
//! - a diagnosis needs a missing tooth
//! - an AI finding needs an uploaded image

use crate::error::ChartError;
use crate::image::ImageContext;
use crate::tooth::{AiFinding, Dentition, Finding, Presence, Tooth, ToothCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical per-tooth state store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToothChart {
    dentition: Dentition,
    teeth: BTreeMap<ToothCode, Tooth>,
}

impl ToothChart {
    /// Chart with every tooth of `dentition` unset
    #[must_use]
    pub fn new(dentition: Dentition) -> Self {
        let teeth = dentition
            .codes()
            .into_iter()
            .map(|code| (code, Tooth::new(code)))
            .collect();
        Self { dentition, teeth }
    }

    /// Dentition this chart covers
    #[inline]
    #[must_use]
    pub fn dentition(&self) -> Dentition {
        self.dentition
    }

    /// Number of teeth
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.teeth.len()
    }

    /// Always false; a chart holds its full dentition
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }

    /// Teeth in ascending code order
    pub fn iter(&self) -> impl Iterator<Item = &Tooth> {
        self.teeth.values()
    }

    /// True when `code` belongs to this chart
    #[inline]
    #[must_use]
    pub fn contains(&self, code: ToothCode) -> bool {
        self.teeth.contains_key(&code)
    }

    /// True when nothing has been recorded on any tooth
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.teeth.values().all(Tooth::is_pristine)
    }

    /// Look up a tooth
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in this chart
    pub fn get(&self, code: ToothCode) -> Result<&Tooth, ChartError> {
        self.teeth
            .get(&code)
            .ok_or_else(|| ChartError::InvalidToothCode(code.to_string()))
    }

    fn get_mut(&mut self, code: ToothCode) -> Result<&mut Tooth, ChartError> {
        self.teeth
            .get_mut(&code)
            .ok_or_else(|| ChartError::InvalidToothCode(code.to_string()))
    }

    /// Record presence
    ///
    /// A change of presence discards the manual finding and the submitted
    /// flag; recording the same presence again leaves the tooth untouched.
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in this chart
    pub fn set_presence(&mut self, code: ToothCode, presence: Presence) -> Result<(), ChartError> {
        let tooth = self.get_mut(code)?;
        if tooth.presence == presence {
            return Ok(());
        }
        tracing::debug!(tooth = %code, from = ?tooth.presence, to = ?presence, "presence changed");
        tooth.presence = presence;
        tooth.manual_finding = None;
        tooth.submitted = false;
        Ok(())
    }

    /// Record the clinician's finding
    ///
    /// Replaces any previous manual finding and clears the submitted flag.
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in this chart
    /// - `ChartError::InvalidFindingState` if a diagnosis is given for a
    ///   tooth that is not missing, or a condition for one that is not present
    pub fn set_manual_finding(&mut self, code: ToothCode, finding: Finding) -> Result<(), ChartError> {
        let tooth = self.get_mut(code)?;
        check_finding(code, tooth.presence, &finding)?;
        tracing::debug!(tooth = %code, ?finding, "manual finding recorded");
        tooth.manual_finding = Some(finding);
        tooth.submitted = false;
        Ok(())
    }

    /// Record the oracle's finding
    ///
    /// Never touches the manual side.
    ///
    /// # Errors
    /// - `ChartError::NoImageUploaded` if `image` holds no image
    /// - `ChartError::InvalidToothCode` if `code` is not in this chart
    /// - `ChartError::InvalidFindingState` if the finding has unset presence
    ///   or contradicts its own presence
    pub fn set_ai_finding(
        &mut self,
        code: ToothCode,
        finding: AiFinding,
        image: &ImageContext,
    ) -> Result<(), ChartError> {
        if !image.is_uploaded() {
            return Err(ChartError::NoImageUploaded);
        }
        let tooth = self.get_mut(code)?;
        if finding.presence == Presence::Unset {
            return Err(ChartError::invalid_finding(code, "oracle returned no presence"));
        }
        check_finding(code, finding.presence, &finding.finding)?;
        tracing::debug!(tooth = %code, presence = ?finding.presence, "ai finding recorded");
        tooth.ai_finding = Some(finding);
        Ok(())
    }

    /// Mark the manual entry as confirmed
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in this chart
    pub fn mark_submitted(&mut self, code: ToothCode) -> Result<(), ChartError> {
        self.get_mut(code)?.submitted = true;
        Ok(())
    }

    /// Reset the manual side of a tooth, keeping its AI finding
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in this chart
    pub fn clear_manual(&mut self, code: ToothCode) -> Result<(), ChartError> {
        let tooth = self.get_mut(code)?;
        tooth.presence = Presence::Unset;
        tooth.manual_finding = None;
        tooth.submitted = false;
        Ok(())
    }

    /// Codes whose manual entry has been submitted
    #[must_use]
    pub fn submitted_codes(&self) -> Vec<ToothCode> {
        self.teeth
            .values()
            .filter(|t| t.submitted)
            .map(|t| t.code)
            .collect()
    }
}

impl Default for ToothChart {
    fn default() -> Self {
        Self::new(Dentition::Permanent)
    }
}

fn check_finding(code: ToothCode, presence: Presence, finding: &Finding) -> Result<(), ChartError> {
    if finding.has_diagnosis() && presence != Presence::Missing {
        return Err(ChartError::invalid_finding(
            code,
            "a diagnosis can only be recorded for a missing tooth",
        ));
    }
    if finding.conditions.is_empty() {
        return Ok(());
    }
    if presence != Presence::Present {
        return Err(ChartError::invalid_finding(
            code,
            "a condition can only be recorded for a present tooth",
        ));
    }
    finding.conditions.check()
}
