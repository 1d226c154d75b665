//! One active clinical case: an image context and its tooth chart

use crate::chart::ToothChart;
use crate::error::ChartError;
use crate::image::{ImageContext, ImageRef};
use crate::tooth::{AiFinding, Dentition, ToothCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique case identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(pub Uuid);

impl CaseId {
    /// Generate new case ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clinical case under review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    id: CaseId,
    created_at: DateTime<Utc>,
    image: ImageContext,
    chart: ToothChart,
}

impl Case {
    /// New case with no image and an unset chart
    #[must_use]
    pub fn new(dentition: Dentition) -> Self {
        Self {
            id: CaseId::new(),
            created_at: Utc::now(),
            image: ImageContext::empty(),
            chart: ToothChart::new(dentition),
        }
    }

    /// Case ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> CaseId {
        self.id
    }

    /// Creation time
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Image context
    #[inline]
    #[must_use]
    pub fn image(&self) -> &ImageContext {
        &self.image
    }

    /// Attach an uploaded image, replacing any earlier one
    pub fn attach_image(&mut self, image: ImageRef) {
        self.image.set(image);
    }

    /// Chart snapshot
    #[inline]
    #[must_use]
    pub fn chart(&self) -> &ToothChart {
        &self.chart
    }

    /// Mutable chart access for the manual annotation engine
    #[inline]
    pub fn chart_mut(&mut self) -> &mut ToothChart {
        &mut self.chart
    }

    /// Write an oracle finding, checked against this case's image
    ///
    /// # Errors
    /// See [`ToothChart::set_ai_finding`].
    pub fn record_ai_finding(&mut self, code: ToothCode, finding: AiFinding) -> Result<(), ChartError> {
        self.chart.set_ai_finding(code, finding, &self.image)
    }

    /// Replace the chart with an empty one of another dentition
    ///
    /// Returns false and leaves the case untouched when the chart already
    /// holds any recorded data.
    pub fn reset_dentition(&mut self, dentition: Dentition) -> bool {
        if !self.chart.is_pristine() {
            return false;
        }
        self.chart = ToothChart::new(dentition);
        true
    }
}

impl Default for Case {
    fn default() -> Self {
        Self::new(Dentition::Permanent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tooth::Presence;

    #[test]
    fn record_ai_finding_uses_case_image() {
        let mut case = Case::default();
        let code: ToothCode = "47".parse().unwrap();
        assert_eq!(
            case.record_ai_finding(code, AiFinding::missing()),
            Err(ChartError::NoImageUploaded)
        );

        case.attach_image(ImageRef::new("case_1.jpeg"));
        case.record_ai_finding(code, AiFinding::missing()).unwrap();
    }

    #[test]
    fn dentition_reset_only_when_pristine() {
        let mut case = Case::default();
        assert!(case.reset_dentition(Dentition::Primary));
        assert_eq!(case.chart().len(), 20);

        let code: ToothCode = "51".parse().unwrap();
        case.chart_mut().set_presence(code, Presence::Present).unwrap();
        assert!(!case.reset_dentition(Dentition::Permanent));
        assert_eq!(case.chart().dentition(), Dentition::Primary);
    }
}
