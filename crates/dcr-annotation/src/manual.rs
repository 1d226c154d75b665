//! Manual annotation engine
//!
//! Records clinician-entered findings into a [`ToothChart`]. The engine
//! only mutates the chart; moving between wizard pages is the
//! controller's job.

use crate::error::AnnotationError;
use dcr_chart::{
    ChartError, Condition, Finding, MissingTreatment, Presence, Tooth, ToothChart, ToothCode,
};

/// Clinician entry on top of a borrowed chart
#[derive(Debug)]
pub struct ManualAnnotationEngine<'a> {
    chart: &'a mut ToothChart,
}

impl<'a> ManualAnnotationEngine<'a> {
    /// Wrap a chart for editing
    #[inline]
    pub fn new(chart: &'a mut ToothChart) -> Self {
        Self { chart }
    }

    /// Snapshot of a tooth for display
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in the chart
    pub fn select_tooth(&self, code: ToothCode) -> Result<Tooth, AnnotationError> {
        Ok(self.chart.get(code)?.clone())
    }

    /// Record presence
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in the chart
    pub fn record_presence(&mut self, code: ToothCode, presence: Presence) -> Result<(), AnnotationError> {
        self.chart.set_presence(code, presence)?;
        Ok(())
    }

    /// Add a condition to a present tooth
    ///
    /// Conditions accumulate; recording one that is already there changes
    /// nothing.
    ///
    /// # Errors
    /// - `ChartError::InvalidFindingState` if the tooth is not present
    /// - `ChartError::IncompatibleConditions` or
    ///   `ChartError::RootCanalWithoutRestoration` if the condition does
    ///   not combine with those already recorded
    pub fn record_condition(&mut self, code: ToothCode, condition: Condition) -> Result<(), AnnotationError> {
        let tooth = self.chart.get(code)?;
        if tooth.presence != Presence::Present {
            return Err(ChartError::invalid_finding(
                code,
                "a condition can only be recorded for a present tooth",
            )
            .into());
        }
        let mut conditions = tooth.manual_conditions();
        if conditions.insert(condition)? {
            self.chart
                .set_manual_finding(code, Finding::with_conditions(conditions))?;
        }
        Ok(())
    }

    /// Take a condition off a present tooth
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in the chart
    /// - `ChartError::RootCanalWithoutRestoration` if the condition carries
    ///   a recorded root canal filling
    pub fn remove_condition(&mut self, code: ToothCode, condition: Condition) -> Result<(), AnnotationError> {
        let mut conditions = self.chart.get(code)?.manual_conditions();
        if conditions.remove(condition)? {
            self.chart
                .set_manual_finding(code, Finding::with_conditions(conditions))?;
        }
        Ok(())
    }

    /// Record a free-text diagnosis for a missing tooth
    ///
    /// # Errors
    /// - `ChartError::InvalidFindingState` if the tooth is not missing
    pub fn record_diagnosis(
        &mut self,
        code: ToothCode,
        diagnosis: impl Into<String>,
    ) -> Result<(), AnnotationError> {
        self.chart
            .set_manual_finding(code, Finding::with_diagnosis(diagnosis))?;
        Ok(())
    }

    /// Record one of the named treatments for a missing tooth
    ///
    /// # Errors
    /// - `ChartError::InvalidFindingState` if the tooth is not missing
    pub fn record_treatment(
        &mut self,
        code: ToothCode,
        treatment: MissingTreatment,
    ) -> Result<(), AnnotationError> {
        self.record_diagnosis(code, treatment.label())
    }

    /// Reset the tooth's manual entry
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` if `code` is not in the chart
    pub fn clear(&mut self, code: ToothCode) -> Result<(), AnnotationError> {
        self.chart.clear_manual(code)?;
        Ok(())
    }

    /// Confirm the tooth's entry
    ///
    /// # Errors
    /// - `AnnotationError::IncompleteAnnotation` if presence is unset, or
    ///   the tooth is present without a condition
    pub fn submit(&mut self, code: ToothCode) -> Result<(), AnnotationError> {
        let tooth = self.chart.get(code)?;
        match tooth.presence {
            Presence::Unset => {
                return Err(AnnotationError::IncompleteAnnotation {
                    code,
                    reason: "presence has not been recorded".to_string(),
                });
            }
            Presence::Present if tooth.manual_conditions().is_empty() => {
                return Err(AnnotationError::IncompleteAnnotation {
                    code,
                    reason: "no condition chosen for a present tooth".to_string(),
                });
            }
            Presence::Present | Presence::Missing => {}
        }
        self.chart.mark_submitted(code)?;
        tracing::info!(tooth = %code, "manual annotation submitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> ToothCode {
        raw.parse().unwrap()
    }

    #[test]
    fn submit_present_with_condition() {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        let c = code("16");

        engine.record_presence(c, Presence::Present).unwrap();
        engine.record_condition(c, Condition::DentalFilling).unwrap();
        engine.submit(c).unwrap();

        let tooth = engine.select_tooth(c).unwrap();
        assert!(tooth.submitted);
        assert!(tooth.manual_conditions().contains(Condition::DentalFilling));
    }

    #[test]
    fn submit_requires_presence() {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        let err = engine.submit(code("11")).unwrap_err();
        assert!(matches!(err, AnnotationError::IncompleteAnnotation { .. }));
    }

    #[test]
    fn submit_present_requires_condition() {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        engine.record_presence(code("11"), Presence::Present).unwrap();
        let err = engine.submit(code("11")).unwrap_err();
        assert!(matches!(err, AnnotationError::IncompleteAnnotation { .. }));
        assert!(!engine.select_tooth(code("11")).unwrap().submitted);
    }

    #[test]
    fn missing_tooth_submits_without_condition() {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        let c = code("21");
        engine.record_presence(c, Presence::Missing).unwrap();
        engine.submit(c).unwrap();

        engine.record_treatment(c, MissingTreatment::Implant).unwrap();
        let tooth = engine.select_tooth(c).unwrap();
        assert_eq!(
            tooth.manual_finding.unwrap().diagnosis.as_deref(),
            Some("Implant")
        );
        // editing after submit needs a fresh confirmation
        assert!(!tooth.submitted);
    }

    #[test]
    fn condition_on_missing_tooth_rejected() {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        engine.record_presence(code("21"), Presence::Missing).unwrap();
        let err = engine.record_condition(code("21"), Condition::Crown).unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::Chart(ChartError::InvalidFindingState { .. })
        ));
    }

    #[test]
    fn conditions_accumulate_within_rules() {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        let c = code("34");
        engine.record_presence(c, Presence::Present).unwrap();
        engine.record_condition(c, Condition::Crown).unwrap();
        engine.record_condition(c, Condition::RootCanalFilling).unwrap();

        let err = engine.record_condition(c, Condition::DentalFilling).unwrap_err();
        assert_eq!(
            err,
            AnnotationError::Chart(ChartError::IncompatibleConditions {
                existing: Condition::Crown,
                requested: Condition::DentalFilling,
            })
        );
        let err = engine.remove_condition(c, Condition::Crown).unwrap_err();
        assert_eq!(err, AnnotationError::Chart(ChartError::RootCanalWithoutRestoration));

        let conditions = engine.select_tooth(c).unwrap().manual_conditions();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions.to_string(), "Crown + Root canal filling");

        engine.remove_condition(c, Condition::RootCanalFilling).unwrap();
        engine.remove_condition(c, Condition::Crown).unwrap();
        assert!(engine.submit(c).is_err());
    }

    #[test]
    fn clear_resets_tooth() {
        let mut chart = ToothChart::default();
        let mut engine = ManualAnnotationEngine::new(&mut chart);
        let c = code("31");
        engine.record_presence(c, Presence::Present).unwrap();
        engine.record_condition(c, Condition::Bridge).unwrap();
        engine.clear(c).unwrap();
        assert!(engine.select_tooth(c).unwrap().is_pristine());
    }
}
