//! Tooth identity and per-tooth findings
//!
//! Provides [`ToothCode`] (FDI two-digit notation) and the types a chart
//! stores for each tooth.

use crate::error::ChartError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Tooth identifier in FDI two-digit notation
///
/// The first digit is the quadrant, the second the position from the
/// midline.
///
/// # Examples
/// - `16` → upper right first molar
/// - `21` → upper left central incisor
/// - `47` → lower right second molar
/// - `55` → upper right second primary molar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToothCode(u8);

impl ToothCode {
    /// Create a code from quadrant and position digits
    ///
    /// # Errors
    /// - `ChartError::InvalidToothCode` when the pair is not a valid FDI tooth
    pub fn new(quadrant: u8, position: u8) -> Result<Self, ChartError> {
        let valid = match quadrant {
            1..=4 => (1..=8).contains(&position),
            5..=8 => (1..=5).contains(&position),
            _ => false,
        };
        if valid {
            Ok(Self(quadrant * 10 + position))
        } else {
            Err(ChartError::InvalidToothCode(format!("{quadrant}{position}")))
        }
    }

    /// Quadrant digit (1-4 permanent, 5-8 primary)
    #[inline]
    #[must_use]
    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    /// Position digit counted from the midline
    #[inline]
    #[must_use]
    pub fn position(self) -> u8 {
        self.0 % 10
    }

    /// Numeric value, e.g. `16`
    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Dentition this code belongs to
    #[inline]
    #[must_use]
    pub fn dentition(self) -> Dentition {
        if self.quadrant() <= 4 {
            Dentition::Permanent
        } else {
            Dentition::Primary
        }
    }
}

impl Display for ToothCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ToothCode {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ChartError::InvalidToothCode(s.to_string()));
        }
        Self::new(bytes[0] - b'0', bytes[1] - b'0')
            .map_err(|_| ChartError::InvalidToothCode(s.to_string()))
    }
}

impl TryFrom<String> for ToothCode {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToothCode> for String {
    fn from(code: ToothCode) -> Self {
        code.to_string()
    }
}

/// Set of teeth a chart covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dentition {
    /// Adult teeth, quadrants 1-4 (32 codes)
    #[default]
    Permanent,
    /// Child teeth, quadrants 5-8 (20 codes)
    Primary,
}

impl Dentition {
    /// All codes of this dentition in ascending numeric order
    #[must_use]
    pub fn codes(self) -> Vec<ToothCode> {
        let (quadrants, positions) = match self {
            Dentition::Permanent => (1..=4u8, 8u8),
            Dentition::Primary => (5..=8u8, 5u8),
        };
        quadrants
            .flat_map(|q| (1..=positions).map(move |p| ToothCode(q * 10 + p)))
            .collect()
    }

    /// Number of teeth in this dentition
    #[inline]
    #[must_use]
    pub fn tooth_count(self) -> usize {
        match self {
            Dentition::Permanent => 32,
            Dentition::Primary => 20,
        }
    }
}

/// Whether a tooth is in the mouth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Not yet assessed
    #[default]
    Unset,
    /// Tooth is present
    Present,
    /// Tooth is missing
    Missing,
}

/// Condition of a present tooth
///
/// Declaration order is the order conditions are listed in a
/// [`ConditionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Healthy, no treatment
    Sound,
    /// Decay
    Caries,
    /// Dental filling
    DentalFilling,
    /// Impacted tooth
    Impacted,
    /// Crown
    Crown,
    /// Bridge abutment
    Bridge,
    /// Root canal filling
    RootCanalFilling,
}

impl Condition {
    /// Every condition, in display order
    pub const ALL: [Condition; 7] = [
        Condition::Sound,
        Condition::Caries,
        Condition::DentalFilling,
        Condition::Impacted,
        Condition::Crown,
        Condition::Bridge,
        Condition::RootCanalFilling,
    ];

    /// True for the restorations a root canal filling can sit under
    #[inline]
    #[must_use]
    pub fn supports_root_canal(self) -> bool {
        matches!(
            self,
            Condition::DentalFilling | Condition::Crown | Condition::Bridge
        )
    }

    /// Label as shown to clinicians
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Condition::Sound => "Sound",
            Condition::Caries => "Caries",
            Condition::DentalFilling => "Dental filling",
            Condition::Impacted => "Impacted",
            Condition::Crown => "Crown",
            Condition::Bridge => "Bridge",
            Condition::RootCanalFilling => "Root canal filling",
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Conditions recorded together on one present tooth
///
/// Holds at most one base condition. A root canal filling is the only
/// addition, and only on top of a dental filling, crown or bridge; while
/// it is recorded that restoration cannot be taken off.
///
/// Sets built with [`ConditionSet::insert`] always satisfy these rules.
/// Sets built with [`ConditionSet::single`] or deserialized are checked
/// when a chart records them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(BTreeSet<Condition>);

impl ConditionSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding one condition
    #[must_use]
    pub fn single(condition: Condition) -> Self {
        Self(BTreeSet::from([condition]))
    }

    /// Build a set from any order of conditions
    ///
    /// # Errors
    /// - `ChartError::IncompatibleConditions` for two base conditions
    /// - `ChartError::RootCanalWithoutRestoration` for a root canal filling
    ///   with nothing it can sit under
    pub fn from_conditions(conditions: impl IntoIterator<Item = Condition>) -> Result<Self, ChartError> {
        let requested: BTreeSet<Condition> = conditions.into_iter().collect();
        let mut set = Self::new();
        // bases first so a root canal filling finds its restoration
        for condition in requested.iter().filter(|c| **c != Condition::RootCanalFilling) {
            set.insert(*condition)?;
        }
        if requested.contains(&Condition::RootCanalFilling) {
            set.insert(Condition::RootCanalFilling)?;
        }
        Ok(set)
    }

    /// Add a condition, returning false when it was already recorded
    ///
    /// # Errors
    /// - `ChartError::IncompatibleConditions` when another base condition
    ///   is recorded
    /// - `ChartError::RootCanalWithoutRestoration` when adding a root canal
    ///   filling without a dental filling, crown or bridge
    pub fn insert(&mut self, condition: Condition) -> Result<bool, ChartError> {
        if self.0.contains(&condition) {
            return Ok(false);
        }
        if condition == Condition::RootCanalFilling {
            if !self.base().is_some_and(Condition::supports_root_canal) {
                return Err(ChartError::RootCanalWithoutRestoration);
            }
        } else if let Some(existing) = self.base() {
            return Err(ChartError::IncompatibleConditions {
                existing,
                requested: condition,
            });
        }
        self.0.insert(condition);
        Ok(true)
    }

    /// Take a condition off, returning false when it was not recorded
    ///
    /// # Errors
    /// - `ChartError::RootCanalWithoutRestoration` when removing the
    ///   restoration under a recorded root canal filling
    pub fn remove(&mut self, condition: Condition) -> Result<bool, ChartError> {
        if condition != Condition::RootCanalFilling
            && self.0.contains(&Condition::RootCanalFilling)
            && self.base() == Some(condition)
        {
            return Err(ChartError::RootCanalWithoutRestoration);
        }
        Ok(self.0.remove(&condition))
    }

    /// Verify the combination rules
    ///
    /// # Errors
    /// Same as [`ConditionSet::from_conditions`]
    pub fn check(&self) -> Result<(), ChartError> {
        Self::from_conditions(self.iter()).map(|_| ())
    }

    /// The condition other than a root canal filling, if any
    #[must_use]
    pub fn base(&self) -> Option<Condition> {
        self.0
            .iter()
            .copied()
            .find(|c| *c != Condition::RootCanalFilling)
    }

    /// True when `condition` is recorded
    #[inline]
    #[must_use]
    pub fn contains(&self, condition: Condition) -> bool {
        self.0.contains(&condition)
    }

    /// Number of conditions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing is recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Conditions in display order
    pub fn iter(&self) -> impl Iterator<Item = Condition> + '_ {
        self.0.iter().copied()
    }
}

impl Display for ConditionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, condition) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(" + ")?;
            }
            f.write_str(condition.label())?;
        }
        Ok(())
    }
}

/// Treatment suggestions offered for a missing tooth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTreatment {
    /// Single implant
    Implant,
    /// Implant-supported bridge
    ImplantBridge,
    /// Implant with crown
    ImplantCrown,
    /// Bridge pontic
    Bridge,
}

impl MissingTreatment {
    /// Every suggestion, in display order
    pub const ALL: [MissingTreatment; 4] = [
        MissingTreatment::Implant,
        MissingTreatment::ImplantBridge,
        MissingTreatment::ImplantCrown,
        MissingTreatment::Bridge,
    ];

    /// Diagnosis text recorded for this suggestion
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MissingTreatment::Implant => "Implant",
            MissingTreatment::ImplantBridge => "Implant bridge",
            MissingTreatment::ImplantCrown => "Implant crown",
            MissingTreatment::Bridge => "Bridge",
        }
    }
}

/// Structured finding for one tooth
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Finding {
    /// Conditions, meaningful only for present teeth
    #[serde(default, skip_serializing_if = "ConditionSet::is_empty")]
    pub conditions: ConditionSet,
    /// Free-text diagnosis, allowed only for missing teeth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
}

impl Finding {
    /// Finding carrying only a condition
    #[inline]
    #[must_use]
    pub fn with_condition(condition: Condition) -> Self {
        Self::with_conditions(ConditionSet::single(condition))
    }

    /// Finding carrying a set of conditions
    #[inline]
    #[must_use]
    pub fn with_conditions(conditions: ConditionSet) -> Self {
        Self {
            conditions,
            diagnosis: None,
        }
    }

    /// Finding carrying only a diagnosis
    #[inline]
    #[must_use]
    pub fn with_diagnosis(diagnosis: impl Into<String>) -> Self {
        Self {
            conditions: ConditionSet::new(),
            diagnosis: Some(diagnosis.into()),
        }
    }

    /// Finding for a missing tooth with a named treatment
    #[inline]
    #[must_use]
    pub fn treatment(treatment: MissingTreatment) -> Self {
        Self::with_diagnosis(treatment.label())
    }

    /// True when the diagnosis holds non-whitespace text
    #[inline]
    #[must_use]
    pub fn has_diagnosis(&self) -> bool {
        self.diagnosis.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// True when neither a condition nor a diagnosis is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && !self.has_diagnosis()
    }
}

/// Finding returned by the diagnosis oracle
///
/// Carries its own presence since the oracle judges presence independently
/// of the clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiFinding {
    /// Presence the oracle observed
    pub presence: Presence,
    /// Condition / diagnosis
    pub finding: Finding,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl AiFinding {
    /// Present tooth with the given condition
    #[inline]
    #[must_use]
    pub fn present(condition: Condition) -> Self {
        Self::present_with(ConditionSet::single(condition))
    }

    /// Present tooth with several conditions
    #[inline]
    #[must_use]
    pub fn present_with(conditions: ConditionSet) -> Self {
        Self {
            presence: Presence::Present,
            finding: Finding::with_conditions(conditions),
            confidence: 1.0,
        }
    }

    /// Missing tooth with no diagnosis
    #[inline]
    #[must_use]
    pub fn missing() -> Self {
        Self {
            presence: Presence::Missing,
            finding: Finding::default(),
            confidence: 1.0,
        }
    }

    /// Attach a diagnosis
    #[inline]
    #[must_use]
    pub fn with_diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.finding.diagnosis = Some(diagnosis.into());
        self
    }

    /// Set confidence, clamped to `[0, 1]`
    #[inline]
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Everything recorded for one tooth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooth {
    /// FDI code
    pub code: ToothCode,
    /// Clinician-recorded presence
    pub presence: Presence,
    /// Clinician-recorded finding
    pub manual_finding: Option<Finding>,
    /// Oracle finding
    pub ai_finding: Option<AiFinding>,
    /// Clinician confirmed the manual entry
    pub submitted: bool,
}

impl Tooth {
    /// Fresh, unassessed tooth
    #[inline]
    #[must_use]
    pub fn new(code: ToothCode) -> Self {
        Self {
            code,
            presence: Presence::Unset,
            manual_finding: None,
            ai_finding: None,
            submitted: false,
        }
    }

    /// Conditions of the manual finding, empty when none were recorded
    #[must_use]
    pub fn manual_conditions(&self) -> ConditionSet {
        self.manual_finding
            .as_ref()
            .map(|f| f.conditions.clone())
            .unwrap_or_default()
    }

    /// True when the clinician has recorded anything for this tooth
    #[inline]
    #[must_use]
    pub fn has_manual_entry(&self) -> bool {
        self.presence != Presence::Unset
    }

    /// True when nothing has been recorded on either side
    #[inline]
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        !self.has_manual_entry() && self.manual_finding.is_none() && self.ai_finding.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        let code: ToothCode = "16".parse().unwrap();
        assert_eq!(code.quadrant(), 1);
        assert_eq!(code.position(), 6);
        assert_eq!(code.to_string(), "16");
        assert_eq!(code.dentition(), Dentition::Permanent);

        let primary: ToothCode = "55".parse().unwrap();
        assert_eq!(primary.dentition(), Dentition::Primary);
    }

    #[test]
    fn parse_invalid_codes() {
        for raw in ["", "1", "10", "19", "49", "56", "90", "123", "a1", "-1", " 16"] {
            assert!(
                matches!(raw.parse::<ToothCode>(), Err(ChartError::InvalidToothCode(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn dentition_codes() {
        let permanent = Dentition::Permanent.codes();
        assert_eq!(permanent.len(), 32);
        assert_eq!(permanent.first().unwrap().value(), 11);
        assert_eq!(permanent.last().unwrap().value(), 48);
        assert!(permanent.windows(2).all(|w| w[0] < w[1]));

        let primary = Dentition::Primary.codes();
        assert_eq!(primary.len(), Dentition::Primary.tooth_count());
        assert_eq!(primary.first().unwrap().value(), 51);
        assert_eq!(primary.last().unwrap().value(), 85);
    }

    #[test]
    fn code_serializes_as_string() {
        let code: ToothCode = "47".parse().unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"47\"");
        let back: ToothCode = serde_json::from_str("\"47\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<ToothCode>("\"99\"").is_err());
    }

    #[test]
    fn finding_diagnosis_ignores_whitespace() {
        assert!(!Finding::with_diagnosis("   ").has_diagnosis());
        assert!(Finding::treatment(MissingTreatment::Implant).has_diagnosis());
        assert!(Finding::with_diagnosis(" ").is_empty());
    }

    #[test]
    fn restorations_exclude_each_other() {
        let mut set = ConditionSet::single(Condition::Crown);
        for other in [
            Condition::DentalFilling,
            Condition::Bridge,
            Condition::Impacted,
            Condition::Sound,
        ] {
            assert_eq!(
                set.insert(other),
                Err(ChartError::IncompatibleConditions {
                    existing: Condition::Crown,
                    requested: other,
                })
            );
        }
        assert_eq!(set.insert(Condition::Crown), Ok(false));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn root_canal_needs_restoration() {
        let mut set = ConditionSet::new();
        assert_eq!(
            set.insert(Condition::RootCanalFilling),
            Err(ChartError::RootCanalWithoutRestoration)
        );

        let mut impacted = ConditionSet::single(Condition::Impacted);
        assert_eq!(
            impacted.insert(Condition::RootCanalFilling),
            Err(ChartError::RootCanalWithoutRestoration)
        );

        for base in [Condition::DentalFilling, Condition::Crown, Condition::Bridge] {
            let mut set = ConditionSet::single(base);
            assert_eq!(set.insert(Condition::RootCanalFilling), Ok(true));
            assert_eq!(set.remove(base), Err(ChartError::RootCanalWithoutRestoration));
            assert_eq!(set.remove(Condition::RootCanalFilling), Ok(true));
            assert_eq!(set.remove(base), Ok(true));
            assert!(set.is_empty());
        }
    }

    #[test]
    fn condition_set_from_any_order() {
        let set =
            ConditionSet::from_conditions([Condition::RootCanalFilling, Condition::DentalFilling])
                .unwrap();
        assert_eq!(set.base(), Some(Condition::DentalFilling));
        assert_eq!(set.to_string(), "Dental filling + Root canal filling");
        assert!(set.check().is_ok());

        assert!(ConditionSet::from_conditions([Condition::Crown, Condition::Bridge]).is_err());
        assert!(ConditionSet::from_conditions([Condition::RootCanalFilling]).is_err());
    }

    #[test]
    fn condition_set_serializes_as_list() {
        let set = ConditionSet::from_conditions([Condition::Crown, Condition::RootCanalFilling])
            .unwrap();
        let json = serde_json::to_string(&Finding::with_conditions(set.clone())).unwrap();
        assert_eq!(json, r#"{"conditions":["crown","root_canal_filling"]}"#);
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back.conditions, set);
    }

    #[test]
    fn ai_finding_confidence_clamped() {
        assert_eq!(AiFinding::missing().with_confidence(1.7).confidence, 1.0);
        assert_eq!(AiFinding::present(Condition::Crown).with_confidence(-0.2).confidence, 0.0);
    }
}
