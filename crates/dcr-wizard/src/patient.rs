//! Patient profile and student identity
//!
//! Both are optional metadata attached to a session and carried into
//! saved reports. Validation runs when they are set.

use crate::error::WizardError;
use chrono::{NaiveDate, Utc};
use dcr_chart::Dentition;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}' -]*$").expect("valid regex"));

static R_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]\d{7}$").expect("valid regex"));

/// Age up to which the primary dentition is suggested
pub const PRIMARY_DENTITION_MAX_AGE: u32 = 6;

/// Patient gender as recorded on the profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other
    Other,
    /// Not recorded
    #[default]
    Unspecified,
}

/// Patient the case image belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Practice profile number, digits only
    pub profile_number: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Gender
    pub gender: Gender,
    /// Date of birth
    pub birthdate: Option<NaiveDate>,
    /// Date the image was taken
    pub consultation_date: Option<NaiveDate>,
}

impl PatientProfile {
    /// Validate against today's date
    ///
    /// # Errors
    /// See [`PatientProfile::validate_on`].
    pub fn validate(&self) -> Result<(), WizardError> {
        self.validate_on(Utc::now().date_naive())
    }

    /// Validate as of `today`
    ///
    /// # Errors
    /// - `WizardError::InvalidPatientField` naming the first bad field
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), WizardError> {
        if !self.profile_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("profile_number", "only digits are allowed"));
        }
        if !NAME.is_match(&self.first_name) {
            return Err(invalid("first_name", "only letters, spaces, hyphens and apostrophes are allowed"));
        }
        if !NAME.is_match(&self.last_name) {
            return Err(invalid("last_name", "only letters, spaces, hyphens and apostrophes are allowed"));
        }
        if self.birthdate.is_some_and(|d| d > today) {
            return Err(invalid("birthdate", "date lies in the future"));
        }
        if self.consultation_date.is_some_and(|d| d > today) {
            return Err(invalid("consultation_date", "date lies in the future"));
        }
        if let (Some(birth), Some(consultation)) = (self.birthdate, self.consultation_date) {
            if birth > consultation {
                return Err(invalid("birthdate", "birthdate is after the consultation date"));
            }
        }
        Ok(())
    }

    /// Completed years between birth and consultation
    #[must_use]
    pub fn age_at_consultation(&self) -> Option<u32> {
        let birth = self.birthdate?;
        self.consultation_date?.years_since(birth)
    }

    /// Dentition that fits the patient's age, permanent when unknown
    #[must_use]
    pub fn suggested_dentition(&self) -> Dentition {
        match self.age_at_consultation() {
            Some(age) if age <= PRIMARY_DENTITION_MAX_AGE => Dentition::Primary,
            _ => Dentition::Permanent,
        }
    }
}

/// Student filling in the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIdentity {
    /// Full name
    pub name: String,
    /// University number, one lowercase letter and seven digits
    pub r_number: String,
}

impl StudentIdentity {
    /// Create identity
    #[must_use]
    pub fn new(name: impl Into<String>, r_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            r_number: r_number.into(),
        }
    }

    /// Check both fields
    ///
    /// # Errors
    /// - `WizardError::InvalidPatientField` naming the bad field
    pub fn validate(&self) -> Result<(), WizardError> {
        if self.name.trim().is_empty() || !NAME.is_match(&self.name) {
            return Err(invalid("name", "enter a name using letters only"));
        }
        if !R_NUMBER.is_match(&self.r_number) {
            return Err(invalid("r_number", "expected a letter followed by seven digits"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> WizardError {
    WizardError::InvalidPatientField {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 1)
    }

    fn profile() -> PatientProfile {
        PatientProfile {
            profile_number: "004217".to_string(),
            first_name: "Anaïs".to_string(),
            last_name: "O'Neill-Dupont".to_string(),
            gender: Gender::Female,
            birthdate: Some(date(2019, 3, 14)),
            consultation_date: Some(date(2024, 5, 20)),
        }
    }

    fn field_of(err: WizardError) -> &'static str {
        match err {
            WizardError::InvalidPatientField { field, .. } => field,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert!(profile().validate_on(today()).is_ok());
        assert!(PatientProfile::default().validate_on(today()).is_ok());
    }

    #[test]
    fn profile_number_digits_only() {
        let p = PatientProfile {
            profile_number: "12a".to_string(),
            ..profile()
        };
        assert_eq!(field_of(p.validate_on(today()).unwrap_err()), "profile_number");
    }

    #[test]
    fn names_reject_digits() {
        let p = PatientProfile {
            last_name: "Smith2".to_string(),
            ..profile()
        };
        assert_eq!(field_of(p.validate_on(today()).unwrap_err()), "last_name");
    }

    #[test]
    fn future_and_inverted_dates_rejected() {
        let future = PatientProfile {
            consultation_date: Some(date(2025, 1, 1)),
            ..profile()
        };
        assert_eq!(field_of(future.validate_on(today()).unwrap_err()), "consultation_date");

        let inverted = PatientProfile {
            birthdate: Some(date(2024, 5, 21)),
            ..profile()
        };
        assert_eq!(field_of(inverted.validate_on(today()).unwrap_err()), "birthdate");
    }

    #[test]
    fn young_patients_get_primary_dentition() {
        let p = profile();
        assert_eq!(p.age_at_consultation(), Some(5));
        assert_eq!(p.suggested_dentition(), Dentition::Primary);

        let adult = PatientProfile {
            birthdate: Some(date(1990, 1, 1)),
            ..profile()
        };
        assert_eq!(adult.suggested_dentition(), Dentition::Permanent);
        assert_eq!(PatientProfile::default().suggested_dentition(), Dentition::Permanent);
    }

    #[test]
    fn student_r_number_format() {
        assert!(StudentIdentity::new("Jan Peeters", "r0123456").validate().is_ok());
        assert_eq!(
            field_of(StudentIdentity::new("Jan Peeters", "R0123456").validate().unwrap_err()),
            "r_number"
        );
        assert_eq!(
            field_of(StudentIdentity::new("Jan Peeters", "r012345").validate().unwrap_err()),
            "r_number"
        );
        assert_eq!(
            field_of(StudentIdentity::new("  ", "r0123456").validate().unwrap_err()),
            "name"
        );
    }
}
