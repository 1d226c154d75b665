//! User actions the controller accepts

use crate::page::Page;
use crate::patient::{PatientProfile, StudentIdentity};
use crate::store::UploadFile;
use dcr_chart::{Condition, Dentition, MissingTreatment, Presence, ToothCode};
use serde::{Deserialize, Serialize};

/// One user interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Anonymous student login
    LoginAsStudent,
    /// Professional login with credentials
    LoginAsProfessional {
        /// Username
        username: String,
        /// Password
        password: String,
    },
    /// Upload the case image
    UploadImage {
        /// File to upload
        file: UploadFile,
    },
    /// Advance to the next wizard page
    Next,
    /// Go back from the manual page to upload, keeping findings
    RevisitUpload,
    /// Professional menu jump
    Navigate {
        /// Target page
        page: Page,
    },
    /// Switch the case dentition while the chart is still empty
    SelectDentition {
        /// Dentition to use
        dentition: Dentition,
    },
    /// Show a tooth; on the AI page the first visit asks the oracle
    SelectTooth {
        /// Tooth
        code: ToothCode,
    },
    /// Record presence
    RecordPresence {
        /// Tooth
        code: ToothCode,
        /// Presence
        presence: Presence,
    },
    /// Add a condition to a present tooth
    RecordCondition {
        /// Tooth
        code: ToothCode,
        /// Condition
        condition: Condition,
    },
    /// Take a condition off a present tooth
    RemoveCondition {
        /// Tooth
        code: ToothCode,
        /// Condition
        condition: Condition,
    },
    /// Record a free-text diagnosis for a missing tooth
    RecordDiagnosis {
        /// Tooth
        code: ToothCode,
        /// Diagnosis
        diagnosis: String,
    },
    /// Record a named treatment for a missing tooth
    RecordTreatment {
        /// Tooth
        code: ToothCode,
        /// Treatment
        treatment: MissingTreatment,
    },
    /// Reset the manual side of a tooth
    ClearTooth {
        /// Tooth
        code: ToothCode,
    },
    /// Confirm the manual entry of a tooth
    Submit {
        /// Tooth
        code: ToothCode,
    },
    /// Ask the oracle about a tooth again, replacing any stored finding
    RequestAiDiagnosis {
        /// Tooth
        code: ToothCode,
    },
    /// Attach or replace the patient profile
    UpdatePatient {
        /// Profile
        profile: PatientProfile,
    },
    /// Attach the student's name and number
    SetStudentIdentity {
        /// Identity
        identity: StudentIdentity,
    },
    /// Hand the comparison report to the sink
    Save,
    /// End the session
    Logout,
}

impl Action {
    /// Stable name for logs and errors
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::LoginAsStudent => "login_as_student",
            Action::LoginAsProfessional { .. } => "login_as_professional",
            Action::UploadImage { .. } => "upload_image",
            Action::Next => "next",
            Action::RevisitUpload => "revisit_upload",
            Action::Navigate { .. } => "navigate",
            Action::SelectDentition { .. } => "select_dentition",
            Action::SelectTooth { .. } => "select_tooth",
            Action::RecordPresence { .. } => "record_presence",
            Action::RecordCondition { .. } => "record_condition",
            Action::RemoveCondition { .. } => "remove_condition",
            Action::RecordDiagnosis { .. } => "record_diagnosis",
            Action::RecordTreatment { .. } => "record_treatment",
            Action::ClearTooth { .. } => "clear_tooth",
            Action::Submit { .. } => "submit",
            Action::RequestAiDiagnosis { .. } => "request_ai_diagnosis",
            Action::UpdatePatient { .. } => "update_patient",
            Action::SetStudentIdentity { .. } => "set_student_identity",
            Action::Save => "save",
            Action::Logout => "logout",
        }
    }

    /// True for actions that edit the manual side of the chart
    #[must_use]
    pub fn edits_manual_findings(&self) -> bool {
        matches!(
            self,
            Action::RecordPresence { .. }
                | Action::RecordCondition { .. }
                | Action::RemoveCondition { .. }
                | Action::RecordDiagnosis { .. }
                | Action::RecordTreatment { .. }
                | Action::ClearTooth { .. }
                | Action::Submit { .. }
        )
    }

    /// Shorthand for an upload
    #[must_use]
    pub fn upload(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Action::UploadImage {
            file: UploadFile::new(file_name, bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_tagged() {
        let action = Action::RecordPresence {
            code: "21".parse().unwrap(),
            presence: Presence::Missing,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "record_presence");
        assert_eq!(json["code"], "21");
        assert_eq!(json["presence"], "missing");
    }

    #[test]
    fn login_actions_do_not_edit() {
        assert!(!Action::LoginAsStudent.edits_manual_findings());
        assert!(Action::Submit {
            code: "16".parse().unwrap()
        }
        .edits_manual_findings());
    }
}
