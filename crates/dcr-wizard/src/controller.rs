//! Wizard controller
//!
//! Single entry point for hosts: [`WizardController::dispatch`] takes one
//! [`Action`] and returns an [`Outcome`]. The controller owns the session
//! and routes actions to the annotation engines:
//! - manual edits go through [`ManualAnnotationEngine`] on the case chart
//! - selecting a tooth on the AI page asks [`AiAnnotationAdapter`] once per
//!   tooth, an explicit AI request asks again; the controller writes the
//!   answer with `record_ai_finding`
//! - entering the comparison page runs [`ComparisonEngine`]
//!
//! Failed actions never move the session; the outcome carries the error
//! and the page it stayed on. Missing uploads only raise warnings, except
//! for AI lookups, which need an image.

use crate::action::Action;
use crate::audit::AuditLog;
use crate::auth::AuthProvider;
use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::outcome::{Notice, Outcome, Payload, NO_IMAGE_WARNING};
use crate::page::{validate_transition, Page};
use crate::session::{Role, Session};
use crate::sink::{ReportSink, SavedReport};
use crate::store::{ImageStore, UploadError, UploadFile};
use chrono::Utc;
use dcr_annotation::{AiAnnotationAdapter, DiagnosisOracle, ManualAnnotationEngine};
use dcr_chart::{Case, ChartError, Dentition, ToothCode};
use dcr_compare::ComparisonEngine;
use std::sync::Arc;

/// External services the controller talks to
#[derive(Clone)]
pub struct Collaborators {
    /// Image storage
    pub images: Arc<dyn ImageStore>,
    /// Professional credential check
    pub auth: Arc<dyn AuthProvider>,
    /// Diagnosis oracle
    pub oracle: Arc<dyn DiagnosisOracle>,
    /// Saved report destination
    pub sink: Arc<dyn ReportSink>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Drives one review session page by page
pub struct WizardController {
    services: Services,
    session: Option<Session>,
    audit: AuditLog,
}

/// Configuration, collaborators and engines shared by every action
///
/// Borrowed next to the session: the session stays in the controller
/// while an action awaits, so a dropped dispatch leaves it intact.
struct Services {
    config: WizardConfig,
    images: Arc<dyn ImageStore>,
    auth: Arc<dyn AuthProvider>,
    sink: Arc<dyn ReportSink>,
    adapter: AiAnnotationAdapter,
    comparison: ComparisonEngine,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("config", &self.services.config)
            .field("session", &self.session)
            .field("audit_entries", &self.audit.len())
            .finish_non_exhaustive()
    }
}

impl WizardController {
    /// Create controller with no session
    #[must_use]
    pub fn new(config: WizardConfig, collaborators: Collaborators) -> Self {
        let adapter = AiAnnotationAdapter::new(collaborators.oracle, config.adapter_config());
        Self {
            services: Services {
                config,
                images: collaborators.images,
                auth: collaborators.auth,
                sink: collaborators.sink,
                adapter,
                comparison: ComparisonEngine::new(),
            },
            session: None,
            audit: AuditLog::new(),
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WizardConfig {
        &self.services.config
    }

    /// Active session, if logged in
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current page, `Login` without a session
    #[must_use]
    pub fn page(&self) -> Page {
        self.session.as_ref().map_or(Page::Login, Session::page)
    }

    /// Active case, if one was created
    #[must_use]
    pub fn case(&self) -> Option<&Case> {
        self.session.as_ref().and_then(Session::case)
    }

    /// Audit trail of every action dispatched since the last [`take_audit`](Self::take_audit)
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Hand the audit trail to the host and start a new chain
    ///
    /// The returned log verifies on its own; later entries chain from a
    /// zero hash again.
    pub fn take_audit(&mut self) -> AuditLog {
        std::mem::take(&mut self.audit)
    }

    /// Apply one action
    ///
    /// Dropping the returned future before it completes leaves the session
    /// as it was before the action.
    pub async fn dispatch(&mut self, action: Action) -> Outcome {
        let name = action.name();
        let session_id = self.session.as_ref().map(Session::id);

        let outcome = match self.expire_idle_session() {
            Some(err) => Outcome::failed(Page::Login, err),
            None => match self.apply(action).await {
                Ok(outcome) => outcome,
                Err(err) => Outcome::failed(self.page(), err),
            },
        };

        if let Some(session) = self.session.as_mut() {
            session.touch();
        }

        let result = match outcome.error() {
            Some(err) => {
                tracing::warn!(action = name, page = %outcome.page, error = %err, "action failed");
                format!("error {:?}: {err}", err.kind())
            }
            None => format!("ok {}", outcome.page),
        };
        self.audit.append(session_id, name, result);
        outcome
    }

    fn expire_idle_session(&mut self) -> Option<WizardError> {
        let limit = self.services.config.session_idle_timeout();
        let session = self.session.as_ref()?;
        if session.idle_for() <= limit {
            return None;
        }
        tracing::warn!(session = %session.id(), "session expired");
        self.session = None;
        Some(WizardError::SessionExpired {
            idle_secs: self.services.config.session_idle_timeout_secs,
        })
    }

    async fn apply(&mut self, action: Action) -> Result<Outcome, WizardError> {
        match action {
            Action::LoginAsStudent => {
                self.require_no_session(&action)?;
                Ok(self.login(Role::Student, None))
            }
            Action::LoginAsProfessional { ref username, ref password } => {
                self.require_no_session(&action)?;
                let role = self.services.auth.authenticate(username, password).await?;
                Ok(self.login(role, Some(username.clone())))
            }
            Action::Logout => {
                let session = self.session.take().ok_or(WizardError::NotLoggedIn)?;
                tracing::info!(session = %session.id(), "logged out");
                Ok(Outcome::ok(Page::Login).with_notice(Notice::info("You have been logged out.")))
            }
            action => {
                let session = self.session.as_mut().ok_or(WizardError::NotLoggedIn)?;
                self.services.apply_in_session(session, action).await
            }
        }
    }

    fn require_no_session(&self, action: &Action) -> Result<(), WizardError> {
        match &self.session {
            Some(session) => Err(WizardError::ActionNotAllowed {
                action: action.name(),
                page: session.page(),
            }),
            None => Ok(()),
        }
    }

    fn login(&mut self, role: Role, username: Option<String>) -> Outcome {
        let mut session = Session::new(role, username);
        tracing::info!(session = %session.id(), %role, "logged in");
        let outcome = self.services.enter(&mut session, Page::Upload);
        self.session = Some(session);
        outcome
    }
}

impl Services {
    async fn apply_in_session(&self, s: &mut Session, action: Action) -> Result<Outcome, WizardError> {
        let page = s.page();
        if action.edits_manual_findings() && s.findings_locked(self.config.lock_student_findings) {
            return Err(WizardError::FindingsLocked);
        }

        match action {
            Action::Next => {
                let target = s.page().next().ok_or(WizardError::ActionNotAllowed {
                    action: "next",
                    page,
                })?;
                validate_transition(page, target)?;
                Ok(self.enter(s, target))
            }
            Action::RevisitUpload => {
                validate_transition(page, Page::Upload)?;
                Ok(self.enter(s, Page::Upload))
            }
            Action::Navigate { page: target } => {
                if !s.role().can_navigate() || !target.is_navigable() {
                    return Err(WizardError::NavigationForbidden(target));
                }
                Ok(self.enter(s, target))
            }
            Action::UploadImage { file } => {
                require_page(s, "upload_image", &[Page::Upload])?;
                self.upload(s, file).await
            }
            Action::SelectDentition { dentition } => {
                require_page(s, "select_dentition", &[Page::Upload, Page::ManualAnnotation])?;
                select_dentition(s, dentition)
            }
            Action::SelectTooth { code } => {
                require_page(s, "select_tooth", &[Page::ManualAnnotation, Page::AiAnnotation])?;
                let outcome = if page == Page::AiAnnotation {
                    self.visit_ai_tooth(s, code).await?
                } else {
                    let tooth = s.case_mut().chart().get(code)?.clone();
                    Outcome::ok(page).with_payload(Payload::Tooth(Box::new(tooth)))
                };
                s.selected = Some(code);
                Ok(outcome)
            }
            action if action.edits_manual_findings() => {
                require_page(s, action.name(), &[Page::ManualAnnotation])?;
                annotate(s, action)
            }
            Action::RequestAiDiagnosis { code } => {
                require_page(s, "request_ai_diagnosis", &[Page::AiAnnotation])?;
                self.diagnose(s, code).await
            }
            Action::UpdatePatient { profile } => {
                profile.validate()?;
                let suggested = profile.suggested_dentition();
                s.patient = Some(profile);
                let mut outcome = Outcome::ok(page).with_notice(Notice::success("Patient profile saved"));
                let current = s.case().map_or(Dentition::Permanent, |c| c.chart().dentition());
                if suggested != current {
                    outcome = outcome.with_notice(Notice::info(format!(
                        "The patient's age suggests the {} dentition",
                        dentition_label(suggested)
                    )));
                }
                Ok(outcome)
            }
            Action::SetStudentIdentity { identity } => {
                if s.role() != Role::Student {
                    return Err(WizardError::ActionNotAllowed {
                        action: "set_student_identity",
                        page,
                    });
                }
                identity.validate()?;
                s.student = Some(identity);
                Ok(Outcome::ok(page).with_notice(Notice::success("Student identity saved")))
            }
            Action::Save => {
                require_page(s, "save", &[Page::Comparison])?;
                self.save(s).await
            }
            other => Err(WizardError::ActionNotAllowed {
                action: other.name(),
                page,
            }),
        }
    }

    /// Move to `target` and run its entry effects
    fn enter(&self, s: &mut Session, target: Page) -> Outcome {
        let from = s.page;
        s.page = target;
        tracing::info!(session = %s.id(), %from, to = %target, "page changed");

        let mut outcome = Outcome::ok(target);
        match target {
            Page::Login => {}
            Page::Upload => {
                s.case_mut();
            }
            Page::ManualAnnotation | Page::AiAnnotation | Page::Comparison => {
                if target == Page::AiAnnotation {
                    s.ai_visited = true;
                }
                if !s.case_mut().image().is_uploaded() {
                    outcome = outcome.with_notice(Notice::warning(NO_IMAGE_WARNING));
                }
                if target == Page::Comparison {
                    let report = self.comparison.compare(s.case_mut().chart());
                    s.report = Some(report.clone());
                    outcome = outcome.with_payload(Payload::Report(Box::new(report)));
                }
            }
        }
        outcome
    }

    async fn upload(&self, s: &mut Session, file: UploadFile) -> Result<Outcome, WizardError> {
        let extension = file.extension();
        if !self.config.accepts_extension(&extension) {
            return Err(UploadError::UnsupportedImageFormat {
                extension,
                expected: self.config.expected_extensions(),
            }
            .into());
        }

        let image = tokio::time::timeout(self.config.upload_timeout(), self.images.upload(file))
            .await
            .map_err(|_| UploadError::Timeout {
                timeout_ms: self.config.upload_timeout_ms,
            })??;

        let message = format!("File '{}' is uploaded successfully", image.stem());
        tracing::info!(session = %s.id(), file = %image.file_name, "image uploaded");
        s.case_mut().attach_image(image);
        Ok(Outcome::ok(Page::Upload).with_notice(Notice::success(message)))
    }

    /// AI finding of a tooth, asking the oracle on the first visit only
    async fn visit_ai_tooth(&self, s: &mut Session, code: ToothCode) -> Result<Outcome, WizardError> {
        let case = s.case_mut();
        if !case.image().is_uploaded() {
            return Err(ChartError::NoImageUploaded.into());
        }
        if let Some(finding) = case.chart().get(code)?.ai_finding.clone() {
            tracing::debug!(tooth = %code, "ai finding reused");
            return Ok(Outcome::ok(Page::AiAnnotation).with_payload(Payload::AiFinding { code, finding }));
        }
        self.diagnose(s, code).await
    }

    async fn diagnose(&self, s: &mut Session, code: ToothCode) -> Result<Outcome, WizardError> {
        let case = s.case_mut();
        if !case.image().is_uploaded() {
            return Err(ChartError::NoImageUploaded.into());
        }
        case.chart().get(code)?;

        let finding = self.adapter.diagnose(case.image(), code).await?;
        case.record_ai_finding(code, finding.clone())?;
        tracing::info!(tooth = %code, confidence = finding.confidence, "ai finding recorded");
        Ok(Outcome::ok(Page::AiAnnotation).with_payload(Payload::AiFinding { code, finding }))
    }

    async fn save(&self, s: &mut Session) -> Result<Outcome, WizardError> {
        let report = match &s.report {
            Some(report) => report.clone(),
            None => self.comparison.compare(s.case_mut().chart()),
        };
        let case = s.case_mut();
        let saved = SavedReport {
            case_id: case.id(),
            image: case.image().current().cloned(),
            role: s.role(),
            patient: s.patient.clone(),
            student: s.student.clone(),
            saved_at: Utc::now(),
            report,
        };
        let case_id = saved.case_id;
        self.sink.save(saved).await?;
        tracing::info!(session = %s.id(), case = %case_id, "report saved");
        Ok(Outcome::ok(Page::Comparison).with_notice(Notice::success("Report saved")))
    }
}

fn require_page(s: &Session, action: &'static str, pages: &[Page]) -> Result<(), WizardError> {
    if pages.contains(&s.page()) {
        Ok(())
    } else {
        Err(WizardError::ActionNotAllowed {
            action,
            page: s.page(),
        })
    }
}

fn select_dentition(s: &mut Session, dentition: Dentition) -> Result<Outcome, WizardError> {
    let page = s.page();
    if !s.case_mut().reset_dentition(dentition) {
        return Err(WizardError::DentitionLocked);
    }
    tracing::info!(session = %s.id(), ?dentition, "dentition selected");
    Ok(Outcome::ok(page))
}

fn annotate(s: &mut Session, action: Action) -> Result<Outcome, WizardError> {
    let page = s.page();
    let mut engine = ManualAnnotationEngine::new(s.case_mut().chart_mut());
    let mut outcome = Outcome::ok(page);
    match action {
        Action::RecordPresence { code, presence } => engine.record_presence(code, presence)?,
        Action::RecordCondition { code, condition } => engine.record_condition(code, condition)?,
        Action::RemoveCondition { code, condition } => engine.remove_condition(code, condition)?,
        Action::RecordDiagnosis { code, diagnosis } => engine.record_diagnosis(code, diagnosis)?,
        Action::RecordTreatment { code, treatment } => engine.record_treatment(code, treatment)?,
        Action::ClearTooth { code } => engine.clear(code)?,
        Action::Submit { code } => {
            engine.submit(code)?;
            outcome = outcome.with_notice(Notice::success(format!("Tooth {code} submitted")));
        }
        other => {
            return Err(WizardError::ActionNotAllowed {
                action: other.name(),
                page,
            })
        }
    }
    Ok(outcome)
}

fn dentition_label(dentition: Dentition) -> &'static str {
    match dentition {
        Dentition::Permanent => "permanent",
        Dentition::Primary => "primary",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use crate::sink::MemoryReportSink;
    use crate::store::InMemoryImageStore;
    use dcr_annotation::TableOracle;

    fn wizard() -> WizardController {
        WizardController::new(
            WizardConfig::default(),
            Collaborators {
                images: Arc::new(InMemoryImageStore::new()),
                auth: Arc::new(StaticCredentials::new()),
                oracle: Arc::new(TableOracle::new()),
                sink: Arc::new(MemoryReportSink::new()),
            },
        )
    }

    #[tokio::test]
    async fn login_creates_case_on_upload_page() {
        let mut wizard = wizard();
        assert_eq!(wizard.page(), Page::Login);
        assert!(wizard.case().is_none());

        let outcome = wizard.dispatch(Action::LoginAsStudent).await;
        assert_eq!(outcome.page, Page::Upload);
        assert!(wizard.case().unwrap().chart().is_pristine());
    }

    #[tokio::test]
    async fn next_without_upload_only_warns() {
        let mut wizard = wizard();
        wizard.dispatch(Action::LoginAsStudent).await;
        let outcome = wizard.dispatch(Action::Next).await;
        assert!(outcome.is_ok());
        assert!(outcome.has_warning(NO_IMAGE_WARNING));
    }

    #[tokio::test]
    async fn comparison_is_terminal_for_next() {
        let mut wizard = wizard();
        wizard.dispatch(Action::LoginAsStudent).await;
        for _ in 0..3 {
            wizard.dispatch(Action::Next).await;
        }
        assert_eq!(wizard.page(), Page::Comparison);
        assert!(wizard.session().unwrap().report().is_some());

        let outcome = wizard.dispatch(Action::Next).await;
        assert_eq!(
            outcome.error(),
            Some(&WizardError::ActionNotAllowed {
                action: "next",
                page: Page::Comparison
            })
        );
    }

    #[tokio::test]
    async fn patient_profile_suggests_dentition() {
        let mut wizard = wizard();
        wizard.dispatch(Action::LoginAsStudent).await;
        let profile = crate::patient::PatientProfile {
            birthdate: chrono::NaiveDate::from_ymd_opt(2020, 1, 1),
            consultation_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        let outcome = wizard.dispatch(Action::UpdatePatient { profile }).await;
        assert!(outcome.is_ok());
        assert!(outcome
            .notices
            .iter()
            .any(|n| n.message.contains("primary dentition")));
        assert!(wizard.session().unwrap().patient().is_some());
    }

    #[tokio::test]
    async fn student_identity_only_for_students() {
        let mut wizard = wizard();
        wizard.dispatch(Action::LoginAsStudent).await;
        let bad = wizard
            .dispatch(Action::SetStudentIdentity {
                identity: crate::patient::StudentIdentity::new("Jan", "123"),
            })
            .await;
        assert_eq!(bad.error().map(WizardError::kind), Some(crate::error::ErrorKind::InvalidPatientField));

        let good = wizard
            .dispatch(Action::SetStudentIdentity {
                identity: crate::patient::StudentIdentity::new("Jan", "r0123456"),
            })
            .await;
        assert!(good.is_ok());
        assert_eq!(wizard.session().unwrap().student().unwrap().r_number, "r0123456");
    }
}
