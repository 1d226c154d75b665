//! Review session
//!
//! Created at login, destroyed at logout or idle timeout. Owns the active
//! case and everything the pages need to remember between actions.

use crate::page::Page;
use crate::patient::{PatientProfile, StudentIdentity};
use chrono::{DateTime, Utc};
use dcr_chart::{Case, Dentition, ToothCode};
use dcr_compare::ComparisonReport;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

/// Who is using the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Anonymous, linear wizard, findings locked after the AI page
    Student,
    /// Authenticated, free menu navigation
    Professional,
}

impl Role {
    /// Check if the role may jump between pages from the menu
    #[inline]
    #[must_use]
    pub fn can_navigate(self) -> bool {
        matches!(self, Role::Professional)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => f.write_str("student"),
            Role::Professional => f.write_str("professional"),
        }
    }
}

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of one logged-in user
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    role: Role,
    username: Option<String>,
    started_at: DateTime<Utc>,
    pub(crate) page: Page,
    pub(crate) case: Option<Case>,
    pub(crate) selected: Option<ToothCode>,
    pub(crate) patient: Option<PatientProfile>,
    pub(crate) student: Option<StudentIdentity>,
    pub(crate) report: Option<ComparisonReport>,
    pub(crate) ai_visited: bool,
    pub(crate) last_activity: Instant,
}

impl Session {
    /// Fresh session on the login page
    #[must_use]
    pub fn new(role: Role, username: Option<String>) -> Self {
        Self {
            id: SessionId::new(),
            role,
            username,
            started_at: Utc::now(),
            page: Page::Login,
            case: None,
            selected: None,
            patient: None,
            student: None,
            report: None,
            ai_visited: false,
            last_activity: Instant::now(),
        }
    }

    /// Session ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Role
    #[inline]
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Authenticated username, none for students
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Login time
    #[inline]
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current page
    #[inline]
    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    /// Active case, created on entering the upload page
    #[must_use]
    pub fn case(&self) -> Option<&Case> {
        self.case.as_ref()
    }

    /// Tooth last selected on the manual page
    #[must_use]
    pub fn selected(&self) -> Option<ToothCode> {
        self.selected
    }

    /// Patient profile, when entered
    #[must_use]
    pub fn patient(&self) -> Option<&PatientProfile> {
        self.patient.as_ref()
    }

    /// Student identity, when entered
    #[must_use]
    pub fn student(&self) -> Option<&StudentIdentity> {
        self.student.as_ref()
    }

    /// Report computed on entering the comparison page
    #[must_use]
    pub fn report(&self) -> Option<&ComparisonReport> {
        self.report.as_ref()
    }

    /// True once the AI page has been entered
    #[inline]
    #[must_use]
    pub fn ai_visited(&self) -> bool {
        self.ai_visited
    }

    /// Check if manual findings are locked for this session
    #[must_use]
    pub fn findings_locked(&self, lock_students: bool) -> bool {
        lock_students && self.role == Role::Student && self.ai_visited
    }

    pub(crate) fn case_mut(&mut self) -> &mut Case {
        self.case.get_or_insert_with(|| Case::new(Dentition::Permanent))
    }

    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub(crate) fn idle_for(&self) -> std::time::Duration {
        self.last_activity.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_students_get_locked() {
        let mut student = Session::new(Role::Student, None);
        assert!(!student.findings_locked(true));
        student.ai_visited = true;
        assert!(student.findings_locked(true));
        assert!(!student.findings_locked(false));

        let mut pro = Session::new(Role::Professional, Some("sarah".to_string()));
        pro.ai_visited = true;
        assert!(!pro.findings_locked(true));
        assert_eq!(pro.username(), Some("sarah"));
    }

    #[test]
    fn case_created_lazily() {
        let mut session = Session::new(Role::Student, None);
        assert!(session.case().is_none());
        let id = session.case_mut().id();
        assert_eq!(session.case().unwrap().id(), id);
        assert_eq!(session.case().unwrap().chart().len(), 32);
    }

    #[test]
    fn role_gating() {
        assert!(Role::Professional.can_navigate());
        assert!(!Role::Student.can_navigate());
        assert_eq!(Role::Student.to_string(), "student");
    }
}
