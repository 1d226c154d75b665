//! DCR Wizard - role-gated review workflow
//!
//! Ties the chart, annotation and comparison crates into one session:
//! - [`WizardController`]: dispatches [`Action`]s page by page
//! - [`Session`] and [`Role`]: who is logged in and where they are
//! - collaborator traits [`ImageStore`], [`AuthProvider`] and
//!   [`ReportSink`] with in-memory implementations
//! - [`WizardConfig`] loaded from TOML, [`AuditLog`] hash-chained trail
//!
//! # Example
//!
//! ```rust,ignore
//! use dcr_wizard::{Action, Collaborators, WizardConfig, WizardController};
//!
//! let mut wizard = WizardController::new(WizardConfig::default(), collaborators);
//! wizard.dispatch(Action::LoginAsStudent).await;
//! wizard.dispatch(Action::upload("case_1.jpeg", bytes)).await;
//! let outcome = wizard.dispatch(Action::Next).await;
//! assert!(outcome.is_ok());
//! ```

pub mod action;
pub mod audit;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod outcome;
pub mod page;
pub mod patient;
pub mod session;
pub mod sink;
pub mod store;

pub use action::Action;
pub use audit::{AuditEntry, AuditError, AuditLog};
pub use auth::{AuthError, AuthProvider, StaticCredentials};
pub use config::{ConfigError, WizardConfig};
pub use controller::{Collaborators, WizardController};
pub use error::{ErrorKind, WizardError};
pub use outcome::{Notice, NoticeLevel, Outcome, Payload, NO_IMAGE_WARNING};
pub use page::Page;
pub use patient::{Gender, PatientProfile, StudentIdentity};
pub use session::{Role, Session, SessionId};
pub use sink::{MemoryReportSink, ReportSink, SaveError, SavedReport};
pub use store::{ImageStore, InMemoryImageStore, UploadError, UploadFile};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
