//! Testing utilities for DCR workspace
//!
//! Scripted oracles, slow and failing collaborators, upload fixtures and
//! pre-wired controllers.

#![allow(missing_docs)]

use async_trait::async_trait;
use dcr_annotation::{DiagnosisOracle, OracleError};
use dcr_chart::{AiFinding, Condition, ImageRef, ToothCode};
use dcr_wizard::{
    Action, Collaborators, ImageStore, InMemoryImageStore, MemoryReportSink, ReportSink, SaveError,
    SavedReport, StaticCredentials, UploadError, UploadFile, WizardConfig, WizardController,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

pub fn tooth(raw: &str) -> ToothCode {
    raw.parse().unwrap()
}

/// Oracle answering from a script and recording every call
#[derive(Debug)]
pub struct StubOracle {
    answers: BTreeMap<ToothCode, Result<AiFinding, OracleError>>,
    default: AiFinding,
    fail_first: usize,
    calls: Mutex<Vec<ToothCode>>,
}

impl StubOracle {
    pub fn new() -> Self {
        Self {
            answers: BTreeMap::new(),
            default: AiFinding::present(Condition::Sound),
            fail_first: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_finding(mut self, code: ToothCode, finding: AiFinding) -> Self {
        self.answers.insert(code, Ok(finding));
        self
    }

    pub fn with_error(mut self, code: ToothCode, error: OracleError) -> Self {
        self.answers.insert(code, Err(error));
        self
    }

    pub fn with_default(mut self, finding: AiFinding) -> Self {
        self.default = finding;
        self
    }

    /// First `n` calls fail with `OracleError::Unavailable`
    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<ToothCode> {
        self.calls.lock().clone()
    }
}

impl Default for StubOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiagnosisOracle for StubOracle {
    async fn diagnose(&self, _image: &ImageRef, code: ToothCode) -> Result<AiFinding, OracleError> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push(code);
            calls.len()
        };
        if call <= self.fail_first {
            return Err(OracleError::Unavailable(format!("scripted failure {call}")));
        }
        self.answers
            .get(&code)
            .cloned()
            .unwrap_or_else(|| Ok(self.default.clone()))
    }
}

/// Oracle that answers present and sound after a delay
#[derive(Debug, Clone)]
pub struct SlowOracle {
    delay: Duration,
}

impl SlowOracle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl DiagnosisOracle for SlowOracle {
    async fn diagnose(&self, _image: &ImageRef, _code: ToothCode) -> Result<AiFinding, OracleError> {
        tokio::time::sleep(self.delay).await;
        Ok(AiFinding::present(Condition::Sound))
    }
}

/// Image store that stalls before storing
#[derive(Debug)]
pub struct SlowImageStore {
    delay: Duration,
    inner: InMemoryImageStore,
}

impl SlowImageStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryImageStore::new(),
        }
    }
}

#[async_trait]
impl ImageStore for SlowImageStore {
    async fn upload(&self, file: UploadFile) -> Result<ImageRef, UploadError> {
        tokio::time::sleep(self.delay).await;
        self.inner.upload(file).await
    }
}

/// Sink that refuses every report
#[derive(Debug, Default)]
pub struct FailingSink;

#[async_trait]
impl ReportSink for FailingSink {
    async fn save(&self, _report: SavedReport) -> Result<(), SaveError> {
        Err(SaveError::Rejected("disk full".to_string()))
    }
}

pub fn case_1_upload() -> Action {
    Action::upload("case_1.jpeg", JPEG_MAGIC.to_vec())
}

pub fn png_upload() -> Action {
    Action::upload("case_1.png", vec![0x89, 0x50, 0x4E, 0x47])
}

pub fn sarah_login() -> Action {
    Action::LoginAsProfessional {
        username: "sarah".to_string(),
        password: "password".to_string(),
    }
}

pub fn test_config() -> WizardConfig {
    WizardConfig::default().with_oracle_timeout_ms(500)
}

pub fn credentials() -> StaticCredentials {
    StaticCredentials::new().with_user("sarah", "password").unwrap()
}

/// Controller plus handles to its in-memory collaborators
pub struct TestRig {
    pub wizard: WizardController,
    pub oracle: Arc<StubOracle>,
    pub images: Arc<InMemoryImageStore>,
    pub sink: Arc<MemoryReportSink>,
}

impl TestRig {
    pub fn new(config: WizardConfig, oracle: StubOracle) -> Self {
        let oracle = Arc::new(oracle);
        let images = Arc::new(InMemoryImageStore::new());
        let sink = Arc::new(MemoryReportSink::new());
        let collaborators = Collaborators {
            images: images.clone(),
            auth: Arc::new(credentials()),
            oracle: oracle.clone(),
            sink: sink.clone(),
        };
        Self {
            wizard: WizardController::new(config, collaborators),
            oracle,
            images,
            sink,
        }
    }
}

impl Default for TestRig {
    fn default() -> Self {
        Self::new(test_config(), StubOracle::new())
    }
}

/// Controller with custom collaborators around the default credentials
pub fn controller_with(
    config: WizardConfig,
    images: Arc<dyn ImageStore>,
    oracle: Arc<dyn DiagnosisOracle>,
    sink: Arc<dyn ReportSink>,
) -> WizardController {
    WizardController::new(
        config,
        Collaborators {
            images,
            auth: Arc::new(credentials()),
            oracle,
            sink,
        },
    )
}

/// Rig already logged in as a student, on the upload page
pub async fn student_rig() -> TestRig {
    let mut rig = TestRig::default();
    rig.wizard.dispatch(Action::LoginAsStudent).await.into_result().unwrap();
    rig
}

/// Rig logged in as sarah, on the upload page
pub async fn professional_rig() -> TestRig {
    let mut rig = TestRig::default();
    rig.wizard.dispatch(sarah_login()).await.into_result().unwrap();
    rig
}
