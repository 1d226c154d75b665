use dcr_wizard::{ConfigError, WizardConfig};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "oracle_timeout_ms = 750\naccepted_extensions = [\"jpeg\", \"jpg\"]\nlock_student_findings = false"
    )
    .unwrap();

    let config = WizardConfig::load(file.path()).unwrap();
    assert_eq!(config.oracle_timeout_ms, 750);
    assert!(config.accepts_extension("jpg"));
    assert!(!config.lock_student_findings);
    assert_eq!(config.session_idle_timeout_secs, 1_800);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = WizardConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_invalid_value_in_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "upload_timeout_ms = 0").unwrap();
    let err = WizardConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("upload_timeout_ms"));
}
