//! AI Adapter Tests
//!
//! Timeout, retry and gating behavior of the oracle adapter.

use dcr_annotation::{AdapterConfig, AiAnnotationAdapter, AnnotationError, OracleError};
use dcr_chart::{AiFinding, ChartError, Condition, ConditionSet, ImageContext, ImageRef};
use dcr_test_utils::{tooth, SlowOracle, StubOracle};
use std::sync::Arc;
use std::time::Duration;

fn uploaded() -> ImageContext {
    ImageContext::with_image(ImageRef::new("case_1.jpeg"))
}

#[tokio::test]
async fn test_oracle_not_called_without_image() {
    let oracle = Arc::new(StubOracle::new());
    let adapter = AiAnnotationAdapter::new(oracle.clone(), AdapterConfig::default());

    let err = adapter.diagnose(&ImageContext::empty(), tooth("21")).await.unwrap_err();

    assert_eq!(err, AnnotationError::Chart(ChartError::NoImageUploaded));
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let oracle = Arc::new(StubOracle::new().failing_first(1));
    let config = AdapterConfig {
        timeout_ms: 1_000,
        max_attempts: 2,
    };
    let adapter = AiAnnotationAdapter::new(oracle.clone(), config);

    let finding = adapter.diagnose(&uploaded(), tooth("47")).await.unwrap();

    assert_eq!(finding, AiFinding::present(Condition::Sound));
    assert_eq!(oracle.call_count(), 2);
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let oracle = Arc::new(StubOracle::new().failing_first(5));
    let config = AdapterConfig {
        timeout_ms: 1_000,
        max_attempts: 3,
    };
    let adapter = AiAnnotationAdapter::new(oracle.clone(), config);

    let err = adapter.diagnose(&uploaded(), tooth("47")).await.unwrap_err();

    assert!(matches!(err, AnnotationError::OracleUnavailable(_)));
    assert_eq!(oracle.call_count(), 3);
}

#[tokio::test]
async fn test_unsupported_tooth_not_retried() {
    let oracle = Arc::new(
        StubOracle::new().with_error(tooth("18"), OracleError::UnsupportedTooth(tooth("18"))),
    );
    let adapter = AiAnnotationAdapter::new(oracle.clone(), AdapterConfig::default());

    let err = adapter.diagnose(&uploaded(), tooth("18")).await.unwrap_err();

    assert_eq!(err, AnnotationError::UnsupportedTooth(tooth("18")));
    assert_eq!(oracle.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_oracle_times_out() {
    let oracle = Arc::new(SlowOracle::new(Duration::from_secs(60)));
    let config = AdapterConfig {
        timeout_ms: 500,
        max_attempts: 2,
    };
    let adapter = AiAnnotationAdapter::new(oracle, config);

    let err = adapter.diagnose(&uploaded(), tooth("36")).await.unwrap_err();

    match err {
        AnnotationError::OracleUnavailable(reason) => assert!(reason.contains("500ms")),
        other => panic!("expected OracleUnavailable, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_oracle_within_budget() {
    let oracle = Arc::new(SlowOracle::new(Duration::from_millis(200)));
    let adapter = AiAnnotationAdapter::new(oracle, AdapterConfig::default());

    let finding = adapter.diagnose(&uploaded(), tooth("36")).await.unwrap();
    assert_eq!(finding.finding.conditions, ConditionSet::single(Condition::Sound));
}
