//! Tests for configuration serialization and defaults.

use common_config::{ExecutionConfig, RankleConfig};

#[test]
fn test_default_config() {
    let config = RankleConfig::default();
    assert!(config.execution.collect_metrics);
    assert_eq!(config.execution.max_rounds, None);
    assert_eq!(config.execution.deadline_ms, None);
}

#[test]
fn test_builders() {
    let execution = ExecutionConfig::default()
        .with_metrics(false)
        .with_max_rounds(64)
        .with_deadline_ms(5_000);
    assert!(!execution.collect_metrics);
    assert_eq!(execution.max_rounds, Some(64));
    assert_eq!(execution.deadline_ms, Some(5_000));
}

#[test]
fn test_json_roundtrip() {
    let config = RankleConfig {
        execution: ExecutionConfig::default().with_max_rounds(8),
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: RankleConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.execution.max_rounds, Some(8));
    assert!(back.execution.collect_metrics);
}

#[test]
fn test_null_optionals() {
    let json = r#"{"execution":{"collect_metrics":false,"max_rounds":null,"deadline_ms":null}}"#;
    let config: RankleConfig = serde_json::from_str(json).unwrap();
    assert!(!config.execution.collect_metrics);
    assert_eq!(config.execution.max_rounds, None);
}
