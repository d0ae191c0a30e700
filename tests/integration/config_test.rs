use std::fs;

use telesim::core::config::{EngineConfig, TickCadence};
use telesim::core::telemetry::{ThresholdPair, Thresholds};
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = EngineConfig::default();
    assert!(config.seed.is_none());
    assert_eq!(config.thresholds, Thresholds::default());
    assert_eq!(config.initial.disk, 60.0);
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let config = EngineConfig {
        seed: Some(77),
        cadence: TickCadence {
            cpu_ms: 250,
            ..Default::default()
        },
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    let loaded = EngineConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_missing_or_empty_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    assert_eq!(
        EngineConfig::load_from(&path).unwrap(),
        EngineConfig::default()
    );

    fs::write(&path, "  \n").unwrap();
    assert_eq!(
        EngineConfig::load_from(&path).unwrap(),
        EngineConfig::default()
    );
}

#[test]
fn test_config_partial_thresholds() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "thresholds": { "cpu": { "warning": 60.0, "critical": 80.0 } } }"#,
    )
    .unwrap();

    let config = EngineConfig::load_from(&path).unwrap();
    assert_eq!(config.thresholds.cpu, ThresholdPair::new(60.0, 80.0));
    assert_eq!(config.thresholds.memory, Thresholds::default().memory);
}

#[test]
fn test_config_rejects_inverted_thresholds() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "thresholds": { "cpu": { "warning": 95.0, "critical": 80.0 } } }"#,
    )
    .unwrap();

    assert!(EngineConfig::load_from(&path).is_err());
}

#[test]
fn test_config_rejects_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "not json").unwrap();

    assert!(EngineConfig::load_from(&path).is_err());
}
