// tests/config_loading.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use bgevent::config::{load_and_validate, load_from_path, ConfigFile};
use bgevent::dispatch::DispatchConfig;
use bgevent::errors::EngineError;

#[test]
fn full_file_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[engine]
name = "resource-deltas"
report_label = "Errors while processing resource deltas"
owner = "team.core"

[dispatch]
short_delay_ms = 200
long_delay_ms = 2000
short_cycle_threshold = 5
wait_delay_ms = 20
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.engine.name, "resource-deltas");
    assert_eq!(cfg.engine.owner.as_deref(), Some("team.core"));
    assert_eq!(
        cfg.dispatch_config(),
        DispatchConfig {
            short_delay: Duration::from_millis(200),
            long_delay: Duration::from_millis(2000),
            short_cycle_threshold: 5,
            wait_delay: Duration::from_millis(20),
        }
    );
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[dispatch]
wait_delay_ms = 50
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.engine.name, "bgevent");
    assert_eq!(cfg.engine.owner, None);

    let d = cfg.dispatch_config();
    assert_eq!(d.short_delay, Duration::from_millis(1500));
    assert_eq!(d.long_delay, Duration::from_millis(10_000));
    assert_eq!(d.short_cycle_threshold, 3);
    assert_eq!(d.wait_delay, Duration::from_millis(50));
}

#[test]
fn short_delay_above_long_delay_is_a_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[dispatch]
short_delay_ms = 5000
long_delay_ms = 1000
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(EngineError::ConfigError(msg)) => {
            assert!(msg.contains("short_delay_ms"));
            assert!(msg.contains("5000"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[dispatch\nshort_delay_ms = ").unwrap();

    let result = load_from_path(file.path());
    assert!(matches!(result, Err(EngineError::TomlError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(EngineError::IoError(_))));
}

#[test]
fn builder_rejects_zero_threshold() {
    let raw = ConfigFileBuilder::new().with_threshold(0).raw();
    match ConfigFile::try_from(raw) {
        Err(EngineError::ConfigError(msg)) => assert!(msg.contains("short_cycle_threshold")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn builder_produces_a_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .with_name("deltas")
        .with_owner("team.core")
        .with_delays_ms(100, 1000)
        .build();

    assert_eq!(cfg.engine.name, "deltas");
    assert_eq!(cfg.dispatch_config().short_delay, Duration::from_millis(100));
    assert_eq!(cfg.dispatch_config().long_delay, Duration::from_millis(1000));
}
