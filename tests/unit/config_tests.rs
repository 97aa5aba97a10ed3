//! Unit tests for config file handling

use crate::common::{assertions, CliTestRunner, TestFixture};
use std::fs;
use tabrecon::config::ReconConfig;
use tabrecon::TabreconError;

#[test]
fn test_init_config_writes_defaults() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.root().join("fresh.json");

    assert!(ReconConfig::write_default(&path, false).unwrap());
    assertions::assert_file_exists_and_not_empty(&path);
    assertions::assert_json_contains_keys(
        &path,
        &["version", "created", "key_columns", "delimiter", "encoding", "export_dir", "format"],
    )
    .unwrap();

    let config = ReconConfig::from_file(&path).unwrap();
    assert_eq!(config.version, tabrecon::FORMAT_VERSION);
    assert_eq!(config.format, "xlsx");
    assert!(config.empty_as_missing);
}

#[test]
fn test_init_config_command_respects_force() {
    let runner = CliTestRunner::new().unwrap();
    let path = runner.fixture().config_path();

    // The runner already wrote a config; without --force it is kept
    fs::write(&path, r#"{"key_columns": ["sku"]}"#).unwrap();
    runner.expect_success(&["init-config"]);
    let kept = ReconConfig::from_file(&path).unwrap();
    assert_eq!(kept.key_columns, vec!["sku".to_string()]);
    assert!(kept.created.is_none());

    runner.expect_success(&["init-config", "--force"]);
    let replaced = ReconConfig::from_file(&path).unwrap();
    assert!(replaced.key_columns.is_empty());
    assert!(replaced.created.is_some());
}

#[test]
fn test_config_supplies_keys_and_delimiter() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let config = ReconConfig {
        key_columns: vec!["id".to_string()],
        delimiter: ";".to_string(),
        export_dir: fixture.export_dir(),
        ..ReconConfig::default()
    };
    fs::write(fixture.config_path(), serde_json::to_string(&config).unwrap()).unwrap();

    let old = fixture.create_csv_raw("old.csv", "id;v\nA;1\nB;2\n").unwrap();
    let new = fixture.create_csv_raw("new.csv", "id;v\nA;1\nB;3\n").unwrap();

    runner.expect_success(&[
        "compare",
        &fixture.path_str(&old),
        &fixture.path_str(&new),
        "--format", "json",
        "--name", "from_config",
        "--quiet",
    ]);

    let path = fixture.export_dir().join("from_config.json");
    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(report["key_columns"], serde_json::json!(["id"]));
    assert_eq!(report["summary"]["matched"], 1);
    assert_eq!(report["summary"]["partial"], 1);
}

#[test]
fn test_invalid_config_is_reported() {
    let runner = CliTestRunner::new().unwrap();
    fs::write(runner.fixture().config_path(), r#"{"delimiter": "::"}"#).unwrap();

    let error = runner.expect_failure(&["compare", "a.csv", "b.csv", "--key", "id"]);
    assert!(matches!(error, TabreconError::Config { .. }));
    assert!(error.to_string().contains("delimiter"));
}

#[test]
fn test_malformed_config_json() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("broken.json", "{ not json").unwrap();
    let error = ReconConfig::from_file(&path).unwrap_err();
    assert!(error.to_string().contains("Invalid config"));
}

#[test]
fn test_missing_explicit_config() {
    let fixture = TestFixture::new().unwrap();
    let error = ReconConfig::discover(Some(&fixture.root().join("nope.json")), fixture.root()).unwrap_err();
    assert!(matches!(error, TabreconError::Config { .. }));
}
