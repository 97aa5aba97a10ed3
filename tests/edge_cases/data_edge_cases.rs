//! Edge case tests for data-related scenarios

use crate::common::{CliTestRunner, TestFixture};
use tabrecon::loader::{load_path, LoadOptions, MalformedReason};
use tabrecon::{compare_readers, CompareSettings, KeyColumns, SchemaError, Side};

fn settings(keys: &[&str]) -> CompareSettings {
    CompareSettings::new(KeyColumns::new(keys.iter().copied()).unwrap())
}

fn compare(old: &str, new: &str, keys: &[&str]) -> tabrecon::Result<tabrecon::ReconReport> {
    compare_readers(old.as_bytes(), "old.csv", new.as_bytes(), "new.csv", &settings(keys))
}

#[test]
fn test_wrong_field_count_is_recovered() {
    let report = compare(
        "id,name,price\n1,A,10\n2,B,20\n",
        "id,name,price\n1,A,10\n2,B,20,extra\n3,C\n",
        &["id"],
    )
    .unwrap();

    assert_eq!(report.new_load.malformed_rows.len(), 2);
    assert_eq!(
        report.new_load.malformed_rows[0].reason,
        MalformedReason::FieldCount { expected: 3, found: 4 }
    );
    assert_eq!(report.new_load.malformed_rows[0].line, 3);
    assert_eq!(report.new_load.malformed_rows[0].raw, "2,B,20,extra");

    // The excluded row does not exist on the new side
    let summary = report.summary();
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.only_old, 1);
    assert_eq!(summary.malformed_rows, 2);
}

#[test]
fn test_quoted_fields_with_delimiters_and_newlines() {
    let report = compare(
        "id,note\n1,\"a, b\"\n2,\"line one\nline two\"\n",
        "id,note\n1,\"a; b\"\n2,\"line one line two\"\n",
        &["id"],
    )
    .unwrap();
    assert_eq!(report.summary().matched, 2);
    assert!(report.issues().is_empty());
}

#[test]
fn test_unicode_values_compare_on_ascii_content() {
    // Non-ASCII letters are dropped by normalization
    let report = compare("id,name\n1,Café\n2,北京\n", "id,name\n1,Caf-é\n2,\n", &["id"]).unwrap();
    let result = &report.result;
    assert_eq!(result.matched_len(), 1);
    // "北京" normalizes to empty text, the empty cell is missing
    assert_eq!(result.partial_len(), 1);
}

#[test]
fn test_utf8_bom_is_stripped_from_header() {
    let report = compare("\u{feff}id,v\n1,x\n", "id,v\n1,x\n", &["id"]).unwrap();
    assert_eq!(report.summary().matched, 1);
}

#[test]
fn test_header_only_inputs() {
    let report = compare("id,v\n", "id,v\n1,x\n", &["id"]).unwrap();
    let summary = report.summary();
    assert_eq!(summary.old_rows, 0);
    assert_eq!(summary.only_new, 1);
}

#[test]
fn test_empty_input_is_fatal() {
    let error = compare("", "id,v\n", &["id"]).unwrap_err();
    assert!(matches!(
        error.as_schema_error(),
        Some(SchemaError::EmptyInput { input }) if input == "old.csv"
    ));
}

#[test]
fn test_duplicate_header_is_fatal() {
    let error = compare("id,v,v\n1,a,b\n", "id,v\n", &["id"]).unwrap_err();
    assert!(matches!(
        error.as_schema_error(),
        Some(SchemaError::DuplicateColumn { column, .. }) if column == "v"
    ));
}

#[test]
fn test_missing_key_column_names_input() {
    let error = compare("id,v\n", "ID,v\n", &["id"]).unwrap_err();
    assert_eq!(
        error.as_schema_error(),
        Some(&SchemaError::MissingKeyColumn {
            column: "id".to_string(),
            input: "new.csv".to_string(),
        })
    );
}

#[test]
fn test_blank_keys_become_key_errors() {
    let report = compare("id,v\n,1\n--,2\nA,3\n", "id,v\nA,3\n", &["id"]).unwrap();
    assert_eq!(report.old_index.key_errors.len(), 2);
    assert_eq!(report.old_index.key_errors[0].line, 2);
    assert_eq!(report.old_index.key_errors[1].raw_key, vec![Some("--".to_string())]);
    assert_eq!(report.summary().matched, 1);
}

#[test]
fn test_partially_blank_composite_key_is_usable() {
    let report = compare("a,b,v\nX,,1\n", "a,b,v\nX,,1\n", &["a", "b"]).unwrap();
    assert_eq!(report.summary().matched, 1);
    assert!(report.old_index.key_errors.is_empty());
}

#[test]
fn test_duplicate_keys_last_wins() {
    let report = compare("id,v\nA,1\nA,2\nA,3\n", "id,v\nA,3\n", &["id"]).unwrap();
    assert_eq!(report.summary().matched, 1);
    let duplicates = &report.old_index.duplicates;
    assert_eq!(duplicates.len(), 2);
    assert_eq!((duplicates[0].kept_line, duplicates[0].replaced_line), (3, 2));
    assert_eq!((duplicates[1].kept_line, duplicates[1].replaced_line), (4, 3));
}

#[test]
fn test_keep_empty_distinguishes_blank_cells() {
    let mut keep = settings(&["id"]);
    keep.load.empty_as_missing = false;

    // By default the empty cell is missing and "--" is blank text
    let default = compare("id,a\n1,\n", "id,a\n1,--\n", &["id"]).unwrap();
    assert_eq!(default.summary().partial, 1);

    // With empty cells kept as text, "" and "--" both normalize to ""
    let kept = compare_readers(
        "id,a\n1,\n".as_bytes(),
        "old.csv",
        "id,a\n1,--\n".as_bytes(),
        "new.csv",
        &keep,
    )
    .unwrap();
    assert_eq!(kept.summary().matched, 1);
}

#[test]
fn test_trim_option() {
    let mut trimmed = settings(&["id"]);
    trimmed.load.trim = true;
    let report = compare_readers(
        " id , v \n 1 , x \n".as_bytes(),
        "old.csv",
        "id,v\n1,x\n".as_bytes(),
        "new.csv",
        &trimmed,
    )
    .unwrap();
    assert_eq!(report.summary().matched, 1);
    assert_eq!(report.result.matched().next().unwrap().display().raw("v"), Some("x"));
}

#[test]
fn test_latin1_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_bytes("latin1.csv", b"id,name\n1,Caf\xe9\n").unwrap();
    let keys = KeyColumns::new(["id"]).unwrap();

    let options = LoadOptions {
        encoding: "latin1".to_string(),
        ..LoadOptions::default()
    };
    let (dataset, report) = load_path(&path, Side::Old, &keys, &options).unwrap();
    assert!(!report.has_issues());
    assert_eq!(dataset.row(0).unwrap().raw("name"), Some("Café"));

    // Read as UTF-8 the same row is malformed
    let (dataset, report) = load_path(&path, Side::Old, &keys, &LoadOptions::default()).unwrap();
    assert!(dataset.is_empty());
    assert!(matches!(report.malformed_rows[0].reason, MalformedReason::Encoding { .. }));
}

#[test]
fn test_unknown_encoding_rejected() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let path = fixture.create_csv_raw("a.csv", "id\n1\n").unwrap();
    let error = runner.expect_failure(&[
        "compare",
        &fixture.path_str(&path),
        &fixture.path_str(&path),
        "--key", "id",
        "--encoding", "klingon",
    ]);
    assert!(error.to_string().contains("klingon"));
}

#[test]
fn test_large_inputs() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_large_csv("old.csv", 5_000, 5).unwrap();
    let new = fixture.create_large_csv("new.csv", 5_000, 5).unwrap();

    let report = runner.compare_json(&old, &new, &["id"], "large");
    assert_eq!(report["summary"]["matched"], 5_000);
    assert_eq!(report["summary"]["partial"], 0);
}

#[test]
fn test_very_long_values() {
    let long_value = "x".repeat(100_000);
    let old = format!("id,description\n1,{}\n", long_value);
    let new = format!("id,description\n1,{}y\n", long_value);
    let report = compare(&old, &new, &["id"]).unwrap();
    assert_eq!(report.summary().partial, 1);
}

#[test]
fn test_malformed_rows_reach_issue_outputs() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv_raw("old.csv", "id,v\n1,a\n").unwrap();
    let new = fixture.create_csv_raw("new.csv", "id,v\n1,a\n2\n").unwrap();

    let report = runner.compare_json(&old, &new, &["id"], "issues");
    let issues = report["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["kind"], "malformed_row");
    assert_eq!(issues[0]["side"], "new");
    assert_eq!(issues[0]["line"], 3);
}
