//! Integration tests for the compare and presence commands

use crate::common::{assertions, sample_data, CliTestRunner};
use std::fs;

#[test]
fn test_compare_writes_xlsx_by_default() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::updated_csv_data()).unwrap();

    runner.expect_success(&[
        "compare",
        &fixture.path_str(&old),
        &fixture.path_str(&new),
        "--key", "id",
        "--name", "fruit",
        "--quiet",
    ]);

    assertions::assert_is_xlsx(&fixture.export_dir().join("fruit.xlsx"));
}

#[test]
fn test_compare_oversized_cell_needs_csv() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv_raw("old.csv", "id,note\n1,short\n").unwrap();
    let new = fixture
        .create_csv_raw("new.csv", &format!("id,note\n1,{}\n", "x".repeat(40_000)))
        .unwrap();
    let old = fixture.path_str(&old);
    let new = fixture.path_str(&new);

    let err = runner.expect_failure(&["compare", &old, &new, "--key", "id", "--name", "long", "--quiet"]);
    assert!(matches!(err, tabrecon::TabreconError::Render { .. }), "{}", err);
    assert!(!fixture.export_dir().join("long.xlsx").exists());

    runner.expect_success(&[
        "compare", &old, &new, "--key", "id", "--name", "long", "--format", "csv", "--quiet",
    ]);
    let partial = assertions::read_csv(&fixture.export_dir().join("long").join("partial.csv"));
    assert_eq!(partial[1][2].len(), 40_000);
}

#[test]
fn test_compare_default_export_name() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::updated_csv_data()).unwrap();

    runner.expect_success(&[
        "compare",
        &fixture.path_str(&old),
        &fixture.path_str(&new),
        "--key", "id",
        "--quiet",
    ]);

    let names: Vec<String> = fs::read_dir(fixture.export_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("output-"), "unexpected name {}", names[0]);
    assert!(names[0].ends_with(".xlsx"));
}

#[test]
fn test_compare_json_report_partitions() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::updated_csv_data()).unwrap();

    let report = runner.compare_json(&old, &new, &["id"], "fruit");

    assert_eq!(report["summary"]["matched"], 1);
    assert_eq!(report["summary"]["partial"], 1);
    assert_eq!(report["summary"]["only_old"], 1);
    assert_eq!(report["summary"]["only_new"], 1);

    // Banana matches despite the currency sign; old values are shown
    assert_eq!(report["matched"][0]["key"], "2");
    assert_eq!(report["matched"][0]["values"]["price"], "0.75");

    let partial = &report["partial"][0];
    assert_eq!(partial["key"], "1");
    let cells = partial["cells"].as_array().unwrap();
    let price = cells.iter().find(|c| c["column"] == "price").unwrap();
    assert_eq!(price["old"], "1.50");
    assert_eq!(price["new"], "1.60");
    assert_eq!(price["differs"], true);
    let name = cells.iter().find(|c| c["column"] == "name").unwrap();
    assert_eq!(name["differs"], false);

    assert_eq!(report["only_old"][0]["values"]["name"], "Cherry");
    assert_eq!(report["only_new"][0]["values"]["name"], "Date");
    assert_eq!(report["issues"].as_array().unwrap().len(), 0);
}

#[test]
fn test_compare_csv_directory() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::updated_csv_data()).unwrap();

    runner.expect_success(&[
        "compare",
        &fixture.path_str(&old),
        &fixture.path_str(&new),
        "--key", "id",
        "--format", "csv",
        "--name", "fruit",
        "--quiet",
    ]);

    let dir = fixture.export_dir().join("fruit");
    assertions::assert_dir_exists(&dir);

    let matched = assertions::read_csv(&dir.join("matched.csv"));
    assert_eq!(matched, vec![vec!["id", "name", "price"], vec!["2", "Banana", "0.75"]]);

    let partial = assertions::read_csv(&dir.join("partial.csv"));
    assert_eq!(
        partial[0],
        vec!["id", "name_old", "name_new", "price_old", "price_new", "differing_columns"]
    );
    assert_eq!(partial[1], vec!["1", "Apple", "Apple", "1.50", "1.60", "price"]);

    let only_old = assertions::read_csv(&dir.join("only_old.csv"));
    assert_eq!(only_old[1], vec!["3", "Cherry", "2.00"]);
    let only_new = assertions::read_csv(&dir.join("only_new.csv"));
    assert_eq!(only_new[1], vec!["4", "Date", "3.00"]);

    let issues = assertions::read_csv(&dir.join("issues.csv"));
    assert_eq!(issues, vec![vec!["kind", "side", "line", "detail"]]);
}

#[test]
fn test_compare_multi_column_key() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::vendors_old()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::vendors_new()).unwrap();

    let report = runner.compare_json(&old, &new, &["vendor", "region"], "vendors");

    assert_eq!(report["summary"]["matched"], 1);
    assert_eq!(report["matched"][0]["key"], "FooInc|EU");
    assert_eq!(report["summary"]["partial"], 1);
    assert_eq!(report["partial"][0]["key"], "BarCo|US");
    assert_eq!(report["only_old"][0]["key"], "BazLtd|EU");
    assert_eq!(report["only_new"][0]["key"], "Qux|APAC");
}

#[test]
fn test_compare_reports_schema_mismatch() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::schema_changed_csv_data()).unwrap();

    let report = runner.compare_json(&old, &new, &["id"], "schema");

    // Reordered columns and the extra column do not cause differences
    assert_eq!(report["summary"]["matched"], 3);
    assert_eq!(report["summary"]["partial"], 0);
    assert_eq!(report["summary"]["schema_mismatches"], 1);
    assert_eq!(report["schema_mismatches"][0]["column"], "category");
    assert_eq!(report["schema_mismatches"][0]["present_in"], "new");
    assert_eq!(report["issues"][0]["kind"], "schema_mismatch");
}

#[test]
fn test_compare_missing_key_column_fails() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv_raw("new.csv", "sku,name\n1,Apple\n").unwrap();

    let error = runner.expect_failure(&[
        "compare",
        &fixture.path_str(&old),
        &fixture.path_str(&new),
        "--key", "id",
    ]);
    let message = error.to_string();
    assert!(message.contains("'id'"), "{}", message);
    assert!(message.contains("new.csv"), "{}", message);
    assert!(!fixture.export_dir().exists());
}

#[test]
fn test_compare_missing_input_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();

    let error = runner.expect_failure(&[
        "compare",
        &fixture.path_str(&old),
        &fixture.path_str(&fixture.root().join("missing.csv")),
        "--key", "id",
    ]);
    assert!(error.to_string().contains("does not exist"));
}

#[test]
fn test_compare_without_keys_fails() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();

    let error = runner.expect_failure(&["compare", &fixture.path_str(&old), &fixture.path_str(&old)]);
    assert!(error.to_string().contains("key"));
}

#[test]
fn test_compare_output_override() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let out = fixture.root().join("elsewhere");

    runner.expect_success(&[
        "compare",
        &fixture.path_str(&old),
        &fixture.path_str(&old),
        "--key", "id",
        "--format", "json",
        "--output", &fixture.path_str(&out),
        "--name", "same",
        "--json-summary",
    ]);

    assertions::assert_json_contains_keys(
        &out.join("same.json"),
        &["summary", "matched", "partial", "only_old", "only_new", "issues"],
    )
    .unwrap();
}

#[test]
fn test_presence_omits_matches() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::updated_csv_data()).unwrap();

    runner.expect_success(&[
        "presence",
        &fixture.path_str(&old),
        &fixture.path_str(&new),
        "--key", "id",
        "--format", "json",
        "--name", "presence",
        "--quiet",
    ]);

    let path = fixture.export_dir().join("presence.json");
    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(report.get("matched").is_none());
    assert!(report.get("partial").is_none());
    assert_eq!(report["only_old"][0]["key"], "3");
    assert_eq!(report["only_new"][0]["key"], "4");
}

#[test]
fn test_presence_csv_directory_has_no_match_files() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture.create_csv("old.csv", &sample_data::simple_csv_data()).unwrap();
    let new = fixture.create_csv("new.csv", &sample_data::updated_csv_data()).unwrap();

    runner.expect_success(&[
        "presence",
        &fixture.path_str(&old),
        &fixture.path_str(&new),
        "--key", "id",
        "--format", "csv",
        "--name", "presence",
        "--quiet",
    ]);

    let dir = fixture.export_dir().join("presence");
    assert!(!dir.join("matched.csv").exists());
    assert!(!dir.join("partial.csv").exists());
    assert!(dir.join("only_old.csv").exists());
    assert!(dir.join("only_new.csv").exists());
    assert!(dir.join("issues.csv").exists());
}
