//! Tests for JSON output format stability.
//!
//! Tools consuming `fillstruct check --format json` depend on these field
//! names and on the ordering of diagnostics.

use std::path::PathBuf;

use fillstruct::report::{json_report, JsonReport, ScanSummary};
use fillstruct::{analyze_program, LoadOptions, Program};

fn module_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("module")
}

fn run_and_get_json() -> JsonReport {
    let program =
        Program::load(&module_path(), &LoadOptions::default()).expect("module should load");
    let diagnostics = analyze_program(&program);
    let summary = ScanSummary {
        path: "testdata/module".to_string(),
        files_scanned: program.files_scanned(),
        packages: program.packages().len(),
    };
    json_report(&summary, &diagnostics)
}

#[test]
fn test_json_top_level_fields() {
    let report = run_and_get_json();
    let value = serde_json::to_value(&report).unwrap();
    let obj = value.as_object().unwrap();

    let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["diagnostics", "files_scanned", "packages", "path", "version"]
    );
    assert_eq!(obj["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(obj["files_scanned"], 3);
    assert_eq!(obj["packages"], 3);
}

#[test]
fn test_json_diagnostic_fields() {
    let report = run_and_get_json();
    let value = serde_json::to_value(&report).unwrap();
    let first = &value["diagnostics"][0];

    let mut keys: Vec<&str> = first
        .as_object()
        .unwrap()
        .keys()
        .map(|k| k.as_str())
        .collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["column", "end_column", "end_line", "file", "fixes", "line", "message"]
    );

    assert_eq!(first["file"], "generated/model.go");
    assert_eq!(first["line"], 7);
    assert_eq!(first["column"], 20);
    assert_eq!(first["end_line"], 7);
    assert_eq!(first["end_column"], 22);

    let edit = &first["fixes"][0]["edits"][0];
    assert_eq!(first["fixes"][0]["message"], "Fill Model");
    assert_eq!(edit["new_text"], "Model{\n\tVersion: 0,\n}");
    assert!(edit["start"].as_u64().unwrap() < edit["end"].as_u64().unwrap());
}

#[test]
fn test_json_round_trips() {
    let report = run_and_get_json();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: JsonReport = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.diagnostics.len(), report.diagnostics.len());
    let files: Vec<&str> = parsed.diagnostics.iter().map(|d| d.file.as_str()).collect();
    assert_eq!(
        files,
        vec!["generated/model.go", "inventory/item.go", "main.go", "main.go"]
    );
}
