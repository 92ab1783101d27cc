//! Integration tests for loading a Go module and filling its literals.

use std::fs;
use std::path::{Path, PathBuf};

use fillstruct::{analyze_program, apply_edits, Config, Diagnostic, LoadOptions, Program};

fn module_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("module")
}

fn load(root: &Path, options: &LoadOptions) -> (Program, Vec<Diagnostic>) {
    let program = Program::load(root, options).expect("module should load");
    let diagnostics = analyze_program(&program);
    (program, diagnostics)
}

/// Copy the fixture module into a fresh temporary directory.
fn copy_module() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    let src = module_path();
    for entry in walkdir::WalkDir::new(&src) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&src).unwrap();
        let dest = dir.path().join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).unwrap();
        } else {
            fs::copy(entry.path(), &dest).unwrap();
        }
    }
    dir
}

fn new_text(d: &Diagnostic) -> &str {
    &d.fixes[0].edits[0].new_text
}

#[test]
fn test_load_module_packages() {
    let (program, _) = load(&module_path(), &LoadOptions::default());

    assert_eq!(program.module(), Some("example.com/shop"));
    assert_eq!(program.files_scanned(), 3);

    let mut paths: Vec<&str> = program.packages().iter().map(|p| p.path.as_str()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "example.com/shop",
            "example.com/shop/generated",
            "example.com/shop/inventory"
        ]
    );
    let inventory = program.package_by_path("example.com/shop/inventory").unwrap();
    assert_eq!(inventory.name, "inventory");
}

#[test]
fn test_fill_module() {
    let (_, diagnostics) = load(&module_path(), &LoadOptions::default());

    let sites: Vec<(&str, &str)> = diagnostics
        .iter()
        .map(|d| (d.file.as_str(), d.message.as_str()))
        .collect();
    assert_eq!(
        sites,
        vec![
            ("generated/model.go", "Fill Model"),
            ("inventory/item.go", "Fill Item"),
            ("main.go", "Fill Order"),
            ("main.go", "Fill struct"),
        ]
    );

    // Unexported fields are only filled inside their own package.
    assert_eq!(
        new_text(&diagnostics[1]),
        "Item{\n\tSKU:      \"\",\n\tQuantity: 0,\n\tprice:    0,\n}"
    );
    assert_eq!(
        new_text(&diagnostics[2]),
        "Order{\n\tID:    0,\n\tItems: []inventory.Item{},\n\tPaid:  false,\n}"
    );
    assert_eq!(
        new_text(&diagnostics[3]),
        "inventory.Item{\n\tSKU:      \"\",\n\tQuantity: 0,\n}"
    );

    assert_eq!(diagnostics[2].span.start_line, 16);
    assert_eq!(diagnostics[3].span.start_line, 17);
}

#[test]
fn test_config_selects_files() {
    let config = Config::parse_str(
        r#"
version: "1"
include_test_files: true
excluded_paths:
  - "**/generated/**"
"#,
    )
    .unwrap();
    let options = config.load_options().unwrap();
    let (program, diagnostics) = load(&module_path(), &options);

    assert_eq!(program.files_scanned(), 3);
    assert!(program.package_by_path("example.com/shop/generated").is_none());

    let files: Vec<&str> = diagnostics.iter().map(|d| d.file.as_str()).collect();
    assert_eq!(
        files,
        vec![
            "inventory/item.go",
            "inventory/item_test.go",
            "main.go",
            "main.go"
        ]
    );
}

#[test]
fn test_single_file_path() {
    let (program, diagnostics) = load(
        &module_path().join("inventory").join("item.go"),
        &LoadOptions::default(),
    );
    assert_eq!(program.files_scanned(), 1);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].file, "item.go");
}

#[test]
fn test_missing_path_is_an_error() {
    let result = Program::load(&module_path().join("nope"), &LoadOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_applied_fixes_leave_nothing_to_fill() {
    let dir = copy_module();
    let (program, diagnostics) = load(dir.path(), &LoadOptions::default());
    assert_eq!(diagnostics.len(), 4);

    for package in program.packages() {
        for file in &package.files {
            let edits: Vec<_> = diagnostics
                .iter()
                .filter(|d| d.file == file.name)
                .flat_map(|d| d.fixes[0].edits.iter().cloned())
                .collect();
            if !edits.is_empty() {
                fs::write(&file.path, apply_edits(&file.source, &edits)).unwrap();
            }
        }
    }

    let main = fs::read_to_string(dir.path().join("main.go")).unwrap();
    assert!(main.contains("o := Order{\n\tID:    0,\n"));
    assert!(main.contains("done := Order{ID: 1}"));

    let (refilled, again) = load(dir.path(), &LoadOptions::default());
    assert_eq!(refilled.files_scanned(), 3);
    assert!(again.is_empty(), "unexpected diagnostics: {:?}", again);
}
