//! Output formatting for fillstruct results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::fill::Diagnostic;

/// Scan metadata shown alongside the diagnostics.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub path: String,
    pub files_scanned: usize,
    pub packages: usize,
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub packages: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    pub fixes: Vec<JsonFix>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFix {
    pub message: String,
    pub edits: Vec<JsonEdit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEdit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

/// Build the JSON report for a scan.
pub fn json_report(summary: &ScanSummary, diagnostics: &[Diagnostic]) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: summary.path.clone(),
        files_scanned: summary.files_scanned,
        packages: summary.packages,
        diagnostics: diagnostics.iter().map(diagnostic_to_json).collect(),
    }
}

fn diagnostic_to_json(d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        file: d.file.clone(),
        line: d.span.start_line,
        column: d.span.start_col,
        end_line: d.span.end_line,
        end_column: d.span.end_col,
        message: d.message.clone(),
        fixes: d
            .fixes
            .iter()
            .map(|fix| JsonFix {
                message: fix.message.clone(),
                edits: fix
                    .edits
                    .iter()
                    .map(|e| JsonEdit {
                        start: e.start,
                        end: e.end,
                        new_text: e.new_text.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Write results in JSON format.
pub fn write_json(summary: &ScanSummary, diagnostics: &[Diagnostic]) -> anyhow::Result<()> {
    let report = json_report(summary, diagnostics);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in colored terminal format.
pub fn write_pretty(summary: &ScanSummary, diagnostics: &[Diagnostic]) {
    // Header
    println!();
    print!("  ");
    print!("{}", "fillstruct".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", summary.path);
    println!();

    if !diagnostics.is_empty() {
        write_diagnostics(diagnostics);
    }

    write_final_status(summary, diagnostics.len());
    println!();
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    println!("  {} ({}):", "Fillable literals".bold(), diagnostics.len());
    println!();

    for d in diagnostics {
        print!("    {}   ", "FILL".yellow());
        print!("{}", d.file.blue());
        print!("{}", format!(":{}", d.span).dimmed());
        println!("  {}", d.message);

        for fix in &d.fixes {
            for edit in &fix.edits {
                for line in edit.new_text.lines() {
                    println!("            {}", line.replace('\t', "    "));
                }
            }
        }
        println!();
    }
}

fn write_final_status(summary: &ScanSummary, count: usize) {
    let scanned = format!(
        "{} files in {} packages",
        summary.files_scanned, summary.packages
    );
    if count == 0 {
        println!("  {} No fillable literals ({})", "✓".green(), scanned.dimmed());
    } else {
        println!(
            "  {} {} fillable literal{} ({})",
            "●".yellow(),
            count,
            if count == 1 { "" } else { "s" },
            scanned.dimmed()
        );
    }
}
