//! Command-line interface for fillstruct.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analysis::Program;
use crate::config::{self, Config};
use crate::fill::{self, apply_edits, Diagnostic, TextEdit};
use crate::report::{self, ScanSummary};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Fill empty Go struct literals with the zero value of every field.
///
/// fillstruct finds composite literals like `Foo{}` whose type is a struct
/// and suggests a replacement naming each accessible field with its zero
/// value, laid out the way gofmt would.
#[derive(Parser)]
#[command(name = "fillstruct")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter requested on the command line, if any.
    pub fn log_level(&self) -> Option<&str> {
        match &self.command {
            Commands::Check(args) => args.common.log_level.as_deref(),
            Commands::Fix(args) => args.common.log_level.as_deref(),
            Commands::Init(_) => None,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report struct literals that can be filled
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Rewrite files, filling every empty struct literal
    Fix(FixArgs),
    /// Create a default fillstruct.yaml
    Init(InitArgs),
}

/// Options shared by the analyzing commands.
#[derive(Args)]
pub struct CommonArgs {
    /// Path to analyze (Go file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "fillstruct=trace" (default: RUST_LOG or warn)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Exit non-zero when any literal can be filled
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the fix command.
#[derive(Parser)]
pub struct FixArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print rewritten files instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "fillstruct.yaml")]
    pub output: PathBuf,
}

/// Use the given config file, or one found in the working directory, or
/// the defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config::discover(Path::new(".")),
    };

    let config = match &path {
        Some(p) => {
            debug!(config = %p.display(), "using configuration file");
            Config::parse_file(p)
                .with_context(|| format!("error parsing config {}", p.display()))?
        }
        None => Config::default(),
    };

    config::validate(&config).context("invalid config")?;
    Ok(config)
}

/// Load and analyze the tree named by `args`.
fn analyze(args: &CommonArgs) -> anyhow::Result<(Program, Vec<Diagnostic>)> {
    let config = load_config(args.config.as_deref())?;
    let options = config.load_options()?;

    let program = Program::load(&args.path, &options)
        .with_context(|| format!("cannot load {}", args.path.display()))?;
    let diagnostics = fill::analyze_program(&program);
    info!(
        files = program.files_scanned(),
        diagnostics = diagnostics.len(),
        "analysis complete"
    );
    Ok((program, diagnostics))
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (program, diagnostics) = analyze(&args.common)?;

    let summary = ScanSummary {
        path: args.common.path.to_string_lossy().to_string(),
        files_scanned: program.files_scanned(),
        packages: program.packages().len(),
    };
    if summary.files_scanned == 0 {
        eprintln!("Warning: no Go files to scan");
    }

    match args.format.as_str() {
        "json" => report::write_json(&summary, &diagnostics)?,
        _ => report::write_pretty(&summary, &diagnostics),
    }

    if args.strict && !diagnostics.is_empty() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the fix command.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let (program, diagnostics) = analyze(&args.common)?;

    let files = edits_by_file(&diagnostics);
    if files.is_empty() {
        println!("No fillable literals");
        return Ok(EXIT_SUCCESS);
    }

    let mut rewritten = 0;
    for (name, edits) in &files {
        let Some(file) = program
            .packages()
            .iter()
            .flat_map(|p| p.files.iter())
            .find(|f| &f.name == name)
        else {
            continue;
        };

        let fixed = apply_edits(&file.source, edits);
        if args.dry_run {
            println!("// {}", file.name);
            print!("{}", fixed);
            if !fixed.ends_with('\n') {
                println!();
            }
        } else {
            std::fs::write(&file.path, &fixed)
                .with_context(|| format!("failed to write {}", file.path.display()))?;
            println!("Fixed {} ({} literals)", file.name, edits.len());
        }
        rewritten += 1;
    }

    if !args.dry_run {
        println!();
        println!(
            "Filled {} literals in {} files",
            diagnostics.len(),
            rewritten
        );
    }

    Ok(EXIT_SUCCESS)
}

/// Every edit of every fix, grouped by file name.
pub fn edits_by_file(diagnostics: &[Diagnostic]) -> BTreeMap<String, Vec<TextEdit>> {
    let mut files: BTreeMap<String, Vec<TextEdit>> = BTreeMap::new();
    for d in diagnostics {
        let edits = d.fixes.iter().flat_map(|f| f.edits.iter().cloned());
        files.entry(d.file.clone()).or_default().extend(edits);
    }
    files
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, config::DEFAULT_CONFIG) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: fillstruct check . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
