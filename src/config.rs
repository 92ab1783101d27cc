//! Configuration schema for fillstruct.
//!
//! A configuration file selects which files of a tree are analyzed.

use anyhow::Context;
use globset::{Glob, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::LoadOptions;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["fillstruct.yaml", ".fillstruct.yaml"];

/// Content written by `fillstruct init`.
pub const DEFAULT_CONFIG: &str = include_str!("templates/fillstruct.yaml");

/// Supported schema version.
const CONFIG_VERSION: &str = "1";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Whether to include test files in analysis (default: false)
    #[serde(default)]
    pub include_test_files: Option<bool>,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/generated/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Module path overriding the `go.mod` module directive.
    #[serde(default)]
    pub module: Option<String>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Returns whether to include test files (defaults to false).
    pub fn should_include_test_files(&self) -> bool {
        self.include_test_files.unwrap_or(false)
    }

    /// Loader options described by this configuration.
    pub fn load_options(&self) -> anyhow::Result<LoadOptions> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid excluded_paths pattern {:?}", pattern))?;
            builder.add(glob);
        }
        Ok(LoadOptions {
            include_test_files: self.should_include_test_files(),
            excluded: builder.build()?,
            module: self.module.clone().filter(|m| !m.is_empty()),
        })
    }
}

/// Find a configuration file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Validate a configuration.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if !config.version.is_empty() && config.version != CONFIG_VERSION {
        anyhow::bail!(
            "unsupported config version {:?} (expected {:?})",
            config.version,
            CONFIG_VERSION
        );
    }

    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .with_context(|| format!("invalid excluded_paths pattern {:?}", pattern))?;
    }

    Ok(())
}
