//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.minutes-aggregator.toml` files.

use crate::cli::{Args, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".minutes-aggregator.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("minutes_report.md")
}

/// Input file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Files to aggregate, in order.
    #[serde(default = "default_paths")]
    pub paths: Vec<PathBuf>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
        }
    }
}

fn default_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("extracted_data_modular_all_modules.json")]
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Rows shown in excerpt tables.
    #[serde(default = "default_excerpt_limit")]
    pub excerpt_limit: usize,

    /// Include the global timeline section.
    #[serde(default = "default_true")]
    pub include_timeline: bool,

    /// Merge consecutive turns of the same speaker in timelines.
    #[serde(default)]
    pub coalesce_timeline: bool,

    /// Maximum characters of a snippet shown in tables.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            excerpt_limit: default_excerpt_limit(),
            include_timeline: true,
            coalesce_timeline: false,
            snippet_chars: default_snippet_chars(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_excerpt_limit() -> usize {
    10
}

fn default_snippet_chars() -> usize {
    80
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &Args) {
        if !args.input.is_empty() {
            self.input.paths = args.input.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(excerpt) = args.excerpt {
            self.report.excerpt_limit = excerpt;
        }

        // Flags always override
        if args.coalesce {
            self.report.coalesce_timeline = true;
        }
        if args.no_timeline {
            self.report.include_timeline = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
