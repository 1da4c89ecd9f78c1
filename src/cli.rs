//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minutes Aggregator - cross-document statistics for meeting minutes
///
/// Reads the per-document analyses produced by the extraction step and
/// writes one report covering attendance, law citations, speakers,
/// decisions, votes and the global speaker graph.
///
/// Examples:
///   minutes-aggregator --input extracted_data_modular_all_modules.json
///   minutes-aggregator -i 1958.json -i 1959.json --format json -o summary.json
///   minutes-aggregator -i minutes.json --document seance_12.txt --coalesce
///   minutes-aggregator --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Input JSON file(s) holding a list of document analyses
    ///
    /// Repeat the flag to aggregate several files; documents are taken in
    /// the order the files are given. Defaults to the config file setting.
    #[arg(short, long, value_name = "FILE")]
    pub input: Vec<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT", env = "MINUTES_AGGREGATOR_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .minutes-aggregator.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report on a single document instead of the whole collection
    ///
    /// Matches the `file` field of the document records.
    #[arg(short, long, value_name = "NAME")]
    pub document: Option<String>,

    /// Merge consecutive turns of the same speaker in reported timelines
    #[arg(long)]
    pub coalesce: bool,

    /// Number of rows shown in excerpt tables
    #[arg(long, value_name = "ROWS")]
    pub excerpt: Option<usize>,

    /// Leave the global timeline out of the report
    #[arg(long)]
    pub no_timeline: bool,

    /// Exit with code 2 when no document could be aggregated
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .minutes-aggregator.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.excerpt == Some(0) {
            return Err("Excerpt size must be at least 1".to_string());
        }

        if let Some(ref name) = self.document {
            if name.trim().is_empty() {
                return Err("Document name must not be empty".to_string());
            }
        }

        // Missing or unreadable inputs are not rejected here: they
        // aggregate to an empty summary.
        for path in &self.input {
            if path.is_dir() {
                return Err(format!("Input path is a directory: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: vec![PathBuf::from("minutes.json")],
            output: None,
            format: None,
            config: None,
            document: None,
            coalesce: false,
            excerpt: None,
            no_timeline: false,
            fail_on_empty: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_repeated_inputs() {
        let args = Args::parse_from([
            "minutes-aggregator",
            "-i",
            "a.json",
            "--input",
            "b.json",
            "--format",
            "json",
            "--coalesce",
        ]);

        assert_eq!(args.input, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert!(args.coalesce);
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_excerpt() {
        let mut args = make_args();
        args.excerpt = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_directory_input() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut args = make_args();
        args.input = vec![temp_dir.path().to_path_buf()];
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
