//! Minutes Aggregator - cross-document statistics for meeting minutes
//!
//! A CLI tool that folds the per-document analyses of meeting minutes
//! into one summary and one global speaker graph, then writes a
//! Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, unknown document, write failure, etc.)
//!   2 - No document aggregated and --fail-on-empty set

mod cli;
mod config;
mod report;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use minutes_aggregator::loader;
use minutes_aggregator::models::DocumentRecord;
use minutes_aggregator::Aggregator;
use report::{Report, ReportMetadata};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Documents and partial aggregation of one input file.
struct LoadedInput {
    path: PathBuf,
    documents: Vec<DocumentRecord>,
    partial: Aggregator,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("minutes-aggregator v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .minutes-aggregator.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set inputs, output, excerpt size and timeline options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete aggregation. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let paths = config.input.paths.clone();
    if paths.is_empty() {
        bail!("No input file given. Pass --input or set [input].paths in {}", CONFIG_FILE);
    }

    if !args.quiet {
        println!("📥 Loading {} input file(s)...", paths.len());
    }
    let inputs = aggregate_inputs(paths, !args.quiet).await?;

    // Merge partial results in input order so global indices follow the
    // order the files were given in.
    let mut aggregator = Aggregator::new();
    let mut documents = Vec::new();
    for input in inputs {
        debug!(
            "{}: {} documents",
            input.path.display(),
            input.partial.document_count()
        );
        aggregator.merge(input.partial);
        documents.extend(input.documents);
    }

    let summary = aggregator.finish();
    let duration = start_time.elapsed().as_secs_f64();
    info!(
        "Aggregated {} documents in {:.2}s",
        summary.document_count, duration
    );

    if summary.is_empty() {
        warn!("No document could be aggregated");
    }

    let output = if let Some(ref name) = args.document {
        let Some(document) = report::find_document(&documents, name) else {
            bail!("No document named '{}' in the inputs", name);
        };
        match config.report.format {
            OutputFormat::Json => report::generate_document_json(document, &config.report)?,
            OutputFormat::Markdown => report::generate_document_markdown(document, &config.report),
        }
    } else {
        let metadata = ReportMetadata {
            inputs: config
                .input
                .paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            generated_at: Utc::now(),
            duration_seconds: duration,
        };
        let format = config.report.format;
        let report = Report::new(metadata, summary.clone(), config.report.clone());

        match format {
            OutputFormat::Json => report::generate_json_report(&report)?,
            OutputFormat::Markdown => report::generate_markdown_report(&report),
        }
    };

    let output_path = &config.general.output;
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !args.quiet {
        println!("\n📊 Aggregation Summary:");
        println!("   Documents: {}", summary.document_count);
        println!(
            "   Decisions: {} | Decision graphs: {} | Votes: {}",
            summary.decision_count, summary.decision_graph_count, summary.vote_count
        );
        println!(
            "   Timeline points: {} | Speakers: {}",
            summary.timeline_point_count,
            summary.global_graph.all_speakers.len()
        );
        println!("   Duration: {:.2}s", duration);
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    if args.fail_on_empty && summary.is_empty() {
        eprintln!("\n⛔ No document was aggregated. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Load and fold every input file on its own blocking task.
///
/// Results come back in the order of `paths`.
async fn aggregate_inputs(paths: Vec<PathBuf>, show_progress: bool) -> Result<Vec<LoadedInput>> {
    let progress = if show_progress {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let tasks = paths.into_iter().map(|path| {
        let progress = progress.clone();
        tokio::task::spawn_blocking(move || {
            let documents = loader::load(&path);
            progress.inc_length(documents.len() as u64);

            let mut partial = Aggregator::new();
            for document in &documents {
                partial.fold(document);
                progress.inc(1);
            }

            LoadedInput {
                path,
                documents,
                partial,
            }
        })
    });

    let results = join_all(tasks).await;
    progress.finish_and_clear();

    results
        .into_iter()
        .map(|result| result.context("Aggregation task failed"))
        .collect()
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
