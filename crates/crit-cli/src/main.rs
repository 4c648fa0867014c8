//! crit - multi-reviewer change-set analysis CLI
//!
//! ## Commands
//!
//! - `review`: run the five reviewers over a change set and print the aggregated report
//! - `aggregate`: re-aggregate a saved pipeline result

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use crit_core::{
    aggregate, default_reviewers, render_review_md, run_pipeline, AggregatedResult, ChangeDelta,
    ChangeSet, FixtureProvider, PipelineMode, PipelineResult, ReviewConfig,
};

/// Exit status for an escalated review under `--fail-on-escalation`.
const ESCALATION_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "crit")]
#[command(author = "Stevedores Org")]
#[command(version = crit_core::VERSION)]
#[command(about = "Multi-reviewer change-set analysis", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a change set with the built-in reviewers
    Review {
        /// Change set file (JSON array of changed files)
        #[arg(short, long)]
        changes: PathBuf,

        /// Recorded model replies (JSON object keyed by reviewer name)
        #[arg(short, long)]
        replies: PathBuf,

        /// Scheduling mode: sequential or parallel (overrides PIPELINE_MODE)
        #[arg(short, long, value_parser = parse_mode)]
        mode: Option<PipelineMode>,

        /// Dedup similarity threshold in [0, 1] (overrides DEDUP_THRESHOLD)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Stop a sequential run after the first critical finding
        #[arg(long)]
        stop_on_critical: bool,

        /// Per-task deadline in seconds (overrides TASK_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Shared context file handed to every reviewer
        #[arg(long)]
        context: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Md)]
        format: Format,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Exit with status 2 when the review escalates
        #[arg(long)]
        fail_on_escalation: bool,
    },

    /// Re-aggregate a saved pipeline result
    Aggregate {
        /// Pipeline result file (JSON)
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Change set used for grounding (grounding is skipped if omitted)
        #[arg(short, long)]
        changes: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Md)]
        format: Format,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Exit with status 2 when the review escalates
        #[arg(long)]
        fail_on_escalation: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Md,
    Json,
}

fn parse_mode(raw: &str) -> std::result::Result<PipelineMode, String> {
    raw.parse().map_err(|e: crit_core::ReviewError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    crit_core::init_tracing(cli.json, level);

    let (report, fail_on_escalation) = match cli.command {
        Commands::Review {
            changes,
            replies,
            mode,
            threshold,
            stop_on_critical,
            timeout_secs,
            context,
            format,
            out,
            fail_on_escalation,
        } => {
            let mut config = ReviewConfig::from_env().context("Invalid review configuration")?;
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if let Some(threshold) = threshold {
                config.dedup_threshold = threshold;
            }
            if stop_on_critical {
                config.stop_on_critical = true;
            }
            if let Some(secs) = timeout_secs {
                config.task_timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
            config.verbose |= cli.verbose;
            config.validate().context("Invalid review configuration")?;

            let report = cmd_review(&changes, &replies, context.as_deref(), &config).await?;
            emit(&report, format, out.as_deref())?;
            (report, fail_on_escalation)
        }
        Commands::Aggregate {
            pipeline,
            changes,
            format,
            out,
            fail_on_escalation,
        } => {
            let mut config = ReviewConfig::from_env().context("Invalid review configuration")?;
            config.verbose |= cli.verbose;

            let report = cmd_aggregate(&pipeline, changes.as_deref(), &config)?;
            emit(&report, format, out.as_deref())?;
            (report, fail_on_escalation)
        }
    };

    if fail_on_escalation && report.should_escalate {
        return Ok(ExitCode::from(ESCALATION_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_review(
    changes: &Path,
    replies: &Path,
    context: Option<&Path>,
    config: &ReviewConfig,
) -> Result<AggregatedResult> {
    let change_set = load_change_set(changes)?;
    let raw = std::fs::read_to_string(replies)
        .with_context(|| format!("Failed to read replies {:?}", replies))?;
    let provider = FixtureProvider::from_json(&raw)
        .with_context(|| format!("Failed to parse replies {:?}", replies))?;
    let context = match context {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context {:?}", path))?,
        None => String::new(),
    };

    info!(
        files = change_set.files.len(),
        replies = provider.len(),
        mode = %config.mode,
        "Starting review"
    );

    let delta = ChangeDelta::from_change_set(&change_set);
    let tasks = default_reviewers(Arc::new(provider));
    let result = run_pipeline(&tasks, &change_set, &context, &delta, config).await;
    Ok(aggregate(&result, Some(&change_set), config))
}

fn cmd_aggregate(
    pipeline: &Path,
    changes: Option<&Path>,
    config: &ReviewConfig,
) -> Result<AggregatedResult> {
    let raw = std::fs::read_to_string(pipeline)
        .with_context(|| format!("Failed to read pipeline result {:?}", pipeline))?;
    let result: PipelineResult = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse pipeline result {:?}", pipeline))?;
    let change_set = changes.map(load_change_set).transpose()?;
    Ok(aggregate(&result, change_set.as_ref(), config))
}

fn load_change_set(path: &Path) -> Result<ChangeSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read change set {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse change set {:?}", path))
}

fn emit(report: &AggregatedResult, format: Format, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            match format {
                Format::Md => crit_core::write_review_md(path, report),
                Format::Json => crit_core::write_review_json(path, report),
            }
            .with_context(|| format!("Failed to write report {:?}", path))?;
            info!(path = %path.display(), "Report written");
        }
        None => {
            let body = match format {
                Format::Md => render_review_md(report),
                Format::Json => {
                    serde_json::to_string_pretty(report).context("Failed to serialize report")?
                }
            };
            println!("{}", body);
        }
    }
    Ok(())
}
