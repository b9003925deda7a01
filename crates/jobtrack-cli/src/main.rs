//! jobtrack - folder-based job application tracker.
//!
//! Exposes the core operations as subcommands: `init`, `transition`,
//! `sync`, `health-check`, `validate`, `organize`. Exits non-zero when a
//! run surfaces critical issues.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobtrack::state::ApplicationState;
use jobtrack::storage::init_layout;
use jobtrack::{
    default_config_path, load_config, locate_record, Config, HealthChecker, LocationResolver,
    RecordParser, RecordValidator, StagingOrganizer, SyncEngine, TrackerPaths, TransitionExecutor,
};

#[derive(Parser, Debug)]
#[command(name = "jobtrack")]
#[command(about = "Folder-based job application tracking and triage")]
#[command(version)]
struct Cli {
    /// Tracker root directory (holds applications/, staging/, insights/)
    #[arg(short, long, default_value = ".", env = "JOBTRACK_ROOT", global = true)]
    root: PathBuf,

    /// Config file path (default: <root>/tracker.json when present)
    #[arg(short, long, env = "JOBTRACK_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the pipeline folder skeleton (idempotent)
    Init,
    /// Advance a record to a new lifecycle state
    Transition {
        /// Record id (the record folder name)
        record_id: String,
        /// Target state, e.g. applied, interview-invited, withdrawn
        state: String,
        /// Note for the timeline entry
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Rescan all records and regenerate the derived views
    Sync,
    /// Run all health checks and write the health report
    HealthCheck,
    /// Check every record folder for required files and a parsable status
    Validate {
        /// Scaffold a drafting status.md for folders that lack one
        #[arg(long)]
        create_missing: bool,
    },
    /// Move scored postings from the discovery buckets into tier folders
    Organize {
        /// Compute and report moves without touching the filesystem
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let paths = TrackerPaths::new(&cli.root, &config);
    let now = Local::now().naive_local();

    match cli.command {
        Command::Init => {
            let created = init_layout(&paths)?;
            if created.is_empty() {
                println!("Pipeline structure already in place at {}", paths.root.display());
            } else {
                println!("Created {} folders under {}", created.len(), paths.root.display());
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Transition {
            record_id,
            state,
            note,
        } => {
            let to_state: ApplicationState = state
                .parse()
                .with_context(|| format!("'{state}' is not a known state"))?;

            let folder = locate_record(&paths.applications_root, &record_id)
                .with_context(|| format!("No record folder named '{record_id}' found"))?;
            let record = RecordParser::new()
                .parse_file(&folder.join("status.md"))?
                .into_record(folder)?;

            let executor =
                TransitionExecutor::new(LocationResolver::new(&paths.applications_root));
            let outcome = executor.apply(record, to_state, note.as_deref(), now)?;

            for warning in &outcome.warnings {
                println!("Warning: {warning}");
            }
            if outcome.changed {
                println!("{record_id}: now '{}'", outcome.record.state);
                if let Some((from, to)) = &outcome.moved {
                    println!("Moved {} -> {}", from.display(), to.display());
                }
            } else {
                println!("{record_id}: already '{}', nothing to do", outcome.record.state);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Sync => {
            let engine = SyncEngine::new(paths, config);
            let summary = engine.sync(now)?;

            println!("Synced {} records", summary.total);
            println!("  High priority: {}", summary.high_priority);
            match summary.average_fit {
                Some(avg) => println!("  Average fit score: {avg}/10"),
                None => println!("  Average fit score: N/A"),
            }
            println!("  {}", summary.status_view.display());
            println!("  {}", summary.metrics_view.display());
            for (folder, reason) in &summary.corrupted {
                println!("Warning: skipped {}: {reason}", folder.display());
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::HealthCheck => {
            let checker = HealthChecker::new(paths, config);
            let report = checker.run(now)?;
            let saved = checker.save(&report, now)?;

            let (score, label) = report.score();
            println!("Health score: {score}/100 ({label})");
            println!("  Critical issues: {}", report.issues.len());
            println!("  Warnings: {}", report.warnings.len());
            println!("Report saved to {}", saved.display());

            if report.is_healthy() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }

        Command::Validate { create_missing } => {
            let validator = RecordValidator::new(paths.applications_root);
            let summary = validator.validate(create_missing, now)?;

            println!(
                "Checked {} record folders: {} passed, {} warned, {} failed",
                summary.checked(),
                summary.passed,
                summary.warned.len(),
                summary.failed.len()
            );
            for id in &summary.created {
                println!("  Created status.md for {id}");
            }
            for (id, detail) in &summary.warned {
                println!("  Warning: {id}: {detail}");
            }
            for (id, reason) in &summary.failed {
                println!("  Failed: {id}: {reason}");
            }

            if summary.has_failures() {
                Ok(ExitCode::from(1))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }

        Command::Organize { dry_run } => {
            let organizer = StagingOrganizer::new(&paths.staging_root, config.tiers.discovery);
            let outcome = organizer.organize(dry_run)?;

            let prefix = if dry_run { "[dry-run] " } else { "" };
            println!(
                "{prefix}tier1-apply-now: {}",
                outcome.moved_to("tier1-apply-now")
            );
            println!("{prefix}tier2-research: {}", outcome.moved_to("tier2-research"));
            println!("{prefix}tier3-maybe: {}", outcome.moved_to("tier3-maybe"));
            println!("{prefix}archive/low-fit: {}", outcome.moved_to("low-fit"));
            if !outcome.unscored.is_empty() {
                println!("Unscored (left in place): {}", outcome.unscored.len());
                for path in &outcome.unscored {
                    println!("  {}", path.display());
                }
            }
            for path in &outcome.conflicts {
                println!("Conflict, skipped: {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| default_config_path(&cli.root));
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Ok(load_config(&path)?)
        }
        None => Ok(Config::default()),
    }
}

fn init_tracing() -> Result<()> {
    tracing_log::LogTracer::init().context("Failed to install log bridge")?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobtrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .context("Failed to initialize tracing subscriber")?;
    Ok(())
}
