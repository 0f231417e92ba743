//! driftwatch CLI entry point

use clap::{Parser, Subcommand};
use driftwatch::{
    commands::{
        cmd_alerts, cmd_detect, cmd_history, cmd_init, cmd_run, cmd_status, cmd_summarize,
        print_alert_report, print_detect_stats, print_history, print_init, print_summary,
    },
    config::Config,
    error::Result,
    report::FsReportRepository,
    summary::SummaryStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "driftwatch")]
#[command(version, about = "Semantic and concept drift monitoring over embedding snapshots", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize driftwatch configuration and directory layout
    Init {
        /// Base directory (defaults to the platform data dir)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Compute semantic and concept drift over all consecutive snapshot pairs
    Detect {
        /// Snapshot root directory (overrides config)
        #[arg(long)]
        snapshots: Option<PathBuf>,
    },

    /// Aggregate drift reports into the dated summary
    Summarize,

    /// Evaluate alert thresholds against the latest summary
    Alerts,

    /// Run the full pipeline: detect, summarize, alerts
    Run {
        /// Snapshot root directory (overrides config)
        #[arg(long)]
        snapshots: Option<PathBuf>,
    },

    /// Show the latest drift summary
    Status,

    /// Show one topic's drift trend across summaries
    History {
        /// Topic name (underscores accepted in place of spaces)
        topic: String,

        /// Only the most recent N summaries
        #[arg(long)]
        last: Option<usize>,
    },
}

fn main() {
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle init specially (doesn't need existing config)
    if let Commands::Init { base_dir, force } = &cli.command {
        let config = cmd_init(base_dir.clone(), *force)?;
        print_init(&config);
        return Ok(());
    }

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };

    // Initialize stores
    let repo = FsReportRepository::new(&config.paths.reports_dir);
    let store = SummaryStore::new(&config.paths.summaries_dir);

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Detect { snapshots } => {
            let root = snapshots.unwrap_or_else(|| config.paths.snapshots_dir.clone());
            let stats = cmd_detect(&config, &repo, &root)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_detect_stats(&stats);
            }
        }

        Commands::Summarize => {
            let summary = cmd_summarize(&repo, &store)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Alerts => {
            let report = cmd_alerts(&config.alerts, &store)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_alert_report(&report);
            }
        }

        Commands::Run { snapshots } => {
            let root = snapshots.unwrap_or_else(|| config.paths.snapshots_dir.clone());
            let outcome = cmd_run(&config, &repo, &store, &root)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                if let Some(stats) = &outcome.detect {
                    print_detect_stats(stats);
                }
                if let Some(summary) = &outcome.summary {
                    print_summary(summary);
                }
                print_alert_report(&outcome.alerts);
            }
        }

        Commands::Status => {
            let summary = cmd_status(&store)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::History { topic, last } => {
            let points = cmd_history(&store, &topic, last)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                print_history(&topic, &points);
            }
        }
    }

    Ok(())
}
