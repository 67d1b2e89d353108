//! atelier - item tracking and cost reconciliation for design production
//!
//! Parses project specifications, reports item status and per-client costs
//! from a snapshot file, and keeps the report current while the snapshot
//! changes.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/atelier/atelier.log (~/.local/state/atelier/atelier.log)
//! - Config: $XDG_CONFIG_HOME/atelier/config.toml (~/.config/atelier/config.toml)

mod render;
mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use atelier_core::finance::BillingPeriod;
use atelier_core::snapshot::{JsonFileSource, SnapshotSource};
use atelier_core::{Config, Engine};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Track design items and reconcile production costs")]
#[command(version)]
struct Args {
    /// Config file (defaults to $XDG_CONFIG_HOME/atelier/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a specification and price its items
    Items {
        /// Specification text, e.g. "[2x Post + 1x Carrousel 4p] launch"
        text: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Report item status, client costs and team earnings for a snapshot
    Report {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Billing month as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Export format instead of the terminal report
        #[arg(short, long, value_enum)]
        export: Option<ExportFormat>,
    },

    /// Recompute the report whenever the snapshot file changes
    Watch {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Billing month as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        poll: u64,

        /// Stop after this many polls
        #[arg(long)]
        max_polls: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Md,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };

    let _log_guard =
        atelier_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let engine = Engine::new(&config);

    match args.command {
        Command::Items { text, json } => run_items(&engine, &text, json),
        Command::Report {
            snapshot,
            month,
            export,
        } => run_report(&engine, snapshot, month.as_deref(), export),
        Command::Watch {
            snapshot,
            month,
            poll,
            max_polls,
        } => {
            let period = resolve_period(month.as_deref())?;
            watch::run(engine, JsonFileSource::new(snapshot), period, poll, max_polls)
        }
    }
}

fn resolve_period(month: Option<&str>) -> Result<BillingPeriod> {
    match month {
        Some(month) => BillingPeriod::parse_month(month).context("invalid --month"),
        None => Ok(BillingPeriod::current_month()),
    }
}

fn run_items(engine: &Engine, text: &str, json: bool) -> Result<()> {
    let parsed = engine.parse(text);
    tracing::info!(items = parsed.items.len(), "Parsed specification");

    if json {
        let value = render::items_json(&parsed, engine.price_list());
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("failed to serialize items")?
        );
    } else {
        render::print_items(&parsed, engine.price_list());
    }
    Ok(())
}

fn run_report(
    engine: &Engine,
    snapshot: PathBuf,
    month: Option<&str>,
    export: Option<ExportFormat>,
) -> Result<()> {
    let period = resolve_period(month)?;
    let source = JsonFileSource::new(snapshot);
    let loaded = source
        .load()
        .with_context(|| format!("failed to load snapshot {}", source.describe()))?;

    let report = engine.recompute(&loaded.snapshot, &period);

    match export {
        Some(ExportFormat::Json) => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        ),
        Some(ExportFormat::Md) => print!("{}", render::report_markdown(&report)),
        None => render::print_report(&report),
    }

    tracing::info!(
        snapshot_version = report.snapshot_version,
        projects = report.projects.len(),
        "Report complete"
    );
    Ok(())
}
