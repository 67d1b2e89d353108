//! Watch mode: poll the snapshot and recompute on change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use atelier_core::finance::BillingPeriod;
use atelier_core::format::format_percent;
use atelier_core::snapshot::{JsonFileSource, SnapshotSource};
use atelier_core::{Engine, EngineReport, RecomputeOutcome, Recomputer};

/// Run until Ctrl+C, or until `max_polls` polls have run.
pub fn run(
    engine: Engine,
    source: JsonFileSource,
    period: BillingPeriod,
    poll_ms: u64,
    max_polls: Option<u64>,
) -> Result<()> {
    // Set up signal handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        eprintln!("\nShutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl+C handler")?;

    let poll_duration = Duration::from_millis(poll_ms);

    println!(
        "Watching {} for {} (poll every {}ms). Press Ctrl+C to stop.",
        source.describe(),
        period.display_name(),
        poll_ms
    );
    println!(
        "Logging to {} (rotated daily)",
        atelier_core::logging::log_file_path().display()
    );
    println!();

    let mut recomputer = Recomputer::new(source, engine, period);
    let mut iteration = 0u64;

    while running.load(Ordering::SeqCst) {
        iteration += 1;

        match recomputer.refresh() {
            Ok(RecomputeOutcome::Recomputed { snapshot_version }) => {
                if let Some(report) = recomputer.latest() {
                    print_summary(report);
                }
                tracing::info!(iteration, snapshot_version, "watch recompute");
            }
            Ok(RecomputeOutcome::Unchanged) => {}
            Ok(RecomputeOutcome::Stale { held, offered }) => {
                println!(
                    "[{}] Ignored snapshot v{} (showing v{})",
                    chrono::Local::now().format("%H:%M:%S"),
                    offered,
                    held
                );
            }
            Err(e) => {
                eprintln!("Failed to load snapshot: {}", e);
                tracing::warn!(iteration, error = %e, "watch refresh failed");
            }
        }

        if max_polls.is_some_and(|max| iteration >= max) {
            break;
        }

        // Sleep until next poll
        thread::sleep(poll_duration);
    }

    println!("Watch mode stopped.");
    tracing::info!("atelier watch mode stopped");

    Ok(())
}

fn print_summary(report: &EngineReport) {
    let timestamp = chrono::Local::now().format("%H:%M:%S");
    let (done, total) = report.projects.iter().fold((0, 0), |(done, total), p| {
        (done + p.summary.completed_items, total + p.summary.total_items)
    });
    let pct = if total == 0 {
        0.0
    } else {
        f64::from(done) / f64::from(total) * 100.0
    };

    println!(
        "[{}] Snapshot v{}: {} projects, {}/{} items approved ({}), {} clients, {} anomalies",
        timestamp,
        report.snapshot_version,
        report.projects.len(),
        done,
        total,
        format_percent(pct),
        report.clients.len(),
        report.quality.total()
    );
}
