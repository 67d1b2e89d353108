//! Change-driven recomputation
//!
//! The storage layer signals that something changed through
//! [`ChangeListener::on_change`]. A [`Recomputer`] reacts by reloading the
//! current snapshot from its [`SnapshotSource`] and rerunning the engine.
//!
//! Notifications may be redundant or arrive out of order:
//! - a snapshot whose fingerprint matches the last one is not recomputed
//! - a snapshot older than the one already held is ignored

use crate::engine::{Engine, EngineReport};
use crate::error::Result;
use crate::finance::BillingPeriod;
use crate::snapshot::SnapshotSource;

/// Receives change signals from the storage layer.
pub trait ChangeListener {
    /// Called after the stored records changed.
    fn on_change(&mut self, snapshot_version: u64);
}

/// What a refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// A new report was produced
    Recomputed { snapshot_version: u64 },
    /// The snapshot content is the one already reported
    Unchanged,
    /// The source returned a snapshot older than the held report
    Stale { held: u64, offered: u64 },
}

/// Keeps the latest [`EngineReport`] for a snapshot source.
pub struct Recomputer<S> {
    source: S,
    engine: Engine,
    period: BillingPeriod,
    latest: Option<EngineReport>,
    fingerprint: Option<String>,
}

impl<S: SnapshotSource> Recomputer<S> {
    pub fn new(source: S, engine: Engine, period: BillingPeriod) -> Self {
        Self {
            source,
            engine,
            period,
            latest: None,
            fingerprint: None,
        }
    }

    /// Reload the snapshot and recompute if its content changed.
    pub fn refresh(&mut self) -> Result<RecomputeOutcome> {
        let loaded = self.source.load()?;

        if self.fingerprint.as_deref() == Some(loaded.fingerprint.as_str()) {
            tracing::debug!(source = %self.source.describe(), "Snapshot unchanged");
            return Ok(RecomputeOutcome::Unchanged);
        }

        if let Some(held) = self.held_version() {
            if loaded.snapshot.version < held {
                tracing::warn!(
                    source = %self.source.describe(),
                    held,
                    offered = loaded.snapshot.version,
                    "Ignoring snapshot older than current report"
                );
                return Ok(RecomputeOutcome::Stale {
                    held,
                    offered: loaded.snapshot.version,
                });
            }
        }

        let report = self.engine.recompute(&loaded.snapshot, &self.period);
        let snapshot_version = report.snapshot_version;
        self.latest = Some(report);
        self.fingerprint = Some(loaded.fingerprint);

        Ok(RecomputeOutcome::Recomputed { snapshot_version })
    }

    /// Switch billing period; the next refresh recomputes unconditionally.
    pub fn set_period(&mut self, period: BillingPeriod) {
        if period != self.period {
            self.period = period;
            self.fingerprint = None;
        }
    }

    pub fn period(&self) -> &BillingPeriod {
        &self.period
    }

    /// The most recent report, if any refresh succeeded.
    pub fn latest(&self) -> Option<&EngineReport> {
        self.latest.as_ref()
    }

    pub fn held_version(&self) -> Option<u64> {
        self.latest.as_ref().map(|r| r.snapshot_version)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: SnapshotSource> ChangeListener for Recomputer<S> {
    fn on_change(&mut self, snapshot_version: u64) {
        if let Some(held) = self.held_version() {
            if snapshot_version < held {
                tracing::debug!(snapshot_version, held, "Ignoring out-of-order change signal");
                return;
            }
        }

        match self.refresh() {
            Ok(outcome) => tracing::debug!(snapshot_version, ?outcome, "Handled change signal"),
            Err(e) => tracing::warn!(
                snapshot_version,
                source = %self.source.describe(),
                error = %e,
                "Recompute failed, keeping previous report"
            ),
        }
    }
}
