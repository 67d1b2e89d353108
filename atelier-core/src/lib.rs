//! # atelier-core
//!
//! Core library for atelier - item tracking and cost reconciliation for a
//! design production agency.
//!
//! This library provides:
//! - Parsing of project specifications into billable work items
//! - Item pricing
//! - Reconciliation of deliveries against items and status derivation
//! - Per-client cost, margin and team earnings aggregation
//! - Change-driven recomputation over storage snapshots
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through two layers:
//! - **Records:** Projects, deliveries, decisions, clients, team and
//!   production units, supplied as a [`Snapshot`] (never mutated here)
//! - **Derived:** Items, statuses, summaries, costs and earnings, recomputed
//!   wholesale from each snapshot
//!
//! ## Example
//!
//! ```rust,no_run
//! use atelier_core::finance::BillingPeriod;
//! use atelier_core::{Config, Engine, JsonFileSource, SnapshotSource};
//!
//! let config = Config::load().expect("failed to load config");
//! let engine = Engine::new(&config);
//!
//! let loaded = JsonFileSource::new("snapshot.json").load().expect("failed to load snapshot");
//! let report = engine.recompute(&loaded.snapshot, &BillingPeriod::current_month());
//! println!("{} projects, {} anomalies", report.projects.len(), report.quality.total());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use engine::{Engine, EngineReport, ProjectReport, TrackedItem, UnassignedDelivery};
pub use error::{Error, Result};
pub use items::{parse_specification, ItemType, ParsedSpecification, PriceList, WorkItemSpec};
pub use quality::DataQualityReport;
pub use recompute::{ChangeListener, RecomputeOutcome, Recomputer};
pub use snapshot::{JsonFileSource, LoadedSnapshot, MemorySource, Snapshot, SnapshotSource};
pub use tracking::ItemStatus;
pub use types::*;

// Public modules
pub mod config;
pub mod engine;
pub mod error;
pub mod finance;
pub mod format;
pub mod items;
pub mod logging;
pub mod quality;
pub mod recompute;
pub mod snapshot;
pub mod tracking;
pub mod types;
