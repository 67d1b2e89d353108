//! Snapshots and the sources that provide them
//!
//! A [`Snapshot`] is a consistent view of every record the engine reads.
//! Storage stays outside the engine: a [`SnapshotSource`] hands over the
//! current snapshot together with a fingerprint of its contents so callers
//! can tell whether anything changed since the last load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{
    Client, DecisionRecord, DeliverySubmission, ProductionUnit, Project, TeamMember,
};

/// Every record the engine reads, at one version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonic version assigned by the storage layer
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub deliveries: Vec<DeliverySubmission>,
    #[serde(default)]
    pub decisions: Vec<DecisionRecord>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub production_units: Vec<ProductionUnit>,
}

impl Snapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
            && self.deliveries.is_empty()
            && self.decisions.is_empty()
            && self.clients.is_empty()
            && self.team.is_empty()
            && self.production_units.is_empty()
    }
}

/// Hex SHA-256 of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// A snapshot plus the fingerprint of the content it was built from.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub fingerprint: String,
}

/// Storage layer handing out the current snapshot.
pub trait SnapshotSource {
    /// Load the current snapshot.
    ///
    /// Equal fingerprints mean equal content.
    fn load(&self) -> Result<LoadedSnapshot>;

    /// Human-readable description for logging
    fn describe(&self) -> String;
}

/// In-process source, used by tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshot: Snapshot,
}

impl MemorySource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Replace the held snapshot.
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut Snapshot {
        &mut self.snapshot
    }
}

impl SnapshotSource for MemorySource {
    fn load(&self) -> Result<LoadedSnapshot> {
        let bytes = serde_json::to_vec(&self.snapshot)?;
        Ok(LoadedSnapshot {
            snapshot: self.snapshot.clone(),
            fingerprint: fingerprint(&bytes),
        })
    }

    fn describe(&self) -> String {
        format!("memory snapshot v{}", self.snapshot.version)
    }
}

/// Snapshot read from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for JsonFileSource {
    fn load(&self) -> Result<LoadedSnapshot> {
        let bytes = std::fs::read(&self.path)?;
        let snapshot = Snapshot::from_json(&bytes).map_err(|e| {
            Error::Snapshot(format!("failed to parse {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            version = snapshot.version,
            projects = snapshot.projects.len(),
            "Loaded snapshot file"
        );

        Ok(LoadedSnapshot {
            snapshot,
            fingerprint: fingerprint(&bytes),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
