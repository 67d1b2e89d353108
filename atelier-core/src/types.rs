//! Core domain records for atelier
//!
//! These are the records supplied by the storage layer. The engine never
//! mutates them; every derived view (item status, summaries, costs) is
//! recomputed from a snapshot of these records.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Project** | A design order for one client, described by free-text specification |
//! | **Item** | One billable unit of design work derived from the specification |
//! | **Label** | Short identifier ("Post 2") linking a delivery to its item |
//! | **Delivery** | A file or link submitted for an item; the latest one per label is current |
//! | **Decision** | A reviewer's verdict on one delivery |
//! | **Production unit** | A completed video, billed at its operator's rate |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracking::label_from_notes;

// ============================================
// Projects and deliveries
// ============================================

/// A design project owned by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Client this project is billed to
    pub client_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Designer credited with the project's approved items
    #[serde(default)]
    pub designer_id: Option<String>,
    /// Free-text specification, e.g. `"[2x Post + 1x Carrousel 4p] spring campaign"`
    #[serde(default)]
    pub specification: String,
    /// Completion counter maintained independently by the storage layer
    ///
    /// Only echoed and compared against the derived count.
    #[serde(default)]
    pub recorded_completed: Option<u32>,
}

impl Project {
    /// Name for display, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// What a delivery carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Uploaded file, referenced by its storage path
    File { path: String },
    /// External link (drive folder, design tool share)
    Link { url: String },
}

/// One submission of work for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySubmission {
    pub id: String,
    pub project_id: String,
    /// Explicit label; when absent it is read from the `[label]` annotation in `notes`
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub submitted_at: DateTime<Utc>,
    pub payload: Payload,
}

impl DeliverySubmission {
    /// The item label this delivery references, if any.
    pub fn resolved_label(&self) -> Option<&str> {
        match self.label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => Some(label),
            _ => label_from_notes(&self.notes),
        }
    }
}

/// A reviewer's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    RevisionRequested,
}

impl Decision {
    /// Rank used to settle decisions taken at the same instant. A revision
    /// request outranks an approval.
    pub fn precedence(&self) -> u8 {
        match self {
            Decision::Approved => 0,
            Decision::RevisionRequested => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::RevisionRequested => "revision_requested",
        }
    }
}

/// A decision taken on one delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub delivery_id: String,
    pub decision: Decision,
    pub reviewed_at: DateTime<Utc>,
}

// ============================================
// Clients and contracts
// ============================================

/// Monthly production quota committed in a contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    #[serde(default)]
    pub videos: u32,
    #[serde(default)]
    pub posts: u32,
    #[serde(default)]
    pub miniatures: u32,
    #[serde(default)]
    pub logos: u32,
    #[serde(default)]
    pub thumbnails: u32,
}

/// The commercial terms with a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contract {
    /// Amount billed to the client per month
    #[serde(default)]
    pub monthly_value: f64,
    #[serde(default)]
    pub quota: Quota,
}

/// An agency client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contract: Option<Contract>,
    /// Team members currently writing for this client
    #[serde(default)]
    pub copywriter_ids: Vec<String>,
}

// ============================================
// Team
// ============================================

/// What a team member is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Designer,
    VideoEditor,
    Copywriter,
}

impl TeamRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            TeamRole::Designer => "Designer",
            TeamRole::VideoEditor => "Video editor",
            TeamRole::Copywriter => "Copywriter",
        }
    }
}

/// A member of the production team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: TeamRole,
    /// Rate per completed production unit (video editors)
    #[serde(default)]
    pub unit_rate: Option<f64>,
    /// Flat monthly rate shared across assigned clients (copywriters)
    #[serde(default)]
    pub monthly_rate: Option<f64>,
}

/// A video production record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionUnit {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Team member who produced the unit
    #[serde(default)]
    pub operator_id: Option<String>,
    /// None while the unit is still in production
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}
