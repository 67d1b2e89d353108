//! Recompute engine
//!
//! Runs the whole pipeline over one snapshot:
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────────┐
//! │ specification│──►│   items    │──►│ reconcile  │──►│    status    │
//! │    parser    │   │  + prices  │   │ deliveries │   │  derivation  │
//! └──────────────┘   └────────────┘   └────────────┘   └──────┬───────┘
//!                                                             │ approved items
//!                                                             ▼
//!                                                   ┌──────────────────┐
//!                                                   │    financial     │
//!                                                   │    aggregator    │
//!                                                   └──────────────────┘
//! ```
//!
//! The engine holds configuration only. Every report is a pure function of
//! `(snapshot, period)`, so recomputing the same snapshot twice produces
//! identical output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atelier_core::{Config, Engine};
//! use atelier_core::finance::BillingPeriod;
//!
//! let engine = Engine::new(&config);
//! let report = engine.recompute(&snapshot, &BillingPeriod::current_month());
//! for project in &report.projects {
//!     println!("{}: {}/{}", project.name, project.summary.completed_items, project.summary.total_items);
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{Config, FinanceConfig};
use crate::finance::{
    ApprovedItem, BillingPeriod, ClientCostBreakdown, FinanceInput, FinancialAggregator,
    TeamMemberEarnings,
};
use crate::items::{ParseOutcome, ParsedSpecification, PriceList, SpecificationParser, WorkItemKind};
use crate::quality::DataQualityReport;
use crate::snapshot::Snapshot;
use crate::tracking::{
    derive_item_states, reconcile, DecisionIndex, ItemStatus, OrphanReason, ProjectSummary,
};
use crate::types::{DeliverySubmission, Project};

/// One item of a project with its derived status and price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedItem {
    pub label: String,
    pub kind: WorkItemKind,
    pub sequence_index: u32,
    pub status: ItemStatus,
    pub price: f64,
    pub current_delivery_id: Option<String>,
    pub delivery_count: usize,
    /// Set when the current delivery is approved
    pub approved_at: Option<DateTime<Utc>>,
}

/// A delivery of the project that is attached to no item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnassignedDelivery {
    pub delivery_id: String,
    pub label: Option<String>,
    pub reason: OrphanReason,
    pub submitted_at: DateTime<Utc>,
}

/// Tracking view of one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReport {
    pub project_id: String,
    pub client_id: String,
    pub name: String,
    pub designer_id: Option<String>,
    /// Canonical item order
    pub items: Vec<TrackedItem>,
    pub summary: ProjectSummary,
    /// Price of every item in the specification
    pub total_price: f64,
    /// Price of the approved items only
    pub approved_value: f64,
    /// Specification prose following the item prefix
    pub residual_text: String,
    pub spec_outcome: ParseOutcome,
    /// Ordered by submission
    pub unassigned: Vec<UnassignedDelivery>,
}

impl ProjectReport {
    pub fn item(&self, label: &str) -> Option<&TrackedItem> {
        self.items.iter().find(|item| item.label == label)
    }

    pub fn status_of(&self, label: &str) -> Option<ItemStatus> {
        self.item(label).map(|item| item.status)
    }

    /// Item counts per status, in lifecycle order.
    pub fn status_counts(&self) -> [(ItemStatus, usize); 4] {
        [
            ItemStatus::Pending,
            ItemStatus::Delivered,
            ItemStatus::RevisionRequested,
            ItemStatus::Approved,
        ]
        .map(|status| {
            (
                status,
                self.items.iter().filter(|item| item.status == status).count(),
            )
        })
    }
}

/// Everything derived from one snapshot for one billing period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineReport {
    pub snapshot_version: u64,
    pub period: BillingPeriod,
    /// Ordered by project id
    pub projects: Vec<ProjectReport>,
    /// Ordered by client id
    pub clients: Vec<ClientCostBreakdown>,
    /// Ordered by member id
    pub team: Vec<TeamMemberEarnings>,
    pub quality: DataQualityReport,
}

impl EngineReport {
    pub fn project(&self, project_id: &str) -> Option<&ProjectReport> {
        self.projects.iter().find(|p| p.project_id == project_id)
    }

    pub fn client(&self, client_id: &str) -> Option<&ClientCostBreakdown> {
        self.clients.iter().find(|c| c.client_id == client_id)
    }

    pub fn member(&self, member_id: &str) -> Option<&TeamMemberEarnings> {
        self.team.iter().find(|m| m.member_id == member_id)
    }

    pub fn total_contract_value(&self) -> f64 {
        self.clients.iter().map(|c| c.contract_value).sum()
    }

    pub fn total_effective_cost(&self) -> f64 {
        self.clients.iter().map(|c| c.effective_cost).sum()
    }

    pub fn total_net_profit(&self) -> f64 {
        self.clients.iter().map(|c| c.net_profit).sum()
    }
}

/// Stateless pipeline configured from [`Config`].
#[derive(Debug, Clone)]
pub struct Engine {
    parser: SpecificationParser,
    prices: PriceList,
    finance: FinanceConfig,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Self {
            parser: SpecificationParser::new(config.pricing.max_items_per_type),
            prices: PriceList::from_config(&config.pricing),
            finance: config.finance.clone(),
        }
    }

    pub fn price_list(&self) -> &PriceList {
        &self.prices
    }

    /// Parse a specification with this engine's limits.
    pub fn parse(&self, specification: &str) -> ParsedSpecification {
        self.parser.parse(specification)
    }

    /// Derive the tracking view of one project from its deliveries.
    ///
    /// `deliveries` may include submissions for other projects; they are
    /// ignored.
    pub fn track_project<'a>(
        &self,
        project: &Project,
        deliveries: &[&'a DeliverySubmission],
        decisions: &DecisionIndex<'a>,
    ) -> ProjectReport {
        let parsed = self.parse(&project.specification);
        let reconciliation = reconcile(
            &parsed.items,
            deliveries
                .iter()
                .copied()
                .filter(|d| d.project_id == project.id),
        );
        let states = derive_item_states(&parsed.items, &reconciliation, decisions);
        let summary = ProjectSummary::from_states(&states, project.recorded_completed);

        let items: Vec<TrackedItem> = states
            .iter()
            .map(|state| TrackedItem {
                label: state.item.label.clone(),
                kind: state.item.kind,
                sequence_index: state.item.sequence_index,
                status: state.status,
                price: self.prices.price(state.item),
                current_delivery_id: state.current_delivery.map(|d| d.id.clone()),
                delivery_count: state.delivery_count,
                approved_at: state.approved_at(),
            })
            .collect();

        let unassigned = reconciliation
            .orphans
            .iter()
            .map(|orphan| UnassignedDelivery {
                delivery_id: orphan.delivery.id.clone(),
                label: orphan.label.map(str::to_string),
                reason: orphan.reason,
                submitted_at: orphan.delivery.submitted_at,
            })
            .collect();

        if let ParseOutcome::Malformed { reason } = &parsed.outcome {
            tracing::debug!(project_id = %project.id, reason = %reason, "Malformed specification");
        }

        ProjectReport {
            project_id: project.id.clone(),
            client_id: project.client_id.clone(),
            name: project.display_name().to_string(),
            designer_id: project.designer_id.clone(),
            total_price: self.prices.total(&parsed.items),
            approved_value: items
                .iter()
                .filter(|item| item.status == ItemStatus::Approved)
                .map(|item| item.price)
                .sum(),
            items,
            summary,
            residual_text: parsed.residual,
            spec_outcome: parsed.outcome,
            unassigned,
        }
    }

    /// Run the whole pipeline over a snapshot.
    pub fn recompute(&self, snapshot: &Snapshot, period: &BillingPeriod) -> EngineReport {
        let start = Instant::now();
        let mut quality = DataQualityReport::default();

        let project_ids: HashSet<&str> = snapshot.projects.iter().map(|p| p.id.as_str()).collect();
        let client_ids: HashSet<&str> = snapshot.clients.iter().map(|c| c.id.as_str()).collect();
        let delivery_ids: HashSet<&str> =
            snapshot.deliveries.iter().map(|d| d.id.as_str()).collect();

        let mut by_project: HashMap<&str, Vec<&DeliverySubmission>> = HashMap::new();
        for delivery in &snapshot.deliveries {
            if project_ids.contains(delivery.project_id.as_str()) {
                by_project
                    .entry(delivery.project_id.as_str())
                    .or_default()
                    .push(delivery);
            } else {
                quality.deliveries_for_unknown_projects += 1;
            }
        }

        quality.orphan_decisions = snapshot
            .decisions
            .iter()
            .filter(|record| !delivery_ids.contains(record.delivery_id.as_str()))
            .count();

        let decisions = DecisionIndex::new(&snapshot.decisions);
        let mut projects: Vec<ProjectReport> = snapshot
            .projects
            .par_iter()
            .map(|project| {
                let deliveries = by_project
                    .get(project.id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                self.track_project(project, deliveries, &decisions)
            })
            .collect();
        projects.sort_by(|a, b| a.project_id.cmp(&b.project_id));

        for project in &projects {
            if matches!(project.spec_outcome, ParseOutcome::Malformed { .. }) {
                quality.malformed_specifications += 1;
            }
            for orphan in &project.unassigned {
                match orphan.reason {
                    OrphanReason::Unlabeled => quality.unlabeled_deliveries += 1,
                    OrphanReason::UnknownLabel => quality.unknown_label_deliveries += 1,
                }
            }
            if let Some(drift) = project.summary.counter_drift() {
                tracing::debug!(project_id = %project.project_id, drift, "Completion counter drift");
                quality.counter_drift_projects += 1;
            }
            if !client_ids.contains(project.client_id.as_str()) {
                quality.projects_for_unknown_clients += 1;
            }
        }

        let approved_items: Vec<ApprovedItem<'_>> = projects
            .iter()
            .flat_map(|project| {
                project.items.iter().filter_map(move |item| {
                    let approved_at = item.approved_at?;
                    Some(ApprovedItem {
                        project_id: &project.project_id,
                        client_id: &project.client_id,
                        designer_id: project.designer_id.as_deref(),
                        label: &item.label,
                        price: item.price,
                        approved_at,
                    })
                })
            })
            .collect();

        let finance = FinancialAggregator::new(&self.finance).aggregate(
            FinanceInput {
                approved_items: &approved_items,
                clients: &snapshot.clients,
                team: &snapshot.team,
                production_units: &snapshot.production_units,
            },
            period,
        );
        quality.merge(&finance.quality);
        quality.log(snapshot.version);

        tracing::info!(
            snapshot_version = snapshot.version,
            period = %period.display_name(),
            projects = projects.len(),
            clients = finance.clients.len(),
            anomalies = quality.total(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recomputed snapshot"
        );

        EngineReport {
            snapshot_version: snapshot.version,
            period: *period,
            projects,
            clients: finance.clients,
            team: finance.team,
            quality,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
