//! Data-quality counters
//!
//! Nothing in the pipeline is fatal. Every anomaly degrades to a documented
//! default (no items, orphan delivery, zero cost, zero margin) and is counted
//! here so callers can monitor the health of the records they feed in.

use serde::Serialize;

/// Counts of anomalies observed during one recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQualityReport {
    /// Specifications with a bracketed prefix that could not be interpreted
    pub malformed_specifications: usize,
    /// Deliveries with no resolvable label
    pub unlabeled_deliveries: usize,
    /// Deliveries whose label matches no item of their project
    pub unknown_label_deliveries: usize,
    /// Deliveries referencing a project absent from the snapshot
    pub deliveries_for_unknown_projects: usize,
    /// Decisions referencing a delivery absent from the snapshot
    pub orphan_decisions: usize,
    /// Projects whose stored completion counter disagrees with item status
    pub counter_drift_projects: usize,
    /// Projects referencing a client absent from the snapshot
    pub projects_for_unknown_clients: usize,
    /// Production units or approved items billed to an unknown client
    pub records_for_unknown_clients: usize,
    /// Completed production units with no known operator
    pub units_without_operator: usize,
    /// Approved items with no known designer to credit
    pub items_without_designer: usize,
    /// Clients without a contract or with a zero contract value
    pub zero_value_contracts: usize,
    /// Flat-rate members with no client to allocate their rate to
    pub idle_flat_rate_members: usize,
}

impl DataQualityReport {
    /// Sum of all anomaly counts.
    pub fn total(&self) -> usize {
        self.malformed_specifications
            + self.unlabeled_deliveries
            + self.unknown_label_deliveries
            + self.deliveries_for_unknown_projects
            + self.orphan_decisions
            + self.counter_drift_projects
            + self.projects_for_unknown_clients
            + self.records_for_unknown_clients
            + self.units_without_operator
            + self.items_without_designer
            + self.zero_value_contracts
            + self.idle_flat_rate_members
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// Add another report's counts to this one.
    pub fn merge(&mut self, other: &DataQualityReport) {
        self.malformed_specifications += other.malformed_specifications;
        self.unlabeled_deliveries += other.unlabeled_deliveries;
        self.unknown_label_deliveries += other.unknown_label_deliveries;
        self.deliveries_for_unknown_projects += other.deliveries_for_unknown_projects;
        self.orphan_decisions += other.orphan_decisions;
        self.counter_drift_projects += other.counter_drift_projects;
        self.projects_for_unknown_clients += other.projects_for_unknown_clients;
        self.records_for_unknown_clients += other.records_for_unknown_clients;
        self.units_without_operator += other.units_without_operator;
        self.items_without_designer += other.items_without_designer;
        self.zero_value_contracts += other.zero_value_contracts;
        self.idle_flat_rate_members += other.idle_flat_rate_members;
    }

    /// Non-zero counters as (name, count), in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        [
            ("malformed_specifications", self.malformed_specifications),
            ("unlabeled_deliveries", self.unlabeled_deliveries),
            ("unknown_label_deliveries", self.unknown_label_deliveries),
            (
                "deliveries_for_unknown_projects",
                self.deliveries_for_unknown_projects,
            ),
            ("orphan_decisions", self.orphan_decisions),
            ("counter_drift_projects", self.counter_drift_projects),
            ("projects_for_unknown_clients", self.projects_for_unknown_clients),
            ("records_for_unknown_clients", self.records_for_unknown_clients),
            ("units_without_operator", self.units_without_operator),
            ("items_without_designer", self.items_without_designer),
            ("zero_value_contracts", self.zero_value_contracts),
            ("idle_flat_rate_members", self.idle_flat_rate_members),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    /// Emit a warning when anything was observed.
    pub fn log(&self, snapshot_version: u64) {
        if self.is_clean() {
            return;
        }
        tracing::warn!(
            snapshot_version,
            total = self.total(),
            malformed_specifications = self.malformed_specifications,
            unlabeled_deliveries = self.unlabeled_deliveries,
            unknown_label_deliveries = self.unknown_label_deliveries,
            deliveries_for_unknown_projects = self.deliveries_for_unknown_projects,
            orphan_decisions = self.orphan_decisions,
            counter_drift_projects = self.counter_drift_projects,
            projects_for_unknown_clients = self.projects_for_unknown_clients,
            records_for_unknown_clients = self.records_for_unknown_clients,
            units_without_operator = self.units_without_operator,
            items_without_designer = self.items_without_designer,
            zero_value_contracts = self.zero_value_contracts,
            idle_flat_rate_members = self.idle_flat_rate_members,
            "Data-quality anomalies in snapshot"
        );
    }
}
