//! Item status derivation
//!
//! | Current delivery | Latest decision on it | Status |
//! |------------------|-----------------------|--------|
//! | none | - | `Pending` |
//! | present | none | `Delivered` |
//! | present | `Approved` | `Approved` |
//! | present | `RevisionRequested` | `RevisionRequested` |
//!
//! Decisions only count for the delivery they were taken on, so a new
//! delivery after an approval puts the item back to `Delivered`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::items::WorkItemSpec;
use crate::types::{Decision, DecisionRecord, DeliverySubmission};

use super::reconcile::Reconciliation;

/// Lifecycle state of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Delivered,
    RevisionRequested,
    Approved,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Delivered => "delivered",
            ItemStatus::RevisionRequested => "revision_requested",
            ItemStatus::Approved => "approved",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::Delivered => "Delivered",
            ItemStatus::RevisionRequested => "Revision requested",
            ItemStatus::Approved => "Approved",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn decision_key(record: &DecisionRecord) -> (DateTime<Utc>, u8) {
    (record.reviewed_at, record.decision.precedence())
}

/// Decisions indexed by the delivery they were taken on.
///
/// Several decisions on one delivery are tolerated; the one with the latest
/// `reviewed_at` wins. On equal timestamps a revision request beats an
/// approval, so the result does not depend on input order.
#[derive(Debug, Default)]
pub struct DecisionIndex<'a> {
    latest: HashMap<&'a str, &'a DecisionRecord>,
}

impl<'a> DecisionIndex<'a> {
    pub fn new(decisions: &'a [DecisionRecord]) -> Self {
        let mut latest: HashMap<&'a str, &'a DecisionRecord> = HashMap::new();
        for decision in decisions {
            latest
                .entry(decision.delivery_id.as_str())
                .and_modify(|held| {
                    if decision_key(decision) > decision_key(held) {
                        *held = decision;
                    }
                })
                .or_insert(decision);
        }
        Self { latest }
    }

    /// Most recent decision on a delivery.
    pub fn latest_for(&self, delivery_id: &str) -> Option<&'a DecisionRecord> {
        self.latest.get(delivery_id).copied()
    }

    /// Delivery ids that have at least one decision.
    pub fn delivery_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.latest.keys().copied()
    }
}

/// Derived state of one item.
#[derive(Debug, Clone, Copy)]
pub struct ItemState<'a> {
    pub item: &'a WorkItemSpec,
    pub status: ItemStatus,
    pub current_delivery: Option<&'a DeliverySubmission>,
    /// Latest decision on the current delivery
    pub decision: Option<&'a DecisionRecord>,
    /// Number of deliveries submitted for the item
    pub delivery_count: usize,
}

impl ItemState<'_> {
    /// When the current delivery was approved, if it is.
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        match (self.status, self.decision) {
            (ItemStatus::Approved, Some(decision)) => Some(decision.reviewed_at),
            _ => None,
        }
    }
}

/// Status of an item given its current delivery.
pub fn derive_status<'a>(
    current: Option<&DeliverySubmission>,
    decisions: &DecisionIndex<'a>,
) -> (ItemStatus, Option<&'a DecisionRecord>) {
    let Some(delivery) = current else {
        return (ItemStatus::Pending, None);
    };

    match decisions.latest_for(&delivery.id) {
        None => (ItemStatus::Delivered, None),
        Some(record) => {
            let status = match record.decision {
                Decision::Approved => ItemStatus::Approved,
                Decision::RevisionRequested => ItemStatus::RevisionRequested,
            };
            (status, Some(record))
        }
    }
}

/// Derive the state of every item, in item order.
pub fn derive_item_states<'a>(
    items: &'a [WorkItemSpec],
    reconciliation: &Reconciliation<'a>,
    decisions: &DecisionIndex<'a>,
) -> Vec<ItemState<'a>> {
    items
        .iter()
        .map(|item| {
            let group = reconciliation.group(&item.label);
            let current_delivery = group.and_then(|g| g.current());
            let (status, decision) = derive_status(current_delivery, decisions);
            ItemState {
                item,
                status,
                current_delivery,
                decision,
                delivery_count: group.map_or(0, |g| g.history.len()),
            }
        })
        .collect()
}

/// Completion figures for a project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub total_items: u32,
    /// Items whose current delivery is approved
    pub completed_items: u32,
    /// 0-100; 0 when the project has no items
    pub percent_complete: f64,
    /// Completion counter kept by storage, echoed for comparison
    pub recorded_completed: Option<u32>,
}

impl ProjectSummary {
    pub fn from_states(states: &[ItemState<'_>], recorded_completed: Option<u32>) -> Self {
        let total_items = states.len() as u32;
        let completed_items = states
            .iter()
            .filter(|s| s.status == ItemStatus::Approved)
            .count() as u32;
        let percent_complete = if total_items == 0 {
            0.0
        } else {
            f64::from(completed_items) / f64::from(total_items) * 100.0
        };

        Self {
            total_items,
            completed_items,
            percent_complete,
            recorded_completed,
        }
    }

    /// Difference between the stored counter and the derived count, when
    /// they disagree.
    pub fn counter_drift(&self) -> Option<i64> {
        self.recorded_completed
            .map(|recorded| i64::from(recorded) - i64::from(self.completed_items))
            .filter(|drift| *drift != 0)
    }

    pub fn is_complete(&self) -> bool {
        self.total_items > 0 && self.completed_items == self.total_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::parse_specification;
    use crate::tracking::reconcile;
    use crate::types::Payload;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap()
    }

    fn delivery(id: &str, label: &str, day: u32) -> DeliverySubmission {
        DeliverySubmission {
            id: id.to_string(),
            project_id: "p1".to_string(),
            label: Some(label.to_string()),
            notes: String::new(),
            submitted_at: at(day),
            payload: Payload::Link {
                url: format!("https://files.example.com/{id}"),
            },
        }
    }

    fn decision(delivery_id: &str, decision: Decision, day: u32) -> DecisionRecord {
        DecisionRecord {
            delivery_id: delivery_id.to_string(),
            decision,
            reviewed_at: at(day),
        }
    }

    fn statuses(
        spec_text: &str,
        deliveries: &[DeliverySubmission],
        decisions: &[DecisionRecord],
    ) -> Vec<(String, ItemStatus)> {
        let spec = parse_specification(spec_text);
        let recon = reconcile(&spec.items, deliveries);
        let index = DecisionIndex::new(decisions);
        derive_item_states(&spec.items, &recon, &index)
            .iter()
            .map(|s| (s.item.label.clone(), s.status))
            .collect()
    }

    #[test]
    fn test_no_delivery_is_pending() {
        let result = statuses("[1x Post]", &[], &[]);
        assert_eq!(result, vec![("Post 1".to_string(), ItemStatus::Pending)]);
    }

    #[test]
    fn test_delivery_without_decision_is_delivered() {
        let deliveries = [delivery("d1", "Post 1", 1)];
        let result = statuses("[1x Post]", &deliveries, &[]);
        assert_eq!(result[0].1, ItemStatus::Delivered);
    }

    #[test]
    fn test_decisions_map_to_status() {
        let deliveries = [delivery("d1", "Post 1", 1), delivery("d2", "Post 2", 1)];
        let decisions = [
            decision("d1", Decision::Approved, 2),
            decision("d2", Decision::RevisionRequested, 2),
        ];
        let result = statuses("[2x Post]", &deliveries, &decisions);
        assert_eq!(result[0].1, ItemStatus::Approved);
        assert_eq!(result[1].1, ItemStatus::RevisionRequested);
    }

    #[test]
    fn test_approval_does_not_survive_a_new_delivery() {
        let deliveries = [delivery("d1", "Logo 1", 1), delivery("d2", "Logo 1", 3)];
        let decisions = [decision("d1", Decision::Approved, 2)];

        let result = statuses("[1x Logo]", &deliveries, &decisions);

        assert_eq!(result[0].1, ItemStatus::Delivered);
    }

    #[test]
    fn test_latest_decision_wins() {
        let deliveries = [delivery("d1", "Post 1", 1)];
        let decisions = [
            decision("d1", Decision::Approved, 5),
            decision("d1", Decision::RevisionRequested, 3),
        ];
        let result = statuses("[1x Post]", &deliveries, &decisions);
        assert_eq!(result[0].1, ItemStatus::Approved);

    }

    #[test]
    fn test_tied_decisions_settle_on_revision_in_any_order() {
        let deliveries = [delivery("d1", "Post 1", 1)];
        let mut tied = vec![
            decision("d1", Decision::Approved, 4),
            decision("d1", Decision::RevisionRequested, 4),
        ];

        let forward = statuses("[1x Post]", &deliveries, &tied);
        tied.reverse();
        let reversed = statuses("[1x Post]", &deliveries, &tied);

        assert_eq!(forward[0].1, ItemStatus::RevisionRequested);
        assert_eq!(reversed, forward);
    }

    #[test]
    fn test_revision_then_redelivery_then_approval() {
        let deliveries = [delivery("d1", "Post 1", 1), delivery("d2", "Post 1", 4)];
        let decisions = [
            decision("d1", Decision::RevisionRequested, 2),
            decision("d2", Decision::Approved, 6),
        ];
        let spec = parse_specification("[1x Post]");
        let recon = reconcile(&spec.items, &deliveries);
        let index = DecisionIndex::new(&decisions);
        let states = derive_item_states(&spec.items, &recon, &index);

        assert_eq!(states[0].status, ItemStatus::Approved);
        assert_eq!(states[0].delivery_count, 2);
        assert_eq!(states[0].approved_at(), Some(at(6)));
        assert_eq!(states[0].current_delivery.unwrap().id, "d2");
    }

    #[test]
    fn test_summary_counts_approved_items() {
        let deliveries = [delivery("d1", "Post 1", 1), delivery("d2", "Miniature 1", 1)];
        let decisions = [decision("d1", Decision::Approved, 2)];
        let spec = parse_specification("[1x Post + 1x Miniature]");
        let recon = reconcile(&spec.items, &deliveries);
        let index = DecisionIndex::new(&decisions);
        let states = derive_item_states(&spec.items, &recon, &index);

        let summary = ProjectSummary::from_states(&states, Some(2));

        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.completed_items, 1);
        assert_eq!(summary.percent_complete, 50.0);
        assert_eq!(summary.counter_drift(), Some(1));
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_empty_project_summary() {
        let summary = ProjectSummary::from_states(&[], None);
        assert_eq!(summary.percent_complete, 0.0);
        assert_eq!(summary.counter_drift(), None);
        assert!(!summary.is_complete());
    }
}
