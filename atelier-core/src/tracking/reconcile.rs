//! Delivery reconciliation
//!
//! Groups a project's deliveries by label and picks the current delivery of
//! each group: the one with the latest `submitted_at`, ties broken by the
//! greatest delivery id so the outcome does not depend on the order storage
//! returns records in.
//!
//! Deliveries without a label, or whose label matches no parsed item, are
//! kept aside as orphans. They stay visible for history but never influence
//! item status.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::items::WorkItemSpec;
use crate::types::DeliverySubmission;

/// Extract the label from a `"[label] rest of notes"` annotation.
///
/// The annotation must open the notes (leading whitespace aside). Returns
/// `None` when there is no closed bracket or the label is blank.
pub fn label_from_notes(notes: &str) -> Option<&str> {
    let rest = notes.trim_start().strip_prefix('[')?;
    let end = rest.find(']')?;
    let label = rest[..end].trim();
    (!label.is_empty()).then_some(label)
}

/// Why a delivery could not be attached to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    /// No label could be resolved
    Unlabeled,
    /// The label matches no item of the project
    UnknownLabel,
}

impl OrphanReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrphanReason::Unlabeled => "unlabeled",
            OrphanReason::UnknownLabel => "unknown label",
        }
    }
}

/// A delivery that is not attached to any item.
#[derive(Debug, Clone, Copy)]
pub struct OrphanDelivery<'a> {
    pub delivery: &'a DeliverySubmission,
    pub label: Option<&'a str>,
    pub reason: OrphanReason,
}

/// All deliveries submitted for one label.
#[derive(Debug, Clone)]
pub struct DeliveryGroup<'a> {
    pub label: &'a str,
    /// Oldest first; the last entry is the current delivery
    pub history: Vec<&'a DeliverySubmission>,
}

impl<'a> DeliveryGroup<'a> {
    /// The delivery that supersedes all others in the group.
    pub fn current(&self) -> Option<&'a DeliverySubmission> {
        self.history.last().copied()
    }
}

/// Result of reconciling a project's deliveries against its items.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation<'a> {
    groups: BTreeMap<&'a str, DeliveryGroup<'a>>,
    pub orphans: Vec<OrphanDelivery<'a>>,
}

impl<'a> Reconciliation<'a> {
    /// Group for a label, if anything was delivered for it.
    pub fn group(&self, label: &str) -> Option<&DeliveryGroup<'a>> {
        self.groups.get(label)
    }

    /// Current delivery for a label.
    pub fn current(&self, label: &str) -> Option<&'a DeliverySubmission> {
        self.groups.get(label).and_then(DeliveryGroup::current)
    }

    /// Groups ordered by label.
    pub fn groups(&self) -> impl Iterator<Item = &DeliveryGroup<'a>> {
        self.groups.values()
    }

    pub fn orphan_count(&self, reason: OrphanReason) -> usize {
        self.orphans.iter().filter(|o| o.reason == reason).count()
    }
}

/// Submission order used everywhere a "latest" delivery is chosen.
pub fn submission_order(a: &DeliverySubmission, b: &DeliverySubmission) -> Ordering {
    a.submitted_at
        .cmp(&b.submitted_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Reconcile deliveries against the parsed items of their project.
pub fn reconcile<'a, I>(items: &[WorkItemSpec], deliveries: I) -> Reconciliation<'a>
where
    I: IntoIterator<Item = &'a DeliverySubmission>,
{
    let known: HashSet<&str> = items.iter().map(|item| item.label.as_str()).collect();
    let mut reconciliation = Reconciliation::default();

    for delivery in deliveries {
        match delivery.resolved_label() {
            None => reconciliation.orphans.push(OrphanDelivery {
                delivery,
                label: None,
                reason: OrphanReason::Unlabeled,
            }),
            Some(label) if !known.contains(label) => {
                reconciliation.orphans.push(OrphanDelivery {
                    delivery,
                    label: Some(label),
                    reason: OrphanReason::UnknownLabel,
                })
            }
            Some(label) => reconciliation
                .groups
                .entry(label)
                .or_insert_with(|| DeliveryGroup {
                    label,
                    history: Vec::new(),
                })
                .history
                .push(delivery),
        }
    }

    for group in reconciliation.groups.values_mut() {
        group.history.sort_by(|a, b| submission_order(a, b));
    }
    reconciliation
        .orphans
        .sort_by(|a, b| submission_order(a.delivery, b.delivery));

    reconciliation
}
