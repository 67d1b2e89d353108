//! Delivery reconciliation and item status
//!
//! Per project, deliveries are grouped by the item label they reference and
//! the latest one per label becomes the current delivery
//! ([`reconcile`]). The current delivery and the decisions taken on it then
//! give each item its lifecycle state ([`status`]):
//!
//! ```text
//!   Pending ──deliver──► Delivered ──approve──► Approved
//!                           │  ▲                   │
//!                 request   │  │ deliver again     │ deliver again
//!                 revision  ▼  │                   │
//!                     RevisionRequested            │
//!                           ▲                      │
//!                           └──────────────────────┘ (resets to Delivered)
//! ```
//!
//! Nothing is stored: states are re-derived from the record snapshot on
//! every call.

pub mod reconcile;
pub mod status;

pub use reconcile::{
    label_from_notes, reconcile, DeliveryGroup, OrphanDelivery, OrphanReason, Reconciliation,
};
pub use status::{derive_item_states, DecisionIndex, ItemState, ItemStatus, ProjectSummary};
