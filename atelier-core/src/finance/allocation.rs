//! Shared-cost allocation for flat-rate team members
//!
//! A member paid a flat monthly rate has that rate split evenly across the
//! clients *currently* assigned to them, each share rounded to whole currency
//! units. Allocation reads present assignments only: moving a client to
//! another copywriter also changes the cost reported for past periods.
//!
//! Rounding each share means the shares of `n` clients add up to the rate
//! within `n - 1` currency units. A sole client carries the rate unrounded,
//! so a fractional rate is charged exactly.

use std::collections::BTreeMap;

use crate::types::{Client, TeamMember};

/// One member's monthly rate split across clients.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAllocation<'a> {
    pub member: &'a TeamMember,
    /// Client ids in assignment order, deduplicated
    pub client_ids: Vec<&'a str>,
    pub share: f64,
}

/// Split a flat rate across `clients` clients.
///
/// Zero clients allocate nothing; one client takes the whole rate.
pub fn split_flat_rate(rate: f64, clients: usize) -> f64 {
    match clients {
        0 => 0.0,
        1 => rate,
        n => (rate / n as f64).round(),
    }
}

/// Allocations for every flat-rate member, keyed by member id.
#[derive(Debug, Clone, Default)]
pub struct Allocations<'a> {
    by_member: BTreeMap<&'a str, MemberAllocation<'a>>,
}

impl<'a> Allocations<'a> {
    /// Build allocations from the current client assignments.
    pub fn from_assignments(team: &'a [TeamMember], clients: &'a [Client]) -> Self {
        let mut assigned: BTreeMap<&'a str, Vec<&'a str>> = BTreeMap::new();
        for client in clients {
            for member_id in &client.copywriter_ids {
                let entry = assigned.entry(member_id.as_str()).or_default();
                if !entry.contains(&client.id.as_str()) {
                    entry.push(client.id.as_str());
                }
            }
        }

        let by_member = team
            .iter()
            .filter_map(|member| {
                let rate = member.monthly_rate?;
                let client_ids = assigned.remove(member.id.as_str()).unwrap_or_default();
                let share = split_flat_rate(rate, client_ids.len());
                Some((
                    member.id.as_str(),
                    MemberAllocation {
                        member,
                        client_ids,
                        share,
                    },
                ))
            })
            .collect();

        Self { by_member }
    }

    pub fn member(&self, member_id: &str) -> Option<&MemberAllocation<'a>> {
        self.by_member.get(member_id)
    }

    /// Shares charged to one client, as (member, amount).
    pub fn for_client<'s>(
        &'s self,
        client_id: &'s str,
    ) -> impl Iterator<Item = (&'a TeamMember, f64)> + 's {
        self.by_member.values().filter_map(move |allocation| {
            allocation
                .client_ids
                .iter()
                .any(|id| *id == client_id)
                .then_some((allocation.member, allocation.share))
        })
    }

    /// Flat-rate members with no client to charge.
    pub fn idle_members(&self) -> impl Iterator<Item = &'a TeamMember> + '_ {
        self.by_member
            .values()
            .filter(|allocation| allocation.client_ids.is_empty())
            .map(|allocation| allocation.member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberAllocation<'a>> {
        self.by_member.values()
    }
}
