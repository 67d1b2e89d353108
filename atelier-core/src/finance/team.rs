//! Team member earnings

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::types::{TeamMember, TeamRole};

/// Earnings of one member from one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientEarnings {
    pub client_id: String,
    pub amount: f64,
    /// Items or videos credited; flat-rate shares count none
    pub units: u32,
}

/// Earnings of one member over a billing period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMemberEarnings {
    pub member_id: String,
    pub name: String,
    pub role: TeamRole,
    pub total: f64,
    /// Ordered by client id
    pub by_client: Vec<ClientEarnings>,
}

impl TeamMemberEarnings {
    pub fn client(&self, client_id: &str) -> Option<&ClientEarnings> {
        self.by_client.iter().find(|c| c.client_id == client_id)
    }
}

/// Accumulates credits per member and client.
#[derive(Debug, Default)]
pub struct EarningsLedger<'a> {
    credits: HashMap<&'a str, BTreeMap<&'a str, (f64, u32)>>,
}

impl<'a> EarningsLedger<'a> {
    /// Credit a countable unit (approved item, completed video).
    pub fn credit_unit(&mut self, member_id: &'a str, client_id: &'a str, amount: f64) {
        let entry = self.entry(member_id, client_id);
        entry.0 += amount;
        entry.1 += 1;
    }

    /// Credit a flat amount not tied to a unit.
    pub fn credit_flat(&mut self, member_id: &'a str, client_id: &'a str, amount: f64) {
        self.entry(member_id, client_id).0 += amount;
    }

    fn entry(&mut self, member_id: &'a str, client_id: &'a str) -> &mut (f64, u32) {
        self.credits
            .entry(member_id)
            .or_default()
            .entry(client_id)
            .or_insert((0.0, 0))
    }

    /// One row per team member, including members with nothing credited,
    /// ordered by member id.
    pub fn into_earnings(mut self, team: &[TeamMember]) -> Vec<TeamMemberEarnings> {
        let mut earnings: Vec<TeamMemberEarnings> = team
            .iter()
            .map(|member| {
                let by_client: Vec<ClientEarnings> = self
                    .credits
                    .remove(member.id.as_str())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(client_id, (amount, units))| ClientEarnings {
                        client_id: client_id.to_string(),
                        amount,
                        units,
                    })
                    .collect();

                TeamMemberEarnings {
                    member_id: member.id.clone(),
                    name: member.name.clone(),
                    role: member.role,
                    total: by_client.iter().map(|c| c.amount).sum(),
                    by_client,
                }
            })
            .collect();

        earnings.sort_by(|a, b| a.member_id.cmp(&b.member_id));
        earnings
    }
}
