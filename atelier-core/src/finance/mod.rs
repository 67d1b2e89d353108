//! Financial aggregation over a billing period
//!
//! Turns approved items, completed production units and flat-rate
//! assignments into per-client cost breakdowns and per-member earnings.
//! Each client is computed independently; clients fan out over rayon and
//! are reported in client id order.

pub mod allocation;
pub mod client;
pub mod period;
pub mod team;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::FinanceConfig;
use crate::quality::DataQualityReport;
use crate::types::{Client, ProductionUnit, TeamMember};

pub use allocation::{split_flat_rate, Allocations, MemberAllocation};
pub use client::{effective_cost, expected_cost, margin, ClientCostBreakdown, CostInputs};
pub use period::{BillingPeriod, PeriodKind};
pub use team::{ClientEarnings, EarningsLedger, TeamMemberEarnings};

/// An item whose current delivery carries an approval.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedItem<'a> {
    pub project_id: &'a str,
    pub client_id: &'a str,
    pub designer_id: Option<&'a str>,
    pub label: &'a str,
    pub price: f64,
    pub approved_at: DateTime<Utc>,
}

/// Everything the aggregator reads.
#[derive(Debug, Clone, Copy)]
pub struct FinanceInput<'a> {
    pub approved_items: &'a [ApprovedItem<'a>],
    pub clients: &'a [Client],
    pub team: &'a [TeamMember],
    pub production_units: &'a [ProductionUnit],
}

/// Costs and earnings for one billing period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceReport {
    /// Ordered by client id
    pub clients: Vec<ClientCostBreakdown>,
    /// Ordered by member id
    pub team: Vec<TeamMemberEarnings>,
    #[serde(skip)]
    pub quality: DataQualityReport,
}

impl FinanceReport {
    pub fn client(&self, client_id: &str) -> Option<&ClientCostBreakdown> {
        self.clients.iter().find(|c| c.client_id == client_id)
    }

    pub fn member(&self, member_id: &str) -> Option<&TeamMemberEarnings> {
        self.team.iter().find(|m| m.member_id == member_id)
    }
}

/// A completed unit priced at its operator's current rate.
#[derive(Debug, Clone, Copy)]
struct PricedUnit<'a> {
    operator_id: Option<&'a str>,
    rate: f64,
}

/// Computes client costs and team earnings for a billing period.
#[derive(Debug, Clone)]
pub struct FinancialAggregator<'c> {
    config: &'c FinanceConfig,
}

impl<'c> FinancialAggregator<'c> {
    pub fn new(config: &'c FinanceConfig) -> Self {
        Self { config }
    }

    /// Rate charged for a unit, looked up from the member record at call time.
    pub fn unit_rate(&self, operator: Option<&TeamMember>) -> f64 {
        operator
            .and_then(|member| member.unit_rate)
            .unwrap_or(self.config.default_video_rate)
    }

    pub fn aggregate(&self, input: FinanceInput<'_>, period: &BillingPeriod) -> FinanceReport {
        let mut quality = DataQualityReport::default();

        let members: HashMap<&str, &TeamMember> =
            input.team.iter().map(|m| (m.id.as_str(), m)).collect();
        let known_clients: HashSet<&str> = input.clients.iter().map(|c| c.id.as_str()).collect();

        let mut units_by_client: HashMap<&str, Vec<PricedUnit<'_>>> = HashMap::new();
        for unit in input.production_units {
            let Some(completed_at) = unit.completed_at else {
                continue;
            };
            if !period.contains(completed_at) {
                continue;
            }
            if !known_clients.contains(unit.client_id.as_str()) {
                quality.records_for_unknown_clients += 1;
                continue;
            }

            let operator = unit
                .operator_id
                .as_deref()
                .and_then(|id| members.get(id).copied());
            if operator.is_none() {
                quality.units_without_operator += 1;
            }

            units_by_client
                .entry(unit.client_id.as_str())
                .or_default()
                .push(PricedUnit {
                    operator_id: operator.map(|m| m.id.as_str()),
                    rate: self.unit_rate(operator),
                });
        }

        let mut items_by_client: HashMap<&str, Vec<&ApprovedItem<'_>>> = HashMap::new();
        for item in input.approved_items {
            if !period.contains(item.approved_at) {
                continue;
            }
            if !known_clients.contains(item.client_id) {
                quality.records_for_unknown_clients += 1;
                continue;
            }
            items_by_client.entry(item.client_id).or_default().push(item);
        }

        let allocations = Allocations::from_assignments(input.team, input.clients);
        quality.idle_flat_rate_members = allocations.idle_members().count();
        quality.zero_value_contracts = input
            .clients
            .iter()
            .filter(|c| c.contract.as_ref().map_or(true, |k| k.monthly_value == 0.0))
            .count();

        let mut clients: Vec<ClientCostBreakdown> = input
            .clients
            .par_iter()
            .map(|client| {
                let id = client.id.as_str();
                let units = units_by_client.get(id).map(Vec::as_slice).unwrap_or_default();
                let items = items_by_client.get(id).map(Vec::as_slice).unwrap_or_default();

                let inputs = CostInputs {
                    video_cost: units.iter().map(|u| u.rate).sum(),
                    design_cost: items.iter().map(|i| i.price).sum(),
                    copywriting_cost: allocations.for_client(id).map(|(_, share)| share).sum(),
                    videos_completed: units.len() as u32,
                    items_approved: items.len() as u32,
                };
                ClientCostBreakdown::compute(client, inputs, &self.config.quota_rates)
            })
            .collect();
        clients.sort_by(|a, b| a.client_id.cmp(&b.client_id));

        let mut ledger = EarningsLedger::default();
        for (client_id, items) in &items_by_client {
            for item in items {
                match item.designer_id.filter(|id| members.contains_key(id)) {
                    Some(designer) => ledger.credit_unit(designer, client_id, item.price),
                    None => quality.items_without_designer += 1,
                }
            }
        }
        for (client_id, units) in &units_by_client {
            for unit in units {
                if let Some(operator) = unit.operator_id {
                    ledger.credit_unit(operator, client_id, unit.rate);
                }
            }
        }
        for allocation in allocations.iter() {
            for client_id in &allocation.client_ids {
                if known_clients.contains(client_id) {
                    ledger.credit_flat(&allocation.member.id, client_id, allocation.share);
                }
            }
        }
        let team = ledger.into_earnings(input.team);

        tracing::debug!(
            period = %period.display_name(),
            clients = clients.len(),
            members = team.len(),
            "Aggregated finances"
        );

        FinanceReport {
            clients,
            team,
            quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Contract, Quota, TeamRole};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn client(id: &str, value: f64, copywriters: &[&str]) -> Client {
        Client {
            id: id.to_string(),
            name: id.to_uppercase(),
            contract: Some(Contract {
                monthly_value: value,
                quota: Quota::default(),
            }),
            copywriter_ids: copywriters.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn member(id: &str, role: TeamRole, unit_rate: Option<f64>, monthly: Option<f64>) -> TeamMember {
        TeamMember {
            id: id.to_string(),
            name: id.to_string(),
            role,
            unit_rate,
            monthly_rate: monthly,
        }
    }

    fn unit(id: &str, client: &str, operator: Option<&str>, day: Option<u32>) -> ProductionUnit {
        ProductionUnit {
            id: id.to_string(),
            client_id: client.to_string(),
            title: None,
            operator_id: operator.map(str::to_string),
            completed_at: day.map(at),
        }
    }

    fn team() -> Vec<TeamMember> {
        vec![
            member("d1", TeamRole::Designer, None, None),
            member("v1", TeamRole::VideoEditor, Some(70.0), None),
            member("w1", TeamRole::Copywriter, None, Some(1000.0)),
        ]
    }

    #[test]
    fn test_aggregate_costs_per_client() {
        let config = FinanceConfig::default();
        let clients = vec![client("c2", 2000.0, &["w1"]), client("c1", 1000.0, &["w1"])];
        let team = team();
        let units = vec![
            unit("u1", "c1", Some("v1"), Some(3)),
            unit("u2", "c1", Some("v1"), Some(4)),
            unit("u3", "c1", Some("v1"), None),
            unit("u4", "c2", Some("ghost"), Some(5)),
        ];
        let approved = vec![ApprovedItem {
            project_id: "p1",
            client_id: "c1",
            designer_id: Some("d1"),
            label: "Post 1",
            price: 40.0,
            approved_at: at(10),
        }];

        let period = BillingPeriod::month(2025, 3).unwrap();
        let report = FinancialAggregator::new(&config).aggregate(
            FinanceInput {
                approved_items: &approved,
                clients: &clients,
                team: &team,
                production_units: &units,
            },
            &period,
        );

        let ids: Vec<_> = report.clients.iter().map(|c| c.client_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);

        let c1 = report.client("c1").unwrap();
        assert_eq!(c1.video_cost, 140.0);
        assert_eq!(c1.videos_completed, 2);
        assert_eq!(c1.design_cost, 40.0);
        assert_eq!(c1.copywriting_cost, 500.0);
        assert_eq!(c1.actual_cost, 680.0);

        // Unknown operator falls back to the default rate
        let c2 = report.client("c2").unwrap();
        assert_eq!(c2.video_cost, config.default_video_rate);
        assert_eq!(report.quality.units_without_operator, 1);

        assert_eq!(report.member("d1").unwrap().total, 40.0);
        assert_eq!(report.member("v1").unwrap().total, 140.0);
        assert_eq!(report.member("v1").unwrap().client("c1").unwrap().units, 2);
        assert_eq!(report.member("w1").unwrap().total, 1000.0);
    }

    #[test]
    fn test_window_excludes_other_months() {
        let config = FinanceConfig::default();
        let clients = vec![client("c1", 500.0, &[])];
        let team = team();
        let approved = vec![ApprovedItem {
            project_id: "p1",
            client_id: "c1",
            designer_id: Some("d1"),
            label: "Logo 1",
            price: 40.0,
            approved_at: at(10),
        }];

        let april = BillingPeriod::month(2025, 4).unwrap();
        let report = FinancialAggregator::new(&config).aggregate(
            FinanceInput {
                approved_items: &approved,
                clients: &clients,
                team: &team,
                production_units: &[],
            },
            &april,
        );

        assert_eq!(report.client("c1").unwrap().design_cost, 0.0);
        assert_eq!(report.member("d1").unwrap().total, 0.0);
        assert_eq!(report.quality.idle_flat_rate_members, 1);
    }

    #[test]
    fn test_rate_change_applies_to_past_units() {
        let config = FinanceConfig::default();
        let clients = vec![client("c1", 500.0, &[])];
        let mut team = team();
        let units = vec![unit("u1", "c1", Some("v1"), Some(2))];
        let period = BillingPeriod::month(2025, 3).unwrap();
        let aggregator = FinancialAggregator::new(&config);

        let input = |team: &[TeamMember]| {
            aggregator
                .aggregate(
                    FinanceInput {
                        approved_items: &[],
                        clients: &clients,
                        team,
                        production_units: &units,
                    },
                    &period,
                )
                .client("c1")
                .unwrap()
                .video_cost
        };

        assert_eq!(input(&team), 70.0);
        team[1].unit_rate = Some(90.0);
        assert_eq!(input(&team), 90.0);
    }

    #[test]
    fn test_records_for_unknown_clients_are_counted() {
        let config = FinanceConfig::default();
        let mut clients = vec![client("c1", 0.0, &[])];
        clients[0].contract = None;
        let team = team();
        let units = vec![unit("u1", "nobody", Some("v1"), Some(2))];

        let report = FinancialAggregator::new(&config).aggregate(
            FinanceInput {
                approved_items: &[],
                clients: &clients,
                team: &team,
                production_units: &units,
            },
            &BillingPeriod::month(2025, 3).unwrap(),
        );

        assert_eq!(report.quality.records_for_unknown_clients, 1);
        assert_eq!(report.quality.zero_value_contracts, 1);
        assert_eq!(report.client("c1").unwrap().margin, 0.0);
    }

    #[test]
    fn test_items_without_known_designer_are_counted() {
        let config = FinanceConfig::default();
        let clients = vec![client("c1", 1000.0, &[])];
        let team = team();
        let approved_by = |designer: Option<&'static str>, label: &'static str| ApprovedItem {
            project_id: "p1",
            client_id: "c1",
            designer_id: designer,
            label,
            price: 40.0,
            approved_at: at(10),
        };
        let approved = vec![
            approved_by(None, "Post 1"),
            approved_by(Some("ghost"), "Post 2"),
            approved_by(Some("d1"), "Post 3"),
        ];

        let report = FinancialAggregator::new(&config).aggregate(
            FinanceInput {
                approved_items: &approved,
                clients: &clients,
                team: &team,
                production_units: &[],
            },
            &BillingPeriod::month(2025, 3).unwrap(),
        );

        // The client is still charged for every approved item
        assert_eq!(report.client("c1").unwrap().design_cost, 120.0);
        assert_eq!(report.member("d1").unwrap().total, 40.0);
        assert_eq!(report.quality.items_without_designer, 2);
    }
}
