//! Per-client cost breakdown

use serde::Serialize;

use crate::config::QuotaRates;
use crate::types::{Client, Quota};

/// Cost a contract commits the agency to, whatever is actually produced.
pub fn expected_cost(quota: &Quota, rates: &QuotaRates) -> f64 {
    f64::from(quota.videos) * rates.video
        + f64::from(quota.posts) * rates.post
        + f64::from(quota.miniatures) * rates.miniature
        + f64::from(quota.logos) * rates.logo
        + f64::from(quota.thumbnails) * rates.thumbnail
}

/// Cost used for margins: unused quota is still charged.
pub fn effective_cost(actual: f64, expected: f64) -> f64 {
    actual.max(expected)
}

/// Profit as a fraction of contract value; 0 without a contract value.
pub fn margin(net_profit: f64, contract_value: f64) -> f64 {
    if contract_value == 0.0 || !contract_value.is_finite() {
        return 0.0;
    }
    net_profit / contract_value
}

/// Production figures gathered for one client.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostInputs {
    pub video_cost: f64,
    pub design_cost: f64,
    pub copywriting_cost: f64,
    pub videos_completed: u32,
    pub items_approved: u32,
}

/// Cost, revenue and margin of one client over a billing period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientCostBreakdown {
    pub client_id: String,
    pub client_name: String,
    pub video_cost: f64,
    pub design_cost: f64,
    pub copywriting_cost: f64,
    /// video + design + copywriting
    pub actual_cost: f64,
    /// Contracted quota at unit rates
    pub expected_cost: f64,
    /// max(actual, expected)
    pub effective_cost: f64,
    pub contract_value: f64,
    pub net_profit: f64,
    /// net_profit / contract_value, 0 without contract value
    pub margin: f64,
    pub videos_completed: u32,
    pub items_approved: u32,
}

impl ClientCostBreakdown {
    pub fn compute(client: &Client, inputs: CostInputs, rates: &QuotaRates) -> Self {
        let (contract_value, expected) = match &client.contract {
            Some(contract) => (contract.monthly_value, expected_cost(&contract.quota, rates)),
            None => (0.0, 0.0),
        };

        let actual = inputs.video_cost + inputs.design_cost + inputs.copywriting_cost;
        let effective = effective_cost(actual, expected);
        let net_profit = contract_value - effective;

        Self {
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            video_cost: inputs.video_cost,
            design_cost: inputs.design_cost,
            copywriting_cost: inputs.copywriting_cost,
            actual_cost: actual,
            expected_cost: expected,
            effective_cost: effective,
            contract_value,
            net_profit,
            margin: margin(net_profit, contract_value),
            videos_completed: inputs.videos_completed,
            items_approved: inputs.items_approved,
        }
    }

    /// Whether the committed quota, not actual production, drives the cost.
    pub fn charged_for_unused_quota(&self) -> bool {
        self.expected_cost > self.actual_cost
    }

    /// Margin as a percentage.
    pub fn margin_pct(&self) -> f64 {
        self.margin * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Contract;

    fn client(contract: Option<Contract>) -> Client {
        Client {
            id: "c1".to_string(),
            name: "Maison Lune".to_string(),
            contract,
            copywriter_ids: vec![],
        }
    }

    #[test]
    fn test_expected_cost_from_quota() {
        let quota = Quota {
            videos: 4,
            posts: 8,
            miniatures: 4,
            logos: 1,
            thumbnails: 2,
        };
        let rates = QuotaRates::default();
        assert_eq!(expected_cost(&quota, &rates), 4.0 * 50.0 + 15.0 * 40.0);
    }

    #[test]
    fn test_effective_cost_uses_expected_when_higher() {
        assert_eq!(effective_cost(100.0, 150.0), 150.0);
        assert_eq!(effective_cost(200.0, 150.0), 200.0);
    }

    #[test]
    fn test_margin_uses_effective_cost() {
        // actual 100, expected 150 (quota of 3 posts at 50)
        let rates = QuotaRates {
            post: 50.0,
            ..Default::default()
        };
        let contract = Contract {
            monthly_value: 300.0,
            quota: Quota {
                posts: 3,
                ..Default::default()
            },
        };
        let inputs = CostInputs {
            design_cost: 100.0,
            items_approved: 2,
            ..Default::default()
        };

        let breakdown = ClientCostBreakdown::compute(&client(Some(contract)), inputs, &rates);

        assert_eq!(breakdown.actual_cost, 100.0);
        assert_eq!(breakdown.expected_cost, 150.0);
        assert_eq!(breakdown.effective_cost, 150.0);
        assert_eq!(breakdown.net_profit, 150.0);
        assert_eq!(breakdown.margin, 0.5);
        assert!(breakdown.charged_for_unused_quota());
    }

    #[test]
    fn test_zero_contract_value_has_zero_margin() {
        let inputs = CostInputs {
            video_cost: 120.0,
            ..Default::default()
        };
        let breakdown = ClientCostBreakdown::compute(&client(None), inputs, &QuotaRates::default());

        assert_eq!(breakdown.contract_value, 0.0);
        assert_eq!(breakdown.net_profit, -120.0);
        assert_eq!(breakdown.margin, 0.0);

        assert_eq!(margin(50.0, 0.0), 0.0);
    }

    #[test]
    fn test_negative_margin() {
        let contract = Contract {
            monthly_value: 200.0,
            quota: Quota::default(),
        };
        let inputs = CostInputs {
            video_cost: 250.0,
            ..Default::default()
        };
        let breakdown =
            ClientCostBreakdown::compute(&client(Some(contract)), inputs, &QuotaRates::default());
        assert_eq!(breakdown.margin, -0.25);
        assert_eq!(breakdown.margin_pct(), -25.0);
    }
}
