//! Column (candidate plan) model.
//!
//! A column is one multi-period plan proposed by an agent: how many resource
//! units it claims at each period and the reward it earns at each period if
//! the claim is granted.
//!
//! # Reference
//! Desaulniers, Desrosiers & Solomon (2005), "Column Generation", Ch. 1

use serde::{Deserialize, Serialize};

/// A candidate plan over the planning horizon.
///
/// `claims[t]` and `reward[t]` refer to the same period `t`. Both vectors
/// must have the master problem's horizon length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Resource units requested per period (nonnegative).
    pub claims: Vec<f64>,
    /// Reward earned per period if the claim is granted.
    pub reward: Vec<f64>,
}

impl Column {
    /// Creates a column from per-period claims and rewards.
    pub fn new(claims: Vec<f64>, reward: Vec<f64>) -> Self {
        Self { claims, reward }
    }

    /// A column that claims nothing and earns nothing for `horizon` periods.
    ///
    /// Useful as the "opt-out" plan that keeps a master problem feasible.
    pub fn idle(horizon: usize) -> Self {
        Self {
            claims: vec![0.0; horizon],
            reward: vec![0.0; horizon],
        }
    }

    /// Number of periods covered by this column.
    pub fn horizon(&self) -> usize {
        self.claims.len()
    }

    /// Sum of rewards across the horizon.
    pub fn total_reward(&self) -> f64 {
        self.reward.iter().sum()
    }

    /// Sum of claims across the horizon.
    pub fn total_claims(&self) -> f64 {
        self.claims.iter().sum()
    }

    /// Resource-usage cost: `Σ_t fixed_costs[t] * claims[t]`.
    pub fn usage_cost(&self, fixed_costs: &[f64]) -> f64 {
        self.claims
            .iter()
            .zip(fixed_costs)
            .map(|(claim, cost)| claim * cost)
            .sum()
    }

    /// Net value of the plan: total reward minus resource-usage cost.
    pub fn net_value(&self, fixed_costs: &[f64]) -> f64 {
        self.total_reward() - self.usage_cost(fixed_costs)
    }
}
