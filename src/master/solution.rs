//! Master solve results and pricing signals.

use serde::{Deserialize, Serialize};

use crate::convex::SolveStatus;

/// Result of one master solve.
///
/// Solver failures are reported here, not as errors: check `status` before
/// trusting `objective_value`. Distributions are always valid probability
/// vectors (uniform fallback when the solver produced no weights).
#[derive(Debug, Clone)]
pub struct MasterSolution {
    /// Backend termination status.
    pub status: SolveStatus,
    /// Optimal objective (expected net reward minus weighted penalty).
    /// `None` when the solver produced no usable point.
    pub objective_value: Option<f64>,
    /// Per-agent probability distribution over its columns.
    pub distributions: Vec<Vec<f64>>,
    /// `langrangian_weight × realized fairness penalty`.
    pub fairness_impact: f64,
    /// Per-agent, per-period fairness gradient at the solved point.
    pub fairness_gradients: Vec<Vec<f64>>,
    /// Backend iterations.
    pub iterations: u32,
    /// Largest convexity or capacity row violation at the solved point.
    /// `None` when the solver produced no usable point.
    pub max_constraint_violation: Option<f64>,
}

impl MasterSolution {
    /// Whether the backend reached an optimum (possibly inexact).
    pub fn has_solution(&self) -> bool {
        self.status.has_solution()
    }
}

/// Prices handed to agents for the next round of column generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSignals {
    /// Capacity shadow price per period.
    pub dual_prices: Vec<f64>,
    /// Dual of each agent's convex-combination row.
    pub convexity_duals: Vec<f64>,
    /// Per-agent, per-period fairness gradient (unweighted).
    pub fairness_gradients: Vec<Vec<f64>>,
    /// Weight applied to the gradients when pricing.
    pub langrangian_weight: f64,
}

impl PricingSignals {
    /// Effective per-unit claim price for agent `a` at each period:
    /// `dual[t] + langrangian_weight · gradient[a][t]`.
    ///
    /// Returns `None` for an unknown agent index.
    pub fn for_agent(&self, a: usize) -> Option<Vec<f64>> {
        let gradient = self.fairness_gradients.get(a)?;
        Some(
            self.dual_prices
                .iter()
                .zip(gradient)
                .map(|(dual, grad)| dual + self.langrangian_weight * grad)
                .collect(),
        )
    }

    /// Reduced value of a candidate column for agent `a`: its net value
    /// minus the priced claims minus the agent's convexity dual. A positive
    /// value means the column can improve the master objective.
    pub fn reduced_value(&self, a: usize, net_value: f64, claims: &[f64]) -> Option<f64> {
        let prices = self.for_agent(a)?;
        let convexity = self.convexity_duals.get(a).copied().unwrap_or(0.0);
        let priced: f64 = prices.iter().zip(claims).map(|(p, c)| p * c).sum();
        Some(net_value - priced - convexity)
    }
}
