//! Allocation quality metrics (KPIs).
//!
//! Summarizes a solved master problem: who is expected to claim what, how
//! much of the shared capacity is used, and how unequal the claims are.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Expected claims | `Σ_c x_ac · claims_ac[t]` per agent and period |
//! | Period utilization | total expected claims / capacity |
//! | Peak utilization | max period utilization |
//! | Expected net value | `Σ_c x_ac · net_ac` per agent |
//! | Realized penalty | fairness penalty at the solved point |

use crate::convex::ConvexSolver;
use crate::error::MasterError;
use crate::models::ColumnSource;

use super::MasterProblem;

/// Allocation performance indicators of the last master solve.
#[derive(Debug, Clone)]
pub struct AllocationKpi {
    /// `expected_claims[a][t]`.
    pub expected_claims: Vec<Vec<f64>>,
    /// Sum over agents of expected claims, per period.
    pub total_claims_by_period: Vec<f64>,
    /// Total claims divided by capacity per period (0.0 when capacity is 0).
    pub utilization_by_period: Vec<f64>,
    /// Largest period utilization.
    pub peak_utilization: f64,
    /// Expected net value per agent.
    pub expected_net_value_by_agent: Vec<f64>,
    /// Sum of expected net values.
    pub total_expected_net_value: f64,
    /// Unweighted fairness penalty at the solved point.
    pub realized_fairness_penalty: f64,
    /// Capacity the metrics were computed against.
    pub resource_capacity: f64,
}

impl AllocationKpi {
    /// Computes KPIs from a solved master problem.
    ///
    /// Uses the same solved weights as the fairness penalty (unset values
    /// read as 0.0), so metrics agree with the reported fairness impact.
    pub fn calculate<A: ColumnSource, S: ConvexSolver>(
        master: &MasterProblem<A, S>,
    ) -> Result<Self, MasterError> {
        let realized_fairness_penalty = master.compute_realized_fairness_penalty()?;
        let (formulation, weights) = master.solved_weights()?;
        let horizon = formulation.horizon;
        let capacity = master.config.resource_capacity;

        let expected_claims: Vec<Vec<f64>> = (0..formulation.num_agents())
            .map(|a| {
                (0..horizon)
                    .map(|t| formulation.claim_value(&weights, a, t))
                    .collect()
            })
            .collect();

        let total_claims_by_period: Vec<f64> = (0..horizon)
            .map(|t| expected_claims.iter().map(|claims| claims[t]).sum())
            .collect();

        let utilization_by_period: Vec<f64> = total_claims_by_period
            .iter()
            .map(|&total| if capacity > 0.0 { total / capacity } else { 0.0 })
            .collect();

        let peak_utilization = utilization_by_period.iter().cloned().fold(0.0, f64::max);

        let expected_net_value_by_agent: Vec<f64> = weights
            .iter()
            .zip(&formulation.net_values)
            .map(|(w, net)| w.iter().zip(net).map(|(x, v)| x * v).sum())
            .collect();
        let total_expected_net_value = expected_net_value_by_agent.iter().sum();

        Ok(Self {
            expected_claims,
            total_claims_by_period,
            utilization_by_period,
            peak_utilization,
            expected_net_value_by_agent,
            total_expected_net_value,
            realized_fairness_penalty,
            resource_capacity: capacity,
        })
    }

    /// Whether every period's expected total stays within capacity + `eps`.
    pub fn respects_capacity(&self, eps: f64) -> bool {
        self.total_claims_by_period
            .iter()
            .all(|&total| total <= self.resource_capacity + eps)
    }
}
