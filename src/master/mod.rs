//! Column-generation master problem.
//!
//! Blends each agent's candidate columns into a probability distribution
//! under shared per-period capacity, maximizing expected net reward minus a
//! weighted variance fairness penalty.
//!
//! # Formulation
//!
//! ```text
//! maximize   Σ_a Σ_c x_ac · net_ac  −  λ · penalty(x)
//! subject to Σ_c x_ac = 1                         for every agent a
//!            Σ_a Σ_c x_ac · claims_ac[t] ≤ cap    for every period t
//!            x_ac ≥ 0
//! ```
//!
//! where `penalty` is the variance of expected claims across agents, either
//! per period and summed (`timestep`) or over horizon totals (`cumulative`).
//!
//! Each [`MasterProblem::solve`] rebuilds the formulation from the agents'
//! current columns. After a solve, dual prices and fairness gradients feed
//! the next round of column generation.
//!
//! # Reference
//! - Dantzig & Wolfe (1960), "Decomposition Principle for Linear Programs"
//! - Lübbecke & Desrosiers (2005), "Selected Topics in Column Generation"

mod formulation;
mod kpi;
mod solution;

pub use kpi::AllocationKpi;
pub use solution::{MasterSolution, PricingSignals};

use tracing::{debug, info, warn};

use crate::convex::{
    ClarabelSolver, ConvexProblem, ConvexSolver, Direction, QuadExpr, SolveStatus, SolverOutcome,
};
use crate::error::MasterError;
use crate::fairness::{variance_penalty, variance_penalty_gradient, variance_penalty_value};
use crate::models::{ColumnSource, FairnessScope, FairnessType, MasterConfig};
use crate::validation::{validate_agents, ValidationError, ValidationErrorKind};

use formulation::Formulation;

/// The master problem of one column-generation run.
///
/// Long-lived across iterations: only `config` and the solver persist; the
/// formulation and solved values are replaced on every solve.
///
/// # Example
/// ```no_run
/// use u_colgen::master::MasterProblem;
/// use u_colgen::models::{Agent, Column, MasterConfig};
///
/// let agents = vec![
///     Agent::new("A1", 2).with_column(Column::new(vec![1.0, 0.0], vec![2.0, 0.0])),
///     Agent::new("A2", 2).with_column(Column::new(vec![0.0, 1.0], vec![0.0, 2.0])),
/// ];
/// let mut master = MasterProblem::new(agents, MasterConfig::default()).unwrap();
/// let solution = master.solve().unwrap();
/// let duals = master.get_dual_prices();
/// ```
#[derive(Debug)]
pub struct MasterProblem<A, S = ClarabelSolver> {
    agents: Vec<A>,
    horizon: usize,
    config: MasterConfig,
    solver: S,
    formulation: Option<Formulation>,
    outcome: Option<SolverOutcome>,
}

impl<A: ColumnSource> MasterProblem<A> {
    /// Creates a master problem solved with the default Clarabel backend.
    ///
    /// The horizon is taken from the first agent.
    pub fn new(agents: Vec<A>, config: MasterConfig) -> Result<Self, MasterError> {
        Self::with_solver(agents, config, ClarabelSolver::new())
    }
}

impl<A: ColumnSource, S: ConvexSolver> MasterProblem<A, S> {
    /// Creates a master problem with a custom backend.
    pub fn with_solver(agents: Vec<A>, config: MasterConfig, solver: S) -> Result<Self, MasterError> {
        let horizon = match agents.first() {
            Some(agent) => agent.horizon(),
            None => {
                return Err(MasterError::InvalidInput(vec![ValidationError::new(
                    ValidationErrorKind::NoAgents,
                    "Master problem has no agents",
                )]))
            }
        };
        config.validate().map_err(MasterError::InvalidConfig)?;

        Ok(Self {
            agents,
            horizon,
            config,
            solver,
            formulation: None,
            outcome: None,
        })
    }

    /// Agents, in the order used for distributions and gradients.
    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    /// Mutable access to agents, e.g. to add generated columns.
    pub fn agents_mut(&mut self) -> &mut [A] {
        &mut self.agents
    }

    /// Number of agents.
    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Planning horizon shared by all agents.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Configuration.
    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    /// Mutable configuration; takes effect on the next solve.
    pub fn config_mut(&mut self) -> &mut MasterConfig {
        &mut self.config
    }

    /// Status of the last solve, if any.
    pub fn status(&self) -> Option<SolveStatus> {
        self.outcome.as_ref().map(|o| o.status)
    }

    /// Builds and solves the master over the agents' current columns.
    ///
    /// Configuration and input errors are returned before any state changes.
    /// Solver failures are reported through [`MasterSolution::status`].
    pub fn solve(&mut self) -> Result<MasterSolution, MasterError> {
        self.config.validate().map_err(MasterError::InvalidConfig)?;
        validate_agents(self.horizon, &self.agents).map_err(MasterError::InvalidInput)?;

        let mut problem = ConvexProblem::new(Direction::Maximize);
        let formulation = Formulation::build(
            &mut problem,
            &self.agents,
            self.horizon,
            self.config.resource_capacity,
        );

        let mut objective = QuadExpr::from(formulation.reward_expr());
        if let Some(penalty) = self.penalty_term(&formulation)? {
            objective -= penalty * self.config.langrangian_weight;
        }
        problem.set_objective(objective);

        debug!(
            agents = formulation.num_agents(),
            horizon = self.horizon,
            vars = problem.var_count(),
            constraints = problem.constraint_count(),
            scope = %self.config.fairness_scope,
            "master formulation built"
        );

        let outcome = self.solver.solve(&problem);
        if !outcome.status.is_optimal() {
            warn!(status = ?outcome.status, "master solve did not reach an optimum");
        }
        let max_constraint_violation = max_violation(&problem, &outcome);

        self.formulation = Some(formulation);
        self.outcome = Some(outcome);

        let fairness_gradients = self.compute_fairness_gradients()?;
        let fairness_penalty_realized = self.compute_realized_fairness_penalty()?;
        let fairness_impact = self.config.langrangian_weight * fairness_penalty_realized;
        let distributions = self.get_decision_distribution();

        let (status, objective_value, iterations) = match &self.outcome {
            Some(o) => (o.status, o.objective_value, o.iterations),
            None => (SolveStatus::Unsolved, None, 0),
        };

        info!(
            ?status,
            objective = ?objective_value,
            fairness_impact,
            iterations,
            max_violation = ?max_constraint_violation,
            "master solved"
        );

        Ok(MasterSolution {
            status,
            objective_value,
            distributions,
            fairness_impact,
            fairness_gradients,
            iterations,
            max_constraint_violation,
        })
    }

    /// Fairness penalty over decision variables, or `None` when the weight
    /// is not positive.
    fn penalty_term(&self, formulation: &Formulation) -> Result<Option<QuadExpr>, MasterError> {
        let n = formulation.num_agents();
        let penalty = match &self.config.fairness_scope {
            FairnessScope::Timestep => {
                self.ensure_variance()?;
                if !self.config.penalizes_fairness() {
                    return Ok(None);
                }
                let mut total = QuadExpr::zero();
                for t in 0..self.horizon {
                    let expected_claims_t: Vec<_> =
                        (0..n).map(|a| formulation.claim_expr(a, t)).collect();
                    total += variance_penalty(&expected_claims_t);
                }
                total
            }
            FairnessScope::Cumulative => {
                self.ensure_variance()?;
                if !self.config.penalizes_fairness() {
                    return Ok(None);
                }
                let expected_cumulative_claims: Vec<_> =
                    (0..n).map(|a| formulation.cumulative_claim_expr(a)).collect();
                variance_penalty(&expected_cumulative_claims)
            }
            FairnessScope::Unknown(name) => {
                return Err(MasterError::UnknownFairnessScope(name.clone()))
            }
        };
        Ok(Some(penalty))
    }

    fn ensure_variance(&self) -> Result<(), MasterError> {
        match &self.config.fairness_type {
            FairnessType::Variance => Ok(()),
            FairnessType::Other(name) => Err(MasterError::UnsupportedFairnessType(name.clone())),
        }
    }

    /// Solved weights per agent and column, unset values read as 0.0.
    fn solved_weights(&self) -> Result<(&Formulation, Vec<Vec<f64>>), MasterError> {
        let formulation = self.formulation.as_ref().ok_or(MasterError::NotSolved)?;
        let outcome = self.outcome.as_ref();
        let weights = formulation
            .decision_vars
            .iter()
            .map(|vars| {
                vars.iter()
                    .map(|&v| outcome.and_then(|o| o.value(v)).unwrap_or(0.0))
                    .collect()
            })
            .collect();
        Ok((formulation, weights))
    }

    /// Fairness gradient per agent, one entry per period.
    ///
    /// `timestep`: entry `t` is ∂var_t/∂(agent's expected claim at t).
    /// `cumulative`: the agent's ∂var/∂(horizon total), repeated for every
    /// period.
    pub fn compute_fairness_gradients(&self) -> Result<Vec<Vec<f64>>, MasterError> {
        match &self.config.fairness_scope {
            FairnessScope::Timestep => {
                self.ensure_variance()?;
                let (formulation, weights) = self.solved_weights()?;
                let n = formulation.num_agents();

                let gradients: Vec<Vec<f64>> = (0..self.horizon)
                    .map(|t| {
                        let expected_claims_t: Vec<f64> = (0..n)
                            .map(|a| formulation.claim_value(&weights, a, t))
                            .collect();
                        variance_penalty_gradient(&expected_claims_t)
                    })
                    .collect();

                Ok((0..n)
                    .map(|a| (0..self.horizon).map(|t| gradients[t][a]).collect())
                    .collect())
            }
            FairnessScope::Cumulative => {
                self.ensure_variance()?;
                let (formulation, weights) = self.solved_weights()?;
                let n = formulation.num_agents();

                let expected_cumulative_claims: Vec<f64> = (0..n)
                    .map(|a| formulation.cumulative_claim_value(&weights, a))
                    .collect();
                let grad_cumulative = variance_penalty_gradient(&expected_cumulative_claims);

                Ok(grad_cumulative
                    .into_iter()
                    .map(|g| vec![g; self.horizon])
                    .collect())
            }
            FairnessScope::Unknown(name) => Err(MasterError::UnknownFairnessScope(name.clone())),
        }
    }

    /// Fairness penalty at the solved point, without the weight.
    pub fn compute_realized_fairness_penalty(&self) -> Result<f64, MasterError> {
        match &self.config.fairness_scope {
            FairnessScope::Timestep => {
                self.ensure_variance()?;
                let (formulation, weights) = self.solved_weights()?;
                let n = formulation.num_agents();

                let mut penalty = 0.0;
                for t in 0..self.horizon {
                    let claims_t: Vec<f64> = (0..n)
                        .map(|a| formulation.claim_value(&weights, a, t))
                        .collect();
                    penalty += variance_penalty_value(&claims_t);
                }
                Ok(penalty)
            }
            FairnessScope::Cumulative => {
                self.ensure_variance()?;
                let (formulation, weights) = self.solved_weights()?;
                let claims: Vec<f64> = (0..formulation.num_agents())
                    .map(|a| formulation.cumulative_claim_value(&weights, a))
                    .collect();
                Ok(variance_penalty_value(&claims))
            }
            FairnessScope::Unknown(name) => Err(MasterError::UnknownFairnessScope(name.clone())),
        }
    }

    /// Capacity shadow price per period; 0.0 where no dual is available.
    ///
    /// Always returns `horizon` entries, including before the first solve.
    pub fn get_dual_prices(&self) -> Vec<f64> {
        match (&self.formulation, &self.outcome) {
            (Some(formulation), Some(outcome)) => formulation
                .resource_constraints
                .iter()
                .map(|&id| outcome.dual(id).unwrap_or(0.0))
                .collect(),
            _ => vec![0.0; self.horizon],
        }
    }

    /// Dual of each agent's convex-combination row; 0.0 where unavailable.
    pub fn get_convexity_duals(&self) -> Vec<f64> {
        match (&self.formulation, &self.outcome) {
            (Some(formulation), Some(outcome)) => formulation
                .convexity_constraints
                .iter()
                .map(|&id| outcome.dual(id).unwrap_or(0.0))
                .collect(),
            _ => vec![0.0; self.agents.len()],
        }
    }

    /// Per-agent probability distribution over the columns of the last solve.
    ///
    /// Unset values read as 0.0 and small negative solver noise is clipped.
    /// An agent whose weights sum to zero gets a uniform distribution.
    /// Empty before the first solve.
    pub fn get_decision_distribution(&self) -> Vec<Vec<f64>> {
        let Ok((_, weights)) = self.solved_weights() else {
            return Vec::new();
        };

        weights
            .into_iter()
            .enumerate()
            .map(|(a, w)| {
                let mut w: Vec<f64> = w.into_iter().map(|v| v.max(0.0)).collect();
                let total: f64 = w.iter().sum();
                if total == 0.0 {
                    debug!(agent = a, columns = w.len(), "no solved weights, using uniform distribution");
                    let uniform = 1.0 / w.len() as f64;
                    w.iter_mut().for_each(|v| *v = uniform);
                } else {
                    w.iter_mut().for_each(|v| *v /= total);
                }
                w
            })
            .collect()
    }

    /// Dual prices, convexity duals and fairness gradients for the next
    /// round of column generation.
    pub fn pricing_signals(&self) -> Result<PricingSignals, MasterError> {
        Ok(PricingSignals {
            dual_prices: self.get_dual_prices(),
            convexity_duals: self.get_convexity_duals(),
            fairness_gradients: self.compute_fairness_gradients()?,
            langrangian_weight: self.config.langrangian_weight,
        })
    }
}

/// Largest row violation at the solved point, `None` without one.
fn max_violation(problem: &ConvexProblem, outcome: &SolverOutcome) -> Option<f64> {
    if !outcome.status.has_solution() {
        return None;
    }
    let values: Vec<f64> = outcome.values.iter().map(|v| v.unwrap_or(0.0)).collect();
    Some(
        problem
            .constraints()
            .iter()
            .map(|row| row.violation(&values))
            .fold(0.0, f64::max),
    )
}
