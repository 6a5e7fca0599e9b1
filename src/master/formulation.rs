//! Master formulation snapshot.
//!
//! Built from the agents' column sets at the start of each solve and kept
//! until the next one. It pairs every decision variable with the claims and
//! net value of the column it was created for, so extraction stays consistent
//! even if agents grow their column sets after the solve.

use crate::convex::{ConstraintId, ConvexProblem, LinearConstraint, LinearExpr, Var};
use crate::models::ColumnSource;

/// Variables, rows and column data of one master solve.
#[derive(Debug, Clone)]
pub(crate) struct Formulation {
    /// `decision_vars[a][c]`: weight of column `c` for agent `a`.
    pub decision_vars: Vec<Vec<Var>>,
    /// `claims[a][c][t]`.
    pub claims: Vec<Vec<Vec<f64>>>,
    /// `net_values[a][c]`: reward minus resource-usage cost.
    pub net_values: Vec<Vec<f64>>,
    /// One capacity row per period.
    pub resource_constraints: Vec<ConstraintId>,
    /// One convex-combination row per agent.
    pub convexity_constraints: Vec<ConstraintId>,
    /// Number of periods, one capacity row each.
    pub horizon: usize,
}

impl Formulation {
    /// Adds variables, convexity rows and capacity rows to `problem`.
    pub fn build<A: ColumnSource>(
        problem: &mut ConvexProblem,
        agents: &[A],
        horizon: usize,
        capacity: f64,
    ) -> Self {
        let mut decision_vars = Vec::with_capacity(agents.len());
        let mut claims = Vec::with_capacity(agents.len());
        let mut net_values = Vec::with_capacity(agents.len());

        for agent in agents {
            let columns = agent.columns();
            decision_vars.push(columns.iter().map(|_| problem.add_nonneg_var()).collect());
            claims.push(columns.iter().map(|c| c.claims.clone()).collect());
            net_values.push(
                columns
                    .iter()
                    .map(|c| c.net_value(agent.fixed_cost_vector()))
                    .collect(),
            );
        }

        let mut formulation = Self {
            decision_vars,
            claims,
            net_values,
            resource_constraints: Vec::with_capacity(horizon),
            convexity_constraints: Vec::with_capacity(agents.len()),
            horizon,
        };

        for vars in &formulation.decision_vars {
            let id = problem.add_constraint(LinearConstraint::equal(LinearExpr::sum(vars), 1.0));
            formulation.convexity_constraints.push(id);
        }

        for t in 0..horizon {
            let mut expected_total_claims = LinearExpr::zero();
            for a in 0..formulation.num_agents() {
                expected_total_claims += formulation.claim_expr(a, t);
            }
            let id = problem.add_constraint(LinearConstraint::at_most(expected_total_claims, capacity));
            formulation.resource_constraints.push(id);
        }

        formulation
    }

    pub fn num_agents(&self) -> usize {
        self.decision_vars.len()
    }

    /// Agent `a`'s expected claim at period `t` as an expression.
    pub fn claim_expr(&self, a: usize, t: usize) -> LinearExpr {
        let mut expr = LinearExpr::zero();
        for (&var, claims) in self.decision_vars[a].iter().zip(&self.claims[a]) {
            expr.add_term(var, claims[t]);
        }
        expr
    }

    /// Agent `a`'s horizon-summed expected claim as an expression.
    pub fn cumulative_claim_expr(&self, a: usize) -> LinearExpr {
        let mut expr = LinearExpr::zero();
        for (&var, claims) in self.decision_vars[a].iter().zip(&self.claims[a]) {
            expr.add_term(var, claims.iter().sum());
        }
        expr
    }

    /// Expected net value `Σ_a Σ_c x_ac · net_value_ac`.
    pub fn reward_expr(&self) -> LinearExpr {
        let mut expr = LinearExpr::zero();
        for (vars, values) in self.decision_vars.iter().zip(&self.net_values) {
            for (&var, &value) in vars.iter().zip(values) {
                expr.add_term(var, value);
            }
        }
        expr
    }

    /// Agent `a`'s expected claim at period `t` under `weights`.
    pub fn claim_value(&self, weights: &[Vec<f64>], a: usize, t: usize) -> f64 {
        weights[a]
            .iter()
            .zip(&self.claims[a])
            .map(|(w, claims)| w * claims[t])
            .sum()
    }

    /// Agent `a`'s horizon-summed expected claim under `weights`.
    pub fn cumulative_claim_value(&self, weights: &[Vec<f64>], a: usize) -> f64 {
        weights[a]
            .iter()
            .zip(&self.claims[a])
            .map(|(w, claims)| w * claims.iter().sum::<f64>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convex::Direction;
    use crate::models::{Agent, Column};

    fn agents() -> Vec<Agent> {
        vec![
            Agent::new("A1", 2)
                .with_fixed_costs(vec![1.0, 0.0])
                .with_column(Column::new(vec![1.0, 2.0], vec![3.0, 3.0]))
                .with_column(Column::idle(2)),
            Agent::new("A2", 2).with_column(Column::new(vec![0.5, 0.0], vec![1.0, 0.0])),
        ]
    }

    #[test]
    fn test_build_sizes() {
        let mut problem = ConvexProblem::new(Direction::Maximize);
        let f = Formulation::build(&mut problem, &agents(), 2, 1.5);

        assert_eq!(problem.var_count(), 3);
        // 2 convexity rows + 2 capacity rows
        assert_eq!(problem.constraint_count(), 4);
        assert_eq!(f.resource_constraints.len(), 2);
        assert_eq!(f.convexity_constraints.len(), 2);
        assert_eq!(f.num_agents(), 2);
    }

    #[test]
    fn test_capacity_rows() {
        let mut problem = ConvexProblem::new(Direction::Maximize);
        let f = Formulation::build(&mut problem, &agents(), 2, 1.5);

        let row = &problem.constraints()[f.resource_constraints[0].index()];
        assert!((row.rhs - 1.5).abs() < 1e-12);
        assert!((row.expr.coefficient(f.decision_vars[0][0]) - 1.0).abs() < 1e-12);
        assert!((row.expr.coefficient(f.decision_vars[1][0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_net_values_include_fixed_cost() {
        let mut problem = ConvexProblem::new(Direction::Maximize);
        let f = Formulation::build(&mut problem, &agents(), 2, 1.0);
        // 6 reward - 1.0 * 1.0 cost
        assert!((f.net_values[0][0] - 5.0).abs() < 1e-12);
        assert_eq!(f.net_values[0][1], 0.0);
    }

    #[test]
    fn test_claim_values_match_expressions() {
        let mut problem = ConvexProblem::new(Direction::Maximize);
        let f = Formulation::build(&mut problem, &agents(), 2, 1.0);
        let weights = vec![vec![0.25, 0.75], vec![1.0]];
        let flat = [0.25, 0.75, 1.0];

        for a in 0..2 {
            for t in 0..2 {
                assert!((f.claim_value(&weights, a, t) - f.claim_expr(a, t).evaluate(&flat)).abs() < 1e-12);
            }
            assert!(
                (f.cumulative_claim_value(&weights, a) - f.cumulative_claim_expr(a).evaluate(&flat)).abs()
                    < 1e-12
            );
        }
        assert!((f.cumulative_claim_value(&weights, 0) - 0.75).abs() < 1e-12);
    }
}
