//! Convex problem container and solver abstraction.
//!
//! A `ConvexProblem` is a quadratic objective over nonnegative continuous
//! variables with linear equality/inequality rows. Any backend implementing
//! [`ConvexSolver`] can solve it.

use super::expr::{LinearExpr, QuadExpr, Var};

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Maximize the objective (must be concave).
    Maximize,
    /// Minimize the objective (must be convex).
    Minimize,
}

/// Row relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `expr == rhs`
    Eq,
    /// `expr <= rhs`
    Leq,
}

/// Handle to a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {
    /// Row index in the problem.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A linear row `expr (== | <=) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Relation.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// `expr == rhs`
    pub fn equal(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            sense: Sense::Eq,
            rhs,
        }
    }

    /// `expr <= rhs`
    pub fn at_most(expr: LinearExpr, rhs: f64) -> Self {
        Self {
            expr,
            sense: Sense::Leq,
            rhs,
        }
    }

    /// Right-hand side with the expression's constant moved across.
    pub fn normalized_rhs(&self) -> f64 {
        self.rhs - self.expr.constant_term()
    }

    /// Amount by which `values` violate the row (0.0 when satisfied).
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs(),
            Sense::Leq => (lhs - self.rhs).max(0.0),
        }
    }
}

/// Quadratic objective, linear rows, nonnegative variables.
#[derive(Debug, Clone)]
pub struct ConvexProblem {
    num_vars: usize,
    direction: Direction,
    objective: QuadExpr,
    constraints: Vec<LinearConstraint>,
}

impl ConvexProblem {
    /// Creates an empty problem.
    pub fn new(direction: Direction) -> Self {
        Self {
            num_vars: 0,
            direction,
            objective: QuadExpr::zero(),
            constraints: Vec::new(),
        }
    }

    /// Adds a continuous variable with lower bound 0.
    pub fn add_nonneg_var(&mut self) -> Var {
        let var = Var(self.num_vars);
        self.num_vars += 1;
        var
    }

    /// Adds a row and returns its handle.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) -> ConstraintId {
        self.constraints.push(constraint);
        ConstraintId(self.constraints.len() - 1)
    }

    /// Replaces the objective.
    pub fn set_objective(&mut self, objective: QuadExpr) {
        self.objective = objective;
    }

    /// Optimization direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Objective expression.
    pub fn objective(&self) -> &QuadExpr {
        &self.objective
    }

    /// All rows, indexed by `ConstraintId`.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.num_vars
    }

    /// Number of rows (excluding variable bounds).
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

/// Termination status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Optimal within tolerance.
    Optimal,
    /// Close to optimal, tolerances partly met.
    OptimalInaccurate,
    /// No point satisfies the constraints.
    Infeasible,
    /// Objective improves without bound.
    Unbounded,
    /// Iteration limit reached.
    IterationLimit,
    /// Time limit reached.
    TimeLimit,
    /// Backend numerical failure.
    NumericalError,
    /// Not solved.
    Unsolved,
}

impl SolveStatus {
    /// Whether primal values and duals are meaningful.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::OptimalInaccurate)
    }

    /// Whether the status is a clean optimum.
    pub fn is_optimal(self) -> bool {
        self == SolveStatus::Optimal
    }
}

/// Raw backend result.
///
/// `values[i]` is the primal value of variable `i` and `duals[k]` the dual of
/// row `k`, both `None` when the backend produced no usable point. Duals are
/// sensitivities of the optimal objective to the row's right-hand side, in
/// the problem's own direction: for a maximization, a binding `<=` row has a
/// nonnegative dual.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    /// Termination status.
    pub status: SolveStatus,
    /// Objective value at the returned point, if any.
    pub objective_value: Option<f64>,
    /// Primal values per variable.
    pub values: Vec<Option<f64>>,
    /// Duals per constraint row.
    pub duals: Vec<Option<f64>>,
    /// Iterations used.
    pub iterations: u32,
}

impl SolverOutcome {
    /// Outcome with no values for a problem of the given size.
    pub fn unsolved(status: SolveStatus, num_vars: usize, num_constraints: usize) -> Self {
        Self {
            status,
            objective_value: None,
            values: vec![None; num_vars],
            duals: vec![None; num_constraints],
            iterations: 0,
        }
    }

    /// Primal value of `var`, if set.
    pub fn value(&self, var: Var) -> Option<f64> {
        self.values.get(var.index()).copied().flatten()
    }

    /// Dual of a row, if available.
    pub fn dual(&self, id: ConstraintId) -> Option<f64> {
        self.duals.get(id.index()).copied().flatten()
    }
}

/// A convex optimization backend.
pub trait ConvexSolver {
    /// Solves the problem. Failures are reported through the status, not
    /// as errors.
    fn solve(&self, problem: &ConvexProblem) -> SolverOutcome;
}
