//! Clarabel interior-point backend.
//!
//! Translates a [`ConvexProblem`] into Clarabel's standard conic form
//!
//! ```text
//! minimize   ½ xᵀPx + qᵀx
//! subject to Ax + s = b,  s ∈ K
//! ```
//!
//! with equality rows in the zero cone and `<=` rows plus variable lower
//! bounds (`-x ≤ 0`) in the nonnegative cone. Maximization is solved as
//! minimization of the negated objective.
//!
//! # Reference
//! Goulart & Chen (2024), "Clarabel: An interior-point solver for conic
//! programs with quadratic objectives"

use ::clarabel::algebra::CscMatrix;
use ::clarabel::solver::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::problem::{
    ConvexProblem, ConvexSolver, Direction, Sense, SolveStatus, SolverOutcome,
};

/// Backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Maximum interior-point iterations (default: 200).
    pub max_iter: u32,
    /// Wall-clock limit in seconds (default: none).
    pub time_limit_secs: Option<f64>,
    /// Feasibility and duality-gap tolerance (default: 1e-8).
    pub tolerance: f64,
    /// Print solver progress (default: false).
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iter: 200,
            time_limit_secs: None,
            tolerance: 1e-8,
            verbose: false,
        }
    }
}

impl SolverSettings {
    fn to_clarabel(&self) -> DefaultSettings<f64> {
        let mut settings = DefaultSettings::<f64>::default();
        settings.verbose = self.verbose;
        settings.max_iter = self.max_iter;
        settings.time_limit = self.time_limit_secs.unwrap_or(f64::INFINITY);
        settings.tol_gap_abs = self.tolerance;
        settings.tol_gap_rel = self.tolerance;
        settings.tol_feas = self.tolerance;
        settings
    }
}

/// Clarabel-backed [`ConvexSolver`].
#[derive(Debug, Clone, Default)]
pub struct ClarabelSolver {
    settings: SolverSettings,
}

impl ClarabelSolver {
    /// Creates a solver with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver with the given settings.
    pub fn with_settings(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.settings.time_limit_secs = Some(seconds);
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

impl ConvexSolver for ClarabelSolver {
    fn solve(&self, problem: &ConvexProblem) -> SolverOutcome {
        let n = problem.var_count();
        let constraint_count = problem.constraint_count();
        let sign = match problem.direction() {
            Direction::Maximize => -1.0,
            Direction::Minimize => 1.0,
        };

        // P holds twice the quadratic coefficients on the diagonal so that
        // ½ xᵀPx reproduces Σ q_ij x_i x_j.
        let mut p_triplets = Triplets::default();
        for ((a, b), coeff) in problem.objective().quad_terms() {
            let c = sign * coeff;
            if c == 0.0 {
                continue;
            }
            let entry = if a == b { 2.0 * c } else { c };
            p_triplets.push(a.index(), b.index(), entry);
        }

        let mut q = vec![0.0; n];
        for (var, coeff) in problem.objective().linear().terms() {
            q[var.index()] += sign * coeff;
        }

        let (eq_rows, leq_rows): (Vec<usize>, Vec<usize>) = (0..constraint_count)
            .partition(|&k| problem.constraints()[k].sense == Sense::Eq);

        let mut row_of = vec![0usize; constraint_count];
        let mut a_triplets = Triplets::default();
        let mut b = Vec::with_capacity(constraint_count + n);
        for &k in eq_rows.iter().chain(&leq_rows) {
            let constraint = &problem.constraints()[k];
            let row = b.len();
            row_of[k] = row;
            for (var, coeff) in constraint.expr.terms() {
                if coeff != 0.0 {
                    a_triplets.push(row, var.index(), coeff);
                }
            }
            b.push(constraint.normalized_rhs());
        }
        for j in 0..n {
            a_triplets.push(b.len(), j, -1.0);
            b.push(0.0);
        }

        let mut cones = Vec::new();
        if !eq_rows.is_empty() {
            cones.push(SupportedConeT::ZeroConeT(eq_rows.len()));
        }
        if leq_rows.len() + n > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(leq_rows.len() + n));
        }

        let quad_terms = p_triplets.len();
        let p = p_triplets.into_csc(n, n);
        let a = a_triplets.into_csc(b.len(), n);

        debug!(
            vars = n,
            eq_rows = eq_rows.len(),
            leq_rows = leq_rows.len(),
            quad_terms,
            "solving with clarabel"
        );

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, self.settings.to_clarabel());
        solver.solve();

        let solution = &solver.solution;
        let status = map_status(&solution.status);
        debug!(?status, iterations = solution.iterations, "clarabel finished");

        if !status.has_solution() {
            let mut outcome = SolverOutcome::unsolved(status, n, constraint_count);
            outcome.iterations = solution.iterations;
            return outcome;
        }

        let x = solution.x.clone();
        let duals = (0..constraint_count)
            .map(|k| Some(-sign * solution.z[row_of[k]]))
            .collect();

        SolverOutcome {
            status,
            objective_value: Some(problem.objective().evaluate(&x)),
            values: x.into_iter().map(Some).collect(),
            duals,
            iterations: solution.iterations,
        }
    }
}

fn map_status(status: &SolverStatus) -> SolveStatus {
    match status {
        SolverStatus::Solved => SolveStatus::Optimal,
        SolverStatus::AlmostSolved => SolveStatus::OptimalInaccurate,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            SolveStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            SolveStatus::Unbounded
        }
        SolverStatus::MaxIterations => SolveStatus::IterationLimit,
        SolverStatus::MaxTime => SolveStatus::TimeLimit,
        SolverStatus::Unsolved => SolveStatus::Unsolved,
        _ => SolveStatus::NumericalError,
    }
}

/// Coordinate-form matrix entries; repeated positions are summed.
#[derive(Debug, Default)]
struct Triplets {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl Triplets {
    fn push(&mut self, row: usize, col: usize, value: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn into_csc(self, m: usize, n: usize) -> CscMatrix<f64> {
        CscMatrix::new_from_triplets(m, n, self.rows, self.cols, self.values)
    }
}
