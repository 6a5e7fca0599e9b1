//! Convex optimization layer.
//!
//! Expressions, a backend-neutral problem container, and the Clarabel
//! backend used by the master problem. The variance fairness penalty makes
//! the master objective quadratic, so the backend must accept a convex
//! quadratic objective rather than a purely linear one.

mod backend;
mod expr;
mod problem;

pub use backend::{ClarabelSolver, SolverSettings};
pub use expr::{LinearExpr, QuadExpr, Var};
pub use problem::{
    ConstraintId, ConvexProblem, ConvexSolver, Direction, LinearConstraint, Sense, SolveStatus,
    SolverOutcome,
};
