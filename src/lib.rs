//! Fair column-generation master problem for the U-Engine ecosystem.
//!
//! Agents propose multi-period plans ("columns"); the master problem mixes
//! each agent's columns into a probability distribution so that shared
//! capacity holds in expectation at every period, while maximizing expected
//! net reward minus a variance fairness penalty. After each solve it exposes
//! the capacity shadow prices and fairness gradients that steer the next
//! round of column generation.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Agent`, `Column`, `ColumnSource`,
//!   `MasterConfig`, `FairnessScope`, `FairnessType`
//! - **`master`**: `MasterProblem` (formulate, solve, extract),
//!   `MasterSolution`, `PricingSignals`, `AllocationKpi`
//! - **`fairness`**: Variance penalty, its gradient, and the symbolic form
//!   used inside the objective
//! - **`convex`**: Affine/quadratic expressions, the `ConvexSolver` seam and
//!   the Clarabel backend
//! - **`validation`**: Input integrity checks (horizons, lengths, empty
//!   column sets)
//!
//! # Architecture
//!
//! This crate implements one master step of the column-generation loop. The
//! loop itself and the agents' pricing subproblems live with the caller.
//!
//! # References
//!
//! - Dantzig & Wolfe (1960), "Decomposition Principle for Linear Programs"
//! - Desaulniers, Desrosiers & Solomon (2005), "Column Generation"
//! - Bertsimas, Farias & Trichakis (2011), "The Price of Fairness"

pub mod convex;
pub mod error;
pub mod fairness;
pub mod master;
pub mod models;
pub mod validation;

pub use error::MasterError;
pub use master::{AllocationKpi, MasterProblem, MasterSolution, PricingSignals};
