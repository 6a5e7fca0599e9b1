//! Agent model.
//!
//! Agents are the competing parties that propose columns. The master problem
//! only needs read access to an agent's horizon, fixed cost vector and
//! current column set, captured by [`ColumnSource`]. [`Agent`] is a plain
//! in-memory implementation for callers that generate columns elsewhere.

use serde::{Deserialize, Serialize};

use super::Column;

/// Read-only view of an agent consumed by the master problem.
///
/// All agents of one master problem must report the same horizon, and
/// `fixed_cost_vector()` must have exactly `horizon()` entries.
pub trait ColumnSource {
    /// Number of periods in the planning horizon.
    fn horizon(&self) -> usize;

    /// Per-period cost of one claimed resource unit.
    fn fixed_cost_vector(&self) -> &[f64];

    /// The agent's current ordered column set.
    fn columns(&self) -> &[Column];
}

/// An agent holding its columns in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier.
    pub id: String,
    /// Planning horizon length.
    pub horizon: usize,
    /// Per-period resource cost (default: zeros).
    pub fixed_cost_vector: Vec<f64>,
    /// Candidate columns, in generation order.
    pub columns: Vec<Column>,
}

impl Agent {
    /// Creates an agent with zero fixed costs and no columns.
    pub fn new(id: impl Into<String>, horizon: usize) -> Self {
        Self {
            id: id.into(),
            horizon,
            fixed_cost_vector: vec![0.0; horizon],
            columns: Vec::new(),
        }
    }

    /// Sets the per-period fixed cost vector.
    pub fn with_fixed_costs(mut self, costs: Vec<f64>) -> Self {
        self.fixed_cost_vector = costs;
        self
    }

    /// Adds a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a newly generated column.
    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Number of columns currently held.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

impl ColumnSource for Agent {
    fn horizon(&self) -> usize {
        self.horizon
    }

    fn fixed_cost_vector(&self) -> &[f64] {
        &self.fixed_cost_vector
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl<T: ColumnSource + ?Sized> ColumnSource for &T {
    fn horizon(&self) -> usize {
        (**self).horizon()
    }

    fn fixed_cost_vector(&self) -> &[f64] {
        (**self).fixed_cost_vector()
    }

    fn columns(&self) -> &[Column] {
        (**self).columns()
    }
}

impl<T: ColumnSource + ?Sized> ColumnSource for Box<T> {
    fn horizon(&self) -> usize {
        (**self).horizon()
    }

    fn fixed_cost_vector(&self) -> &[f64] {
        (**self).fixed_cost_vector()
    }

    fn columns(&self) -> &[Column] {
        (**self).columns()
    }
}
