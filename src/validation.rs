//! Input validation for master problems.
//!
//! Checks the agents' data before a formulation is built. Detects:
//! - Missing agents
//! - Horizon disagreement between agents
//! - Fixed cost vectors and columns of the wrong length
//! - Agents without any column (no distribution can sum to 1)
//! - Negative claims and non-finite numbers
//!
//! All problems are collected; validation does not stop at the first one.

use crate::models::ColumnSource;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The master problem has no agents.
    NoAgents,
    /// An agent's horizon differs from the master's.
    HorizonMismatch,
    /// A fixed cost vector does not have horizon length.
    FixedCostLength,
    /// An agent supplies no columns.
    EmptyColumnSet,
    /// A column's claims or reward do not have horizon length.
    ColumnLength,
    /// A column claims a negative amount.
    NegativeClaim,
    /// NaN or infinite value in costs, claims or rewards.
    NonFiniteValue,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates agents against the master horizon.
///
/// Checks:
/// 1. At least one agent
/// 2. Every agent reports `horizon`
/// 3. Every fixed cost vector has `horizon` finite entries
/// 4. Every agent has at least one column
/// 5. Every column has `horizon` claims and rewards, all finite
/// 6. No claim is negative
pub fn validate_agents<A: ColumnSource>(horizon: usize, agents: &[A]) -> ValidationResult {
    let mut errors = Vec::new();

    if agents.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoAgents,
            "Master problem has no agents",
        ));
    }

    for (a, agent) in agents.iter().enumerate() {
        if agent.horizon() != horizon {
            errors.push(ValidationError::new(
                ValidationErrorKind::HorizonMismatch,
                format!(
                    "Agent {a} has horizon {} (expected {horizon})",
                    agent.horizon()
                ),
            ));
        }

        let costs = agent.fixed_cost_vector();
        if costs.len() != horizon {
            errors.push(ValidationError::new(
                ValidationErrorKind::FixedCostLength,
                format!(
                    "Agent {a} fixed cost vector has {} entries (expected {horizon})",
                    costs.len()
                ),
            ));
        }
        if costs.iter().any(|c| !c.is_finite()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonFiniteValue,
                format!("Agent {a} fixed cost vector contains a non-finite value"),
            ));
        }

        let columns = agent.columns();
        if columns.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyColumnSet,
                format!("Agent {a} has no columns"),
            ));
        }

        for (c, column) in columns.iter().enumerate() {
            if column.claims.len() != horizon || column.reward.len() != horizon {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ColumnLength,
                    format!(
                        "Agent {a} column {c} has {} claims and {} rewards (expected {horizon})",
                        column.claims.len(),
                        column.reward.len()
                    ),
                ));
            }
            if column
                .claims
                .iter()
                .chain(&column.reward)
                .any(|v| !v.is_finite())
            {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NonFiniteValue,
                    format!("Agent {a} column {c} contains a non-finite value"),
                ));
            }
            if column.claims.iter().any(|&v| v < 0.0) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NegativeClaim,
                    format!("Agent {a} column {c} has a negative claim"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
