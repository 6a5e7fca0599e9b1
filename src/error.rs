//! Master problem errors.
//!
//! Configuration and unimplemented-feature errors are fatal and returned
//! before any solver work. Solver failures are not errors: they are reported
//! through [`SolveStatus`](crate::convex::SolveStatus).

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by the master problem.
#[derive(Debug, Error)]
pub enum MasterError {
    #[error("Unknown fairness_scope option: {0}")]
    UnknownFairnessScope(String),

    #[error("Only variance fairness is implemented (got {0})")]
    UnsupportedFairnessType(String),

    #[error("Invalid master configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid master input: {}", format_validation(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error("Master problem has not been solved yet")]
    NotSolved,
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_messages() {
        let e = MasterError::UnknownFairnessScope("weekly".into());
        assert_eq!(e.to_string(), "Unknown fairness_scope option: weekly");

        let e = MasterError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::NoAgents, "no agents"),
            ValidationError::new(ValidationErrorKind::EmptyColumnSet, "agent 1 has no columns"),
        ]);
        assert_eq!(
            e.to_string(),
            "Invalid master input: no agents; agent 1 has no columns"
        );
    }
}
