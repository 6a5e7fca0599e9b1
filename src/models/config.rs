//! Master problem configuration.
//!
//! Persistent settings of a master problem instance. Everything else
//! (variables, constraints, solved values) is rebuilt on each solve.
//!
//! Fairness scope and type are read from free-form strings, so an
//! unrecognized value survives loading and is rejected where it is used.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which expected claims the fairness penalty compares across agents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FairnessScope {
    /// One variance term per period, summed over the horizon.
    #[default]
    Timestep,
    /// One variance term over each agent's horizon-summed claim.
    Cumulative,
    /// Unrecognized scope name (rejected at use).
    Unknown(String),
}

impl FairnessScope {
    /// Canonical configuration name.
    pub fn as_str(&self) -> &str {
        match self {
            FairnessScope::Timestep => "timestep",
            FairnessScope::Cumulative => "cumulative",
            FairnessScope::Unknown(name) => name,
        }
    }
}

impl From<&str> for FairnessScope {
    fn from(name: &str) -> Self {
        match name {
            "timestep" => FairnessScope::Timestep,
            "cumulative" => FairnessScope::Cumulative,
            other => FairnessScope::Unknown(other.to_string()),
        }
    }
}

impl From<String> for FairnessScope {
    fn from(name: String) -> Self {
        FairnessScope::from(name.as_str())
    }
}

impl From<FairnessScope> for String {
    fn from(scope: FairnessScope) -> Self {
        scope.as_str().to_string()
    }
}

impl fmt::Display for FairnessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispersion measure used as the fairness penalty.
///
/// Only variance is implemented; any other name is carried through
/// configuration and rejected when the penalty is built or evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FairnessType {
    /// Population variance of expected claims.
    #[default]
    Variance,
    /// Named metric without an implementation.
    Other(String),
}

impl FairnessType {
    /// Canonical configuration name.
    pub fn as_str(&self) -> &str {
        match self {
            FairnessType::Variance => "variance",
            FairnessType::Other(name) => name,
        }
    }
}

impl From<&str> for FairnessType {
    fn from(name: &str) -> Self {
        match name {
            "variance" => FairnessType::Variance,
            other => FairnessType::Other(other.to_string()),
        }
    }
}

impl From<String> for FairnessType {
    fn from(name: String) -> Self {
        FairnessType::from(name.as_str())
    }
}

impl From<FairnessType> for String {
    fn from(kind: FairnessType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FairnessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Master problem configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// Shared capacity per period (default: 1.0).
    pub resource_capacity: f64,
    /// Weight of the fairness penalty in the objective (default: 1.0).
    /// The penalty is omitted when this is not positive.
    pub langrangian_weight: f64,
    /// Fairness metric (default: variance).
    pub fairness_type: FairnessType,
    /// Fairness scope (default: timestep).
    pub fairness_scope: FairnessScope,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            resource_capacity: 1.0,
            langrangian_weight: 1.0,
            fairness_type: FairnessType::Variance,
            fairness_scope: FairnessScope::Timestep,
        }
    }
}

impl MasterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-period resource capacity.
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.resource_capacity = capacity;
        self
    }

    /// Sets the fairness penalty weight.
    pub fn with_langrangian_weight(mut self, weight: f64) -> Self {
        self.langrangian_weight = weight;
        self
    }

    /// Sets the fairness scope.
    pub fn with_fairness_scope(mut self, scope: impl Into<FairnessScope>) -> Self {
        self.fairness_scope = scope.into();
        self
    }

    /// Sets the fairness metric.
    pub fn with_fairness_type(mut self, kind: impl Into<FairnessType>) -> Self {
        self.fairness_type = kind.into();
        self
    }

    /// Whether the fairness penalty enters the objective.
    pub fn penalizes_fairness(&self) -> bool {
        self.langrangian_weight > 0.0
    }

    /// Checks numeric settings. Scope and type are checked where used.
    pub fn validate(&self) -> Result<(), String> {
        if !self.resource_capacity.is_finite() {
            return Err(format!(
                "resource_capacity must be finite (got {})",
                self.resource_capacity
            ));
        }
        if !self.langrangian_weight.is_finite() {
            return Err(format!(
                "langrangian_weight must be finite (got {})",
                self.langrangian_weight
            ));
        }
        Ok(())
    }
}
