//! Variance fairness primitives.
//!
//! The fairness penalty is the population variance of a vector of expected
//! claims, one entry per agent:
//!
//! ```text
//! var(x) = (1/n) Σ_i (x_i − x̄)²        ∂var/∂x_i = 2 (x_i − x̄) / n
//! ```
//!
//! The same deviation-from-mean definition serves two call paths:
//! [`variance_penalty`] over solver expressions (embedded in the objective)
//! and [`variance_penalty_value`] / [`variance_penalty_gradient`] over solved
//! floats (post-solve reporting and pricing). Both go through
//! [`Dispersion`], so the realized penalty matches the optimized term.
//!
//! An empty vector has zero variance and an empty gradient.

use std::ops::{Add, Mul, Sub};

use crate::convex::{LinearExpr, QuadExpr};

/// A value that supports the affine operations variance needs.
pub trait Dispersion: Clone + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> {
    /// Result of squaring a value.
    type Square: Add<Output = Self::Square> + Mul<f64, Output = Self::Square>;

    /// Additive identity.
    fn zero() -> Self;

    /// Additive identity of the squared type.
    fn zero_square() -> Self::Square;

    /// `self · self`.
    fn square(&self) -> Self::Square;
}

impl Dispersion for f64 {
    type Square = f64;

    fn zero() -> Self {
        0.0
    }

    fn zero_square() -> Self::Square {
        0.0
    }

    fn square(&self) -> Self::Square {
        self * self
    }
}

impl Dispersion for LinearExpr {
    type Square = QuadExpr;

    fn zero() -> Self {
        LinearExpr::zero()
    }

    fn zero_square() -> Self::Square {
        QuadExpr::zero()
    }

    fn square(&self) -> Self::Square {
        LinearExpr::square(self)
    }
}

/// Deviations from the mean, `x_i − x̄`.
pub fn deviations<T: Dispersion>(values: &[T]) -> Vec<T> {
    if values.is_empty() {
        return Vec::new();
    }
    let inv_n = 1.0 / values.len() as f64;
    let mean = values
        .iter()
        .cloned()
        .fold(T::zero(), |acc, v| acc + v)
        * inv_n;
    values.iter().map(|v| v.clone() - mean.clone()).collect()
}

/// Population variance over any [`Dispersion`] value.
pub fn variance<T: Dispersion>(values: &[T]) -> T::Square {
    if values.is_empty() {
        return T::zero_square();
    }
    let inv_n = 1.0 / values.len() as f64;
    deviations(values)
        .iter()
        .map(Dispersion::square)
        .fold(T::zero_square(), |acc, sq| acc + sq)
        * inv_n
}

/// Variance of affine expressions, as a quadratic objective term.
pub fn variance_penalty(values: &[LinearExpr]) -> QuadExpr {
    variance(values)
}

/// Variance of plain floats.
pub fn variance_penalty_value(values: &[f64]) -> f64 {
    variance(values)
}

/// Partial derivatives of the variance with respect to each entry.
pub fn variance_penalty_gradient(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let scale = 2.0 / values.len() as f64;
    deviations(values).into_iter().map(|d| d * scale).collect()
}
