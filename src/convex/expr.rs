//! Affine and quadratic expressions over solver variables.
//!
//! `LinearExpr` is the affine building block for constraints and the reward
//! part of the objective. `QuadExpr` adds symmetric second-order terms,
//! enough to express a variance penalty over affine expressions.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Handle to a continuous solver variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(pub(crate) usize);

impl Var {
    /// Column index of the variable in the problem.
    pub fn index(self) -> usize {
        self.0
    }
}

/// `Σ coeff_i · x_i + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    coeffs: BTreeMap<Var, f64>,
    constant: f64,
}

impl LinearExpr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        Self {
            coeffs: BTreeMap::new(),
            constant: value,
        }
    }

    /// `coeff · var`.
    pub fn term(var: Var, coeff: f64) -> Self {
        let mut expr = Self::zero();
        expr.add_term(var, coeff);
        expr
    }

    /// Adds `coeff · var` in place.
    pub fn add_term(&mut self, var: Var, coeff: f64) {
        *self.coeffs.entry(var).or_insert(0.0) += coeff;
    }

    /// Sum of `vars` with unit coefficients.
    pub fn sum(vars: &[Var]) -> Self {
        let mut expr = Self::zero();
        for &var in vars {
            expr.add_term(var, 1.0);
        }
        expr
    }

    /// Constant part.
    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Variable terms in ascending variable order.
    pub fn terms(&self) -> impl Iterator<Item = (Var, f64)> + '_ {
        self.coeffs.iter().map(|(&var, &coeff)| (var, coeff))
    }

    /// Coefficient of `var` (0.0 if absent).
    pub fn coefficient(&self, var: Var) -> f64 {
        self.coeffs.get(&var).copied().unwrap_or(0.0)
    }

    /// Evaluates the expression at `values` (indexed by variable).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms()
            .map(|(var, coeff)| coeff * values.get(var.index()).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }

    /// Product of the expression with itself.
    pub fn square(&self) -> QuadExpr {
        let mut quad = QuadExpr::zero();
        let terms: Vec<(Var, f64)> = self.terms().collect();
        for (i, &(vi, ci)) in terms.iter().enumerate() {
            quad.add_quad_term(vi, vi, ci * ci);
            for &(vj, cj) in &terms[i + 1..] {
                quad.add_quad_term(vi, vj, 2.0 * ci * cj);
            }
            quad.linear.add_term(vi, 2.0 * self.constant * ci);
        }
        quad.linear.constant = self.constant * self.constant;
        quad
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl From<Var> for LinearExpr {
    fn from(var: Var) -> Self {
        Self::term(var, 1.0)
    }
}

impl AddAssign for LinearExpr {
    fn add_assign(&mut self, rhs: Self) {
        for (var, coeff) in rhs.coeffs {
            self.add_term(var, coeff);
        }
        self.constant += rhs.constant;
    }
}

impl SubAssign for LinearExpr {
    fn sub_assign(&mut self, rhs: Self) {
        *self += -rhs;
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: Self) -> Self::Output {
        self -= rhs;
        self
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, rhs: f64) -> Self::Output {
        for coeff in self.coeffs.values_mut() {
            *coeff *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

/// `Σ q_ij · x_i · x_j + linear`, with each unordered pair stored once (`i <= j`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuadExpr {
    quad: BTreeMap<(Var, Var), f64>,
    linear: LinearExpr,
}

impl QuadExpr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Adds `coeff · a · b` in place.
    pub fn add_quad_term(&mut self, a: Var, b: Var, coeff: f64) {
        let key = if a <= b { (a, b) } else { (b, a) };
        *self.quad.entry(key).or_insert(0.0) += coeff;
    }

    /// Second-order terms as `((i, j), coeff)` with `i <= j`.
    pub fn quad_terms(&self) -> impl Iterator<Item = ((Var, Var), f64)> + '_ {
        self.quad.iter().map(|(&key, &coeff)| (key, coeff))
    }

    /// Affine part.
    pub fn linear(&self) -> &LinearExpr {
        &self.linear
    }

    /// Evaluates the expression at `values` (indexed by variable).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let value_of = |var: Var| values.get(var.index()).copied().unwrap_or(0.0);
        self.quad_terms()
            .map(|((a, b), coeff)| coeff * value_of(a) * value_of(b))
            .sum::<f64>()
            + self.linear.evaluate(values)
    }
}

impl From<LinearExpr> for QuadExpr {
    fn from(linear: LinearExpr) -> Self {
        Self {
            quad: BTreeMap::new(),
            linear,
        }
    }
}

impl AddAssign for QuadExpr {
    fn add_assign(&mut self, rhs: Self) {
        for ((a, b), coeff) in rhs.quad {
            self.add_quad_term(a, b, coeff);
        }
        self.linear += rhs.linear;
    }
}

impl AddAssign<LinearExpr> for QuadExpr {
    fn add_assign(&mut self, rhs: LinearExpr) {
        self.linear += rhs;
    }
}

impl SubAssign for QuadExpr {
    fn sub_assign(&mut self, rhs: Self) {
        *self += -rhs;
    }
}

impl Add for QuadExpr {
    type Output = QuadExpr;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sub for QuadExpr {
    type Output = QuadExpr;

    fn sub(mut self, rhs: Self) -> Self::Output {
        self -= rhs;
        self
    }
}

impl Mul<f64> for QuadExpr {
    type Output = QuadExpr;

    fn mul(mut self, rhs: f64) -> Self::Output {
        for coeff in self.quad.values_mut() {
            *coeff *= rhs;
        }
        self.linear = self.linear * rhs;
        self
    }
}

impl Neg for QuadExpr {
    type Output = QuadExpr;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}
