//! Piecewise-cubic and polynomial curves with analytic first derivatives

use growth_core::{Error, Result};

use crate::kernel::normalize;

/// A smooth curve of one variable
pub trait Curve {
    fn value(&self, x: f64) -> f64;

    /// First derivative with respect to `x`
    fn derivative(&self, x: f64) -> f64;

    fn values(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.value(x)).collect()
    }

    fn derivatives(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.derivative(x)).collect()
    }
}

/// Cubic spline in second-derivative form
///
/// On `[x_i, x_{i+1}]` with `h = x_{i+1} - x_i`, `A = (x_{i+1} - x) / h` and
/// `B = 1 - A`:
///
/// `S(x) = A g_i + B g_{i+1} + ((A^3 - A) m_i + (B^3 - B) m_{i+1}) h^2 / 6`
///
/// where `g` are the knot values and `m` the second derivatives. Outside the
/// knot range the first or last piece is extended.
#[derive(Clone, Debug, PartialEq)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    pub fn new(knots: Vec<f64>, values: Vec<f64>, second_derivatives: Vec<f64>) -> Result<Self> {
        if knots.len() < 2 {
            return Err(Error::insufficient(2, knots.len()));
        }
        if values.len() != knots.len() {
            return Err(Error::size_mismatch(knots.len(), values.len(), "spline values"));
        }
        if second_derivatives.len() != knots.len() {
            return Err(Error::size_mismatch(
                knots.len(),
                second_derivatives.len(),
                "spline second derivatives",
            ));
        }
        if knots.windows(2).any(|pair| !(pair[0] < pair[1])) {
            return Err(Error::InvalidInput(
                "spline knots must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { knots, values, second_derivatives })
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn knot_values(&self) -> &[f64] {
        &self.values
    }

    pub fn second_derivatives(&self) -> &[f64] {
        &self.second_derivatives
    }

    /// Index of the piece that evaluates `x`
    fn piece(&self, x: f64) -> usize {
        let last_piece = self.knots.len() - 2;
        self.knots
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(last_piece)
    }

    fn local(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = self.piece(x);
        let h = self.knots[i + 1] - self.knots[i];
        let a = (self.knots[i + 1] - x) / h;
        (i, h, a, 1.0 - a)
    }
}

impl Curve for CubicSpline {
    fn value(&self, x: f64) -> f64 {
        let (i, h, a, b) = self.local(x);
        let (m0, m1) = (self.second_derivatives[i], self.second_derivatives[i + 1]);
        a * self.values[i]
            + b * self.values[i + 1]
            + ((a * a * a - a) * m0 + (b * b * b - b) * m1) * h * h / 6.0
    }

    fn derivative(&self, x: f64) -> f64 {
        let (i, h, a, b) = self.local(x);
        let (m0, m1) = (self.second_derivatives[i], self.second_derivatives[i + 1]);
        (self.values[i + 1] - self.values[i]) / h - (3.0 * a * a - 1.0) * h * m0 / 6.0
            + (3.0 * b * b - 1.0) * h * m1 / 6.0
    }
}

/// Polynomial in the normalized variable `t = 2 (x - x_min) / (x_max - x_min) - 1`
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
    x_min: f64,
    x_max: f64,
}

impl Polynomial {
    /// `coefficients[j]` multiplies `t^j`
    pub fn new(coefficients: Vec<f64>, x_min: f64, x_max: f64) -> Self {
        Self { coefficients, x_min, x_max }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }
}

impl Curve for Polynomial {
    fn value(&self, x: f64) -> f64 {
        let t = normalize(x, self.x_min, self.x_max);
        self.coefficients.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    fn derivative(&self, x: f64) -> f64 {
        let t = normalize(x, self.x_min, self.x_max);
        let dt_dx = 2.0 / (self.x_max - self.x_min);
        let dp_dt = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (j, &c)| acc * t + j as f64 * c);
        dp_dt * dt_dx
    }
}
