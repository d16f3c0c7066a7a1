//! Cubic smoothing spline with a residual budget
//!
//! For a smoothing factor `s >= 0` the fitted curve `g` keeps the residual
//! sum of squares `sum (y_i - g(x_i))^2` at (or within 0.1% of) `s` while
//! being as smooth as possible:
//!
//! - `s = 0` interpolates every point with a natural cubic spline
//! - if the least-squares cubic polynomial already stays within `s`, that
//!   polynomial is the fit (the smoothest curve of degree three)
//! - otherwise the penalized natural cubic spline
//!   `min sum (y_i - g(x_i))^2 + lambda * integral g''(x)^2 dx`
//!   is solved in Reinsch form, searching `lambda` until the residual sum of
//!   squares matches `s`
//!
//! With knots at every sample the Reinsch system is
//! `(R + lambda Q^T Q) gamma = Q^T y` and `g = y - lambda Q gamma`, where
//! `gamma` holds the interior second derivatives, `Q` is the `n x (n-2)`
//! second-difference matrix and `R` the `(n-2) x (n-2)` tridiagonal
//! integration matrix.

use growth_core::{Error, Result};
use tracing::{debug, warn};

use crate::kernel::{PentadiagonalSystem, PolynomialKernel};
use crate::spline::{CubicSpline, Curve, Polynomial};

/// Degree of the fitted splines
pub const SPLINE_DEGREE: usize = 3;

/// Fewest points a cubic smoothing spline is fitted to
pub const MIN_SPLINE_POINTS: usize = SPLINE_DEGREE + 1;

/// Relative tolerance on the residual budget
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

const DEFAULT_MAX_ITERATIONS: usize = 200;
const MAX_BRACKET_STEPS: usize = 60;

/// How the final curve was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitMethod {
    /// `s = 0`, the curve passes through every point
    Interpolation,
    /// Penalized spline with the selected penalty weight
    Penalized { penalty: f64 },
    /// Least-squares cubic, the residual budget allows no curvature penalty
    Polynomial,
}

/// The fitted curve
#[derive(Debug, Clone, PartialEq)]
pub enum FittedCurve {
    Spline(CubicSpline),
    Polynomial(Polynomial),
}

impl Curve for FittedCurve {
    fn value(&self, x: f64) -> f64 {
        match self {
            FittedCurve::Spline(spline) => spline.value(x),
            FittedCurve::Polynomial(poly) => poly.value(x),
        }
    }

    fn derivative(&self, x: f64) -> f64 {
        match self {
            FittedCurve::Spline(spline) => spline.derivative(x),
            FittedCurve::Polynomial(poly) => poly.derivative(x),
        }
    }
}

/// Result of a smoothing fit
#[derive(Debug, Clone)]
pub struct SmoothingFit {
    curve: FittedCurve,
    method: FitMethod,
    residual_sum_of_squares: f64,
    iterations: usize,
}

impl SmoothingFit {
    pub fn curve(&self) -> &FittedCurve {
        &self.curve
    }

    pub fn method(&self) -> FitMethod {
        self.method
    }

    pub fn residual_sum_of_squares(&self) -> f64 {
        self.residual_sum_of_squares
    }

    /// Penalty evaluations spent searching the residual budget
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn into_curve(self) -> FittedCurve {
        self.curve
    }
}

/// Cubic smoothing-spline fitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingSpline {
    smoothing_factor: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl SmoothingSpline {
    pub fn new(smoothing_factor: f64) -> Result<Self> {
        if !smoothing_factor.is_finite() || smoothing_factor < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "smoothing factor must be a finite value >= 0, got {smoothing_factor}"
            )));
        }
        Ok(Self {
            smoothing_factor,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.smoothing_factor
    }

    /// Fit `y` over strictly increasing `x`
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<SmoothingFit> {
        if x.len() != y.len() {
            return Err(Error::size_mismatch(x.len(), y.len(), "smoothing spline"));
        }
        if x.len() < MIN_SPLINE_POINTS {
            return Err(Error::insufficient(MIN_SPLINE_POINTS, x.len()));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(Error::non_finite("smoothing spline input"));
        }
        if x.windows(2).any(|pair| !(pair[0] < pair[1])) {
            return Err(Error::InvalidInput(
                "smoothing spline abscissae must be strictly increasing".to_string(),
            ));
        }

        let system = ReinschSystem::new(x, y);
        let s = self.smoothing_factor;
        if s == 0.0 {
            let solution = system.solve(0.0)?;
            return Ok(SmoothingFit {
                curve: FittedCurve::Spline(system.spline(&solution)?),
                method: FitMethod::Interpolation,
                residual_sum_of_squares: 0.0,
                iterations: 1,
            });
        }

        let polynomial = PolynomialKernel::new(SPLINE_DEGREE).fit(x, y)?;
        let polynomial_rss: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| (yi - polynomial.value(xi)).powi(2))
            .sum();
        if polynomial_rss <= s {
            debug!(polynomial_rss, smoothing_factor = s, "residual budget admits cubic polynomial");
            return Ok(SmoothingFit {
                curve: FittedCurve::Polynomial(polynomial),
                method: FitMethod::Polynomial,
                residual_sum_of_squares: polynomial_rss,
                iterations: 0,
            });
        }

        let (solution, iterations) = self.search_penalty(&system)?;
        debug!(
            penalty = solution.penalty,
            rss = solution.rss,
            iterations,
            "penalized spline fitted"
        );
        Ok(SmoothingFit {
            curve: FittedCurve::Spline(system.spline(&solution)?),
            method: FitMethod::Penalized { penalty: solution.penalty },
            residual_sum_of_squares: solution.rss,
            iterations,
        })
    }

    /// Bisection on `ln(lambda)` for `rss(lambda) = s`
    ///
    /// The residual sum of squares grows monotonically with the penalty.
    fn search_penalty(&self, system: &ReinschSystem) -> Result<(ReinschSolution, usize)> {
        let s = self.smoothing_factor;
        let within = |solution: &ReinschSolution| (solution.rss - s).abs() <= self.tolerance * s;
        let step = std::f64::consts::LN_10;
        let mut iterations = 1;

        let start = system.solve(1.0)?;
        if within(&start) {
            return Ok((start, iterations));
        }
        let below_budget = start.rss < s;
        let mut best = start;
        let mut ln_lo: f64;
        let mut ln_hi: f64;
        if below_budget {
            ln_lo = 0.0;
            ln_hi = step;
            loop {
                let candidate = system.solve(ln_hi.exp())?;
                iterations += 1;
                if within(&candidate) {
                    return Ok((candidate, iterations));
                }
                let overshoot = candidate.rss > s;
                best = closer(best, candidate, s);
                if overshoot {
                    break;
                }
                if iterations > MAX_BRACKET_STEPS {
                    warn!(smoothing_factor = s, "penalty search could not reach residual budget");
                    return Ok((best, iterations));
                }
                ln_lo = ln_hi;
                ln_hi += step;
            }
        } else {
            ln_hi = 0.0;
            ln_lo = -step;
            loop {
                let candidate = system.solve(ln_lo.exp())?;
                iterations += 1;
                if within(&candidate) {
                    return Ok((candidate, iterations));
                }
                let undershoot = candidate.rss < s;
                best = closer(best, candidate, s);
                if undershoot {
                    break;
                }
                if iterations > MAX_BRACKET_STEPS {
                    warn!(smoothing_factor = s, "penalty search could not reach residual budget");
                    return Ok((best, iterations));
                }
                ln_hi = ln_lo;
                ln_lo -= step;
            }
        }

        while iterations < self.max_iterations {
            let ln_mid = 0.5 * (ln_lo + ln_hi);
            let candidate = system.solve(ln_mid.exp())?;
            iterations += 1;
            if within(&candidate) {
                return Ok((candidate, iterations));
            }
            if candidate.rss < s {
                ln_lo = ln_mid;
            } else {
                ln_hi = ln_mid;
            }
            best = closer(best, candidate, s);
        }
        debug!(
            smoothing_factor = s,
            rss = best.rss,
            "penalty search stopped at iteration limit"
        );
        Ok((best, iterations))
    }
}

fn closer(current: ReinschSolution, candidate: ReinschSolution, target: f64) -> ReinschSolution {
    if (candidate.rss - target).abs() < (current.rss - target).abs() {
        candidate
    } else {
        current
    }
}

#[derive(Debug, Clone)]
struct ReinschSolution {
    penalty: f64,
    /// interior second derivatives in scaled units
    gamma: Vec<f64>,
    fitted: Vec<f64>,
    rss: f64,
}

/// Band structure of the Reinsch system for fixed data
///
/// The abscissa is rescaled by the mean spacing so that the bands of `R`
/// and `Q^T Q` have comparable magnitude.
struct ReinschSystem<'a> {
    x: &'a [f64],
    y: &'a [f64],
    scale: f64,
    /// column `k` of `Q` holds `a[k], b[k], c[k]` in rows `k, k+1, k+2`
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    qty: Vec<f64>,
    r_diagonal: Vec<f64>,
    r_first: Vec<f64>,
    qtq_diagonal: Vec<f64>,
    qtq_first: Vec<f64>,
    qtq_second: Vec<f64>,
}

impl<'a> ReinschSystem<'a> {
    fn new(x: &'a [f64], y: &'a [f64]) -> Self {
        let n = x.len();
        let m = n - 2;
        let scale = (x[n - 1] - x[0]) / (n - 1) as f64;
        let h: Vec<f64> = x.windows(2).map(|pair| (pair[1] - pair[0]) / scale).collect();

        let a: Vec<f64> = (0..m).map(|k| 1.0 / h[k]).collect();
        let c: Vec<f64> = (0..m).map(|k| 1.0 / h[k + 1]).collect();
        let b: Vec<f64> = (0..m).map(|k| -a[k] - c[k]).collect();

        let qty = (0..m)
            .map(|k| a[k] * y[k] + b[k] * y[k + 1] + c[k] * y[k + 2])
            .collect();
        let r_diagonal = (0..m).map(|k| (h[k] + h[k + 1]) / 3.0).collect();
        let r_first = (0..m.saturating_sub(1)).map(|k| h[k + 1] / 6.0).collect();
        let qtq_diagonal = (0..m).map(|k| a[k] * a[k] + b[k] * b[k] + c[k] * c[k]).collect();
        let qtq_first = (0..m.saturating_sub(1))
            .map(|k| b[k] * a[k + 1] + c[k] * b[k + 1])
            .collect();
        let qtq_second = (0..m.saturating_sub(2)).map(|k| c[k] * a[k + 2]).collect();

        Self {
            x,
            y,
            scale,
            a,
            b,
            c,
            qty,
            r_diagonal,
            r_first,
            qtq_diagonal,
            qtq_first,
            qtq_second,
        }
    }

    /// `Q gamma`, one entry per data point
    fn q_times(&self, gamma: &[f64]) -> Vec<f64> {
        let n = self.x.len();
        let mut out = vec![0.0; n];
        for (k, &g) in gamma.iter().enumerate() {
            out[k] += self.a[k] * g;
            out[k + 1] += self.b[k] * g;
            out[k + 2] += self.c[k] * g;
        }
        out
    }

    fn solve(&self, penalty: f64) -> Result<ReinschSolution> {
        let diagonal = self
            .r_diagonal
            .iter()
            .zip(&self.qtq_diagonal)
            .map(|(r, q)| r + penalty * q)
            .collect();
        let first = self
            .r_first
            .iter()
            .zip(&self.qtq_first)
            .map(|(r, q)| r + penalty * q)
            .collect();
        let second = self.qtq_second.iter().map(|q| penalty * q).collect();
        let gamma = PentadiagonalSystem::new(diagonal, first, second)?.solve(&self.qty)?;

        let q_gamma = self.q_times(&gamma);
        let fitted: Vec<f64> = self
            .y
            .iter()
            .zip(&q_gamma)
            .map(|(y, qg)| y - penalty * qg)
            .collect();
        let rss = q_gamma.iter().map(|qg| (penalty * qg).powi(2)).sum();
        if fitted.iter().any(|v| !v.is_finite()) {
            return Err(Error::non_finite("smoothing spline solution"));
        }
        Ok(ReinschSolution { penalty, gamma, fitted, rss })
    }

    /// Natural cubic spline through the fitted values, in original units
    fn spline(&self, solution: &ReinschSolution) -> Result<CubicSpline> {
        let to_original = 1.0 / (self.scale * self.scale);
        let mut second = Vec::with_capacity(self.x.len());
        second.push(0.0);
        second.extend(solution.gamma.iter().map(|g| g * to_original));
        second.push(0.0);
        CubicSpline::new(self.x.to_vec(), solution.fitted.clone(), second)
    }
}
