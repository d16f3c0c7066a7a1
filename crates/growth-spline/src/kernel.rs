//! Linear-algebra kernels behind the curve fits
//!
//! - [`PolynomialKernel`]: least-squares polynomial on a normalized abscissa
//! - [`PentadiagonalSystem`]: banded symmetric solver used by the smoothing
//!   spline, one factorization per penalty weight

use growth_core::{Error, Result};
use nalgebra::{DMatrix, DVector};

use crate::spline::Polynomial;

/// Kernel for polynomial least-squares fits
///
/// The abscissa is mapped onto `[-1, 1]` before building the design matrix
/// so that elapsed times of many hours stay well conditioned.
#[derive(Clone, Debug)]
pub struct PolynomialKernel {
    degree: usize,
}

impl PolynomialKernel {
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Build design matrix for polynomial regression
    /// X[i,j] = t[i]^j for j in 0..=degree
    pub fn build_design_matrix(&self, t: &[f64]) -> DMatrix<f64> {
        let n = t.len();
        let mut matrix = DMatrix::zeros(n, self.degree + 1);
        for (i, &ti) in t.iter().enumerate() {
            let mut power = 1.0;
            for col in 0..=self.degree {
                matrix[(i, col)] = power;
                power *= ti;
            }
        }
        matrix
    }

    /// Solve the normal equations X^T X β = X^T y
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<Polynomial> {
        if x.len() != y.len() {
            return Err(Error::size_mismatch(x.len(), y.len(), "polynomial fit"));
        }
        if x.len() <= self.degree {
            return Err(Error::insufficient(self.degree + 1, x.len()));
        }
        let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(x_max > x_min) {
            return Err(Error::InvalidInput(
                "polynomial fit needs at least two distinct abscissae".to_string(),
            ));
        }

        let t: Vec<f64> = x.iter().map(|&xi| normalize(xi, x_min, x_max)).collect();
        let design = self.build_design_matrix(&t);
        let xt = design.transpose();
        let xtx = &xt * &design;
        let xty = &xt * DVector::from_column_slice(y);

        let coefficients = match xtx.clone().cholesky() {
            Some(chol) => chol.solve(&xty),
            None => {
                // Fallback to SVD for rank-deficient cases
                xtx.svd(true, true).solve(&xty, 1e-10).map_err(|_| {
                    Error::Computation("Failed to solve polynomial system".to_string())
                })?
            }
        };
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::non_finite("polynomial coefficients"));
        }
        Ok(Polynomial::new(coefficients.as_slice().to_vec(), x_min, x_max))
    }
}

/// Map `x` from `[x_min, x_max]` onto `[-1, 1]`
pub(crate) fn normalize(x: f64, x_min: f64, x_max: f64) -> f64 {
    2.0 * (x - x_min) / (x_max - x_min) - 1.0
}

/// Symmetric pentadiagonal matrix
///
/// `diagonal[j] = A[j][j]`, `first[j] = A[j][j+1]`, `second[j] = A[j][j+2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PentadiagonalSystem {
    pub diagonal: Vec<f64>,
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

impl PentadiagonalSystem {
    pub fn new(diagonal: Vec<f64>, first: Vec<f64>, second: Vec<f64>) -> Result<Self> {
        let n = diagonal.len();
        if first.len() != n.saturating_sub(1) || second.len() != n.saturating_sub(2) {
            return Err(Error::InvalidInput(format!(
                "pentadiagonal bands of size {n} need {} and {} off-diagonal entries",
                n.saturating_sub(1),
                n.saturating_sub(2)
            )));
        }
        Ok(Self { diagonal, first, second })
    }

    pub fn len(&self) -> usize {
        self.diagonal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagonal.is_empty()
    }

    /// Solve `A z = rhs` with an LDL^T factorization
    ///
    /// Fails when the matrix is not positive definite.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = self.len();
        if rhs.len() != n {
            return Err(Error::size_mismatch(n, rhs.len(), "pentadiagonal right-hand side"));
        }

        // L is unit lower triangular with two sub-diagonals l1, l2
        let mut d = vec![0.0; n];
        let mut l1 = vec![0.0; n.saturating_sub(1)];
        let mut l2 = vec![0.0; n.saturating_sub(2)];
        for j in 0..n {
            let mut dj = self.diagonal[j];
            if j >= 1 {
                dj -= l1[j - 1] * l1[j - 1] * d[j - 1];
            }
            if j >= 2 {
                dj -= l2[j - 2] * l2[j - 2] * d[j - 2];
            }
            if !(dj > 0.0) || !dj.is_finite() {
                return Err(Error::Computation(format!(
                    "pentadiagonal system is not positive definite at row {j}"
                )));
            }
            d[j] = dj;
            if j + 1 < n {
                let mut e = self.first[j];
                if j >= 1 {
                    e -= l2[j - 1] * l1[j - 1] * d[j - 1];
                }
                l1[j] = e / dj;
            }
            if j + 2 < n {
                l2[j] = self.second[j] / dj;
            }
        }

        // forward: L w = rhs
        let mut z = rhs.to_vec();
        for j in 0..n {
            if j >= 1 {
                z[j] -= l1[j - 1] * z[j - 1];
            }
            if j >= 2 {
                z[j] -= l2[j - 2] * z[j - 2];
            }
        }
        for j in 0..n {
            z[j] /= d[j];
        }
        // backward: L^T z = w / D
        for j in (0..n).rev() {
            if j + 1 < n {
                z[j] -= l1[j] * z[j + 1];
            }
            if j + 2 < n {
                z[j] -= l2[j] * z[j + 2];
            }
        }
        Ok(z)
    }
}
