//! Smoothing splines and growth rates for optical-density series
//!
//! This crate fits cubic smoothing splines over elapsed seconds and
//! evaluates their analytic first derivative (the growth rate).
//!
//! ## Components
//! - [`SmoothingSpline`]: residual-budget smoothing spline (`s = 0`
//!   interpolates, larger `s` is smoother)
//! - [`CubicSpline`], [`Polynomial`]: fitted curves behind the [`Curve`] trait
//! - [`fit_spline_and_derivatives`]: one reactor series
//! - [`fit_spline_and_derivatives_one_batch`]: a complete table
//! - [`fit_spline_and_derivatives_per_column`]: a gappy table, skipping
//!   reactors that cannot be fitted
//! - [`get_smoothing_range`]: suggested smoothing bounds from the sample count
//!
//! ## Usage
//!
//! ```rust
//! use growth_core::{Series, Timestamp};
//! use growth_spline::fit_spline_and_derivatives;
//!
//! let index: Vec<_> = (0..50).map(|i| Timestamp::from_secs(i * 30)).collect();
//! let values: Vec<_> = (0..50).map(|i| Some(0.05 + 0.003 * i as f64)).collect();
//! let series = Series::new(index, values).unwrap();
//!
//! let (fitted, growth_rate) = fit_spline_and_derivatives(&series, 1.0).unwrap();
//! assert_eq!(fitted.len(), 50);
//! // 0.003 OD per 30 s
//! assert!((growth_rate.values()[10] - 1e-4).abs() < 1e-9);
//! ```

pub mod fit;
pub mod kernel;
pub mod smoothing;
pub mod spline;

pub use fit::{
    elapsed_seconds, fit_series, fit_spline_and_derivatives,
    fit_spline_and_derivatives_one_batch, fit_spline_and_derivatives_per_column,
    get_smoothing_range, ColumnFits, SkippedReactor, Smoothing, SmoothingRange, SplineFit,
};
pub use kernel::{PentadiagonalSystem, PolynomialKernel};
pub use smoothing::{
    FitMethod, FittedCurve, SmoothingFit, SmoothingSpline, MIN_SPLINE_POINTS, SPLINE_DEGREE,
};
pub use spline::{CubicSpline, Curve, Polynomial};
