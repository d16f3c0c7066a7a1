//! Spline fits of reactor series and tables
//!
//! The abscissa of every fit is the elapsed time in seconds since the first
//! timestamp of the series being fitted, so derivatives are in OD units per
//! second.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use growth_core::{Error, Result, Series, Timestamp, WideTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::smoothing::{FitMethod, SmoothingSpline};
use crate::spline::Curve;

/// Fitted values and first derivative of one series
#[derive(Debug, Clone)]
pub struct SplineFit {
    pub fitted: Series<f64>,
    pub derivative: Series<f64>,
    pub method: FitMethod,
    pub residual_sum_of_squares: f64,
}

/// Elapsed seconds of each timestamp since the first one
pub fn elapsed_seconds(index: &[Timestamp]) -> Vec<f64> {
    match index.first() {
        Some(&origin) => index.iter().map(|ts| ts.seconds_since(origin)).collect(),
        None => Vec::new(),
    }
}

/// Fit a smoothing spline to a series without missing values
pub fn fit_series(series: &Series<f64>, smoothing_factor: f64) -> Result<SplineFit> {
    let x = elapsed_seconds(series.index());
    let fit = SmoothingSpline::new(smoothing_factor)?.fit(&x, series.values())?;
    let curve = fit.curve();
    let fitted = Series::new(series.index().to_vec(), curve.values(&x))?;
    let derivative = Series::new(series.index().to_vec(), curve.derivatives(&x))?;
    Ok(SplineFit {
        fitted,
        derivative,
        method: fit.method(),
        residual_sum_of_squares: fit.residual_sum_of_squares(),
    })
}

/// Smoothed values and first derivative of a reactor series
///
/// Missing cells are dropped first; both outputs are indexed by the
/// remaining timestamps. Fewer than four present values is an
/// [`Error::InsufficientData`].
pub fn fit_spline_and_derivatives(
    series: &Series<Option<f64>>,
    smoothing_factor: f64,
) -> Result<(Series<f64>, Series<f64>)> {
    let fit = fit_series(&series.dropna(), smoothing_factor)?;
    Ok((fit.fitted, fit.derivative))
}

/// Fit every column of a table that has no missing cells
///
/// Output tables share the index and column names of `table`.
pub fn fit_spline_and_derivatives_one_batch(
    table: &WideTable,
    smoothing_factor: f64,
) -> Result<(WideTable, WideTable)> {
    if let Some((name, _)) = table
        .columns()
        .find(|(_, values)| values.iter().any(Option::is_none))
    {
        return Err(Error::InvalidInput(format!(
            "column '{name}' contains missing values, batch fitting requires a complete table"
        )));
    }
    let mut fitted = Vec::with_capacity(table.n_columns());
    let mut derivatives = Vec::with_capacity(table.n_columns());
    for (name, values) in table.columns() {
        let series = Series::new(
            table.index().to_vec(),
            values.iter().copied().flatten().collect(),
        )?;
        let fit = fit_series(&series, smoothing_factor)?;
        fitted.push((name.to_string(), fit.fitted));
        derivatives.push((name.to_string(), fit.derivative));
    }
    Ok((
        WideTable::from_sparse_columns(table.index().to_vec(), fitted)?,
        WideTable::from_sparse_columns(table.index().to_vec(), derivatives)?,
    ))
}

/// Smoothing factor choice for a whole table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// The same factor for every reactor
    Fixed(f64),
    /// Each reactor uses its own number of present values
    SampleCount,
}

impl Smoothing {
    /// Reject a fixed factor that no spline would accept
    pub fn validate(&self) -> Result<()> {
        if let Smoothing::Fixed(value) = self {
            SmoothingSpline::new(*value)?;
        }
        Ok(())
    }

    pub fn resolve(&self, samples: usize) -> f64 {
        match self {
            Smoothing::Fixed(value) => *value,
            Smoothing::SampleCount => samples as f64,
        }
    }
}

impl From<f64> for Smoothing {
    fn from(value: f64) -> Self {
        Smoothing::Fixed(value)
    }
}

impl From<Option<f64>> for Smoothing {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Smoothing::SampleCount, Smoothing::Fixed)
    }
}

/// A reactor that could not be fitted and why
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedReactor {
    pub reactor: String,
    pub reason: String,
}

/// Per-column fits aligned to the source index
#[derive(Debug, Clone)]
pub struct ColumnFits {
    pub fitted: WideTable,
    pub derivatives: WideTable,
    pub skipped: Vec<SkippedReactor>,
}

/// Fit every column independently after dropping its missing cells
///
/// A reactor that cannot be fitted keeps an all-missing column and is
/// listed in [`ColumnFits::skipped`]; the other reactors are unaffected.
pub fn fit_spline_and_derivatives_per_column(
    table: &WideTable,
    smoothing: Smoothing,
) -> Result<ColumnFits> {
    smoothing.validate()?;

    let columns: Vec<(&str, Series<f64>)> = table
        .columns()
        .map(|(name, values)| {
            let (index, values): (Vec<Timestamp>, Vec<f64>) = table
                .index()
                .iter()
                .zip(values)
                .filter_map(|(ts, value)| value.map(|v| (*ts, v)))
                .unzip();
            Series::new(index, values).map(|series| (name, series))
        })
        .collect::<Result<_>>()?;

    let fit_one = |(name, series): &(&str, Series<f64>)| {
        let smoothing_factor = smoothing.resolve(series.len());
        (name.to_string(), fit_series(series, smoothing_factor))
    };
    #[cfg(feature = "parallel")]
    let results: Vec<(String, Result<SplineFit>)> = columns.par_iter().map(fit_one).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<(String, Result<SplineFit>)> = columns.iter().map(fit_one).collect();

    let mut fitted = Vec::with_capacity(results.len());
    let mut derivatives = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (reactor, result) in results {
        match result {
            Ok(fit) => {
                debug!(
                    reactor = %reactor,
                    method = ?fit.method,
                    rss = fit.residual_sum_of_squares,
                    "reactor fitted"
                );
                fitted.push((reactor.clone(), fit.fitted));
                derivatives.push((reactor, fit.derivative));
            }
            Err(err) => {
                warn!(reactor = %reactor, error = %err, "skipping reactor");
                fitted.push((reactor.clone(), Series::empty()));
                derivatives.push((reactor.clone(), Series::empty()));
                skipped.push(SkippedReactor { reactor, reason: err.to_string() });
            }
        }
    }

    Ok(ColumnFits {
        fitted: WideTable::from_sparse_columns(table.index().to_vec(), fitted)?,
        derivatives: WideTable::from_sparse_columns(table.index().to_vec(), derivatives)?,
        skipped,
    })
}

/// Suggested bounds for the smoothing factor of `m` samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingRange {
    pub min: usize,
    pub default: usize,
    pub max: usize,
}

/// `(m - floor(sqrt(2m)), m, m + floor(sqrt(2m)))`
pub fn get_smoothing_range(m: usize) -> SmoothingRange {
    let target = 2 * m;
    let mut root = (target as f64).sqrt() as usize;
    while root * root > target {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= target {
        root += 1;
    }
    SmoothingRange {
        min: m.saturating_sub(root),
        default: m,
        max: m + root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_series(n: usize, slope_per_sec: f64) -> Series<Option<f64>> {
        Series::new(
            (0..n as i64).map(|i| Timestamp::from_secs(1_000 + i * 30)).collect(),
            (0..n).map(|i| Some(0.1 + slope_per_sec * 30.0 * i as f64)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_smoothing_range() {
        assert_eq!(
            get_smoothing_range(100),
            SmoothingRange { min: 86, default: 100, max: 114 }
        );
        // sqrt(8) = 2.83
        assert_eq!(
            get_smoothing_range(4),
            SmoothingRange { min: 2, default: 4, max: 6 }
        );
        // sqrt(2) rounds down to 1
        assert_eq!(get_smoothing_range(1), SmoothingRange { min: 0, default: 1, max: 2 });
        assert_eq!(get_smoothing_range(0), SmoothingRange { min: 0, default: 0, max: 0 });
        // perfect square: 2 * 50 = 100
        assert_eq!(get_smoothing_range(50).max, 60);
    }

    #[test]
    fn test_linear_derivative_is_slope_per_second() {
        let series = linear_series(60, 1e-4);
        for &s in &[0.5, 5.0, 100.0] {
            let (fitted, derivative) = fit_spline_and_derivatives(&series, s).unwrap();
            assert_eq!(fitted.len(), 60);
            for value in derivative.values() {
                assert_relative_eq!(*value, 1e-4, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let mut values: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        values[3] = None;
        values[7] = None;
        let series = Series::new(
            (0..10).map(Timestamp::from_secs).collect(),
            values,
        )
        .unwrap();
        let (fitted, derivative) = fit_spline_and_derivatives(&series, 0.0).unwrap();
        assert_eq!(fitted.len(), 8);
        assert_eq!(derivative.index(), fitted.index());
        assert!(fitted.get(Timestamp::from_secs(3)).is_none());
    }

    #[test]
    fn test_insufficient_data() {
        let series = Series::new(
            (0..5).map(Timestamp::from_secs).collect(),
            vec![Some(1.0), None, Some(2.0), None, Some(3.0)],
        )
        .unwrap();
        assert!(matches!(
            fit_spline_and_derivatives(&series, 1.0),
            Err(Error::InsufficientData { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_one_batch_requires_complete_table() {
        let index: Vec<Timestamp> = (0..6).map(|i| Timestamp::from_secs(i * 10)).collect();
        let complete = WideTable::new(
            index.clone(),
            vec![
                ("A".to_string(), (0..6).map(|i| Some(i as f64)).collect()),
                ("B".to_string(), (0..6).map(|i| Some(2.0 * i as f64)).collect()),
            ],
        )
        .unwrap();
        let (fitted, derivatives) = fit_spline_and_derivatives_one_batch(&complete, 1.0).unwrap();
        assert_eq!(fitted.column_names(), complete.column_names());
        assert_relative_eq!(derivatives.get(index[2], "B").unwrap().unwrap(), 0.2, epsilon = 1e-9);

        let mut values: Vec<Option<f64>> = (0..6).map(|i| Some(i as f64)).collect();
        values[2] = None;
        let gappy = WideTable::new(index, vec![("A".to_string(), values)]).unwrap();
        assert!(matches!(
            fit_spline_and_derivatives_one_batch(&gappy, 1.0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_per_column_skips_short_reactors() {
        let index: Vec<Timestamp> = (0..8).map(|i| Timestamp::from_secs(i * 30)).collect();
        let table = WideTable::new(
            index,
            vec![
                ("A".to_string(), (0..8).map(|i| Some(0.1 * i as f64)).collect()),
                ("B".to_string(), vec![Some(1.0), None, None, None, None, None, None, Some(2.0)]),
            ],
        )
        .unwrap();
        let fits = fit_spline_and_derivatives_per_column(&table, Smoothing::SampleCount).unwrap();
        assert_eq!(fits.skipped.len(), 1);
        assert_eq!(fits.skipped[0].reactor, "B");
        assert!(fits.fitted.column("B").unwrap().iter().all(Option::is_none));
        assert!(fits.derivatives.column("A").unwrap().iter().all(Option::is_some));

        assert!(matches!(
            fit_spline_and_derivatives_per_column(&table, Smoothing::Fixed(-1.0)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_smoothing_choice() {
        assert_eq!(Smoothing::from(None), Smoothing::SampleCount);
        assert_eq!(Smoothing::from(Some(10.0)).resolve(500), 10.0);
        assert_eq!(Smoothing::SampleCount.resolve(500), 500.0);
        assert_eq!(Smoothing::from(2.5), Smoothing::Fixed(2.5));
        assert!(Smoothing::Fixed(f64::NAN).validate().is_err());
    }
}
