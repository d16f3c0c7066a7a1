//! Local-maximum peak detection with distance and prominence filters
//!
//! The filters run in a fixed order:
//!
//! 1. local maxima, a flat plateau reports its middle sample
//! 2. minimum horizontal distance in samples, higher peaks win
//! 3. minimum prominence, the height above the higher of the two
//!    surrounding minima

use growth_core::{Error, Result, Series, WideTable};
use tracing::debug;

use crate::traits::{PeakSource, PeakSourceProperties};
use crate::types::{PeakSeries, PeakTable, PeakValue};

/// Default minimum distance between peaks, in samples
pub const DEFAULT_MINIMUM_DISTANCE: usize = 300;

/// Fraction of the series maximum used when no prominence is given
pub const ADAPTIVE_PROMINENCE_FRACTION: f64 = 0.2;

/// Indices of local maxima
///
/// A maximum must be strictly higher than its neighbours; for a plateau of
/// equal values the middle index (rounded down) is reported. Endpoints are
/// never maxima.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }
            if x[i_ahead] < x[i] {
                let left = i;
                let right = i_ahead - 1;
                peaks.push((left + right) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Keep peaks at least `distance` samples apart
///
/// Peaks are visited from highest to lowest (ties keep index order) and
/// each kept peak removes all lower-priority neighbours closer than
/// `distance`.
pub fn select_by_peak_distance(peaks: &[usize], x: &[f64], distance: usize) -> Vec<usize> {
    let n = peaks.len();
    let mut keep = vec![true; n];
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[peaks[a]].total_cmp(&x[peaks[b]]));

    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&peak, kept)| kept.then_some(peak))
        .collect()
}

/// Prominence of each peak
///
/// From the peak, walk left and right while the signal stays at or below the
/// peak height, tracking the minimum on each side. The prominence is the
/// peak height minus the higher of the two minima.
pub fn peak_prominences(x: &[f64], peaks: &[usize]) -> Vec<f64> {
    peaks
        .iter()
        .map(|&peak| {
            let height = x[peak];

            let mut left_min = height;
            let mut i = peak;
            loop {
                if x[i] > height {
                    break;
                }
                left_min = left_min.min(x[i]);
                if i == 0 {
                    break;
                }
                i -= 1;
            }

            let mut right_min = height;
            for &value in &x[peak..] {
                if value > height {
                    break;
                }
                right_min = right_min.min(value);
            }

            height - left_min.max(right_min)
        })
        .collect()
}

/// Peaks of a reactor series
///
/// Missing cells are dropped first, so `distance` counts present samples.
/// Without an explicit `prominence` the threshold is one fifth of the series
/// maximum. The output holds the original timestamps and observed values of
/// the accepted peaks.
pub fn detect_peaks(
    series: &Series<Option<f64>>,
    distance: usize,
    prominence: Option<f64>,
) -> Result<PeakSeries> {
    if distance == 0 {
        return Err(Error::InvalidParameter(
            "minimum peak distance must be at least one sample".to_string(),
        ));
    }
    let present = series.dropna();
    let x = present.values();
    if x.is_empty() {
        return Ok(Series::empty());
    }

    let min_prominence = prominence.unwrap_or_else(|| {
        x.iter().copied().fold(f64::NEG_INFINITY, f64::max) * ADAPTIVE_PROMINENCE_FRACTION
    });

    let candidates = local_maxima(x);
    let spaced = select_by_peak_distance(&candidates, x, distance);
    let prominences = peak_prominences(x, &spaced);
    let accepted: Vec<usize> = spaced
        .iter()
        .zip(&prominences)
        .filter_map(|(&peak, &p)| (p >= min_prominence).then_some(peak))
        .collect();

    debug!(
        candidates = candidates.len(),
        spaced = spaced.len(),
        accepted = accepted.len(),
        min_prominence,
        "peak detection"
    );

    Series::from_pairs(
        accepted
            .into_iter()
            .map(|i| (present.index()[i], PeakValue::Amplitude(x[i]))),
    )
}

/// Peak detector with fixed parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDetector {
    distance: usize,
    prominence: Option<f64>,
}

impl PeakDetector {
    /// `prominence = None` picks a threshold per series from its maximum
    pub fn new(distance: usize, prominence: Option<f64>) -> Result<Self> {
        if distance == 0 {
            return Err(Error::InvalidParameter(
                "minimum peak distance must be at least one sample".to_string(),
            ));
        }
        if let Some(p) = prominence {
            if !p.is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "minimum peak prominence must be finite, got {p}"
                )));
            }
        }
        Ok(Self { distance, prominence })
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    pub fn prominence(&self) -> Option<f64> {
        self.prominence
    }

    pub fn detect(&self, series: &Series<Option<f64>>) -> Result<PeakSeries> {
        detect_peaks(series, self.distance, self.prominence)
    }
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self { distance: DEFAULT_MINIMUM_DISTANCE, prominence: None }
    }
}

impl PeakSourceProperties for PeakDetector {
    fn source_name(&self) -> &'static str {
        "peak detector"
    }
}

impl PeakSource for PeakDetector {
    fn peaks_for(&self, table: &WideTable) -> Result<PeakTable> {
        table
            .column_names()
            .iter()
            .map(|name| {
                let series = table.series(name).ok_or_else(|| Error::MissingColumn(name.clone()))?;
                Ok((name.clone(), self.detect(&series)?))
            })
            .collect()
    }
}
