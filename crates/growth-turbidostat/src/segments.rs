//! Piecewise growth fits between dilutions
//!
//! In a turbidostat every dilution drops the OD, so a single spline over
//! the whole run would smear the growth phases together. Each reactor is cut
//! at its peaks and every segment gets its own spline.

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use growth_core::{Result, Series, Timestamp, WideTable};
use growth_spline::{fit_series, Smoothing, MIN_SPLINE_POINTS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::types::{PeakSeries, PeakTable, SegmentMaximum};

/// A segment that was not fitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSegment {
    pub reactor: String,
    pub segment: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    pub reason: String,
}

/// Stitched fits of all segments of one reactor
#[derive(Debug, Clone)]
pub struct ReactorSegments {
    pub fitted: Series<f64>,
    pub derivative: Series<f64>,
    pub maxima: Vec<SegmentMaximum>,
    pub skipped: Vec<SkippedSegment>,
}

/// Segmented fits of a whole table
#[derive(Debug, Clone)]
pub struct SegmentedFit {
    pub fitted: WideTable,
    pub derivatives: WideTable,
    /// One entry per fitted segment; reactors without any are absent
    pub maxima: BTreeMap<String, Vec<SegmentMaximum>>,
    pub skipped: Vec<SkippedSegment>,
}

impl SegmentedFit {
    pub fn n_segments(&self) -> usize {
        self.maxima.values().map(Vec::len).sum()
    }
}

/// `[first, peaks ascending without duplicates, last]`
///
/// Peaks at or outside the first and last timestamps are dropped. Empty when
/// the series is empty.
pub fn segment_boundaries(series: &Series<f64>, peaks: Option<&PeakSeries>) -> Vec<Timestamp> {
    let (Some(first), Some(last)) = (series.first_timestamp(), series.last_timestamp()) else {
        return Vec::new();
    };
    let mut boundaries = vec![first];
    if let Some(peaks) = peaks {
        // peak series have a strictly increasing index
        boundaries.extend(peaks.index().iter().copied().filter(|&ts| ts > first && ts < last));
    }
    boundaries.push(last);
    boundaries
}

/// Fit every segment of one reactor
///
/// Segments are the inclusive spans between consecutive boundaries.
/// Segments with fewer than four points are skipped silently, fits that
/// fail are skipped with a reason. Where two segments share a boundary
/// timestamp the earlier segment's value is kept.
pub fn fit_splines_to_segments(
    reactor: &str,
    series: &Series<f64>,
    peaks: Option<&PeakSeries>,
    smoothing: Smoothing,
) -> Result<ReactorSegments> {
    smoothing.validate()?;
    let boundaries = segment_boundaries(series, peaks);

    let mut points: Vec<(Timestamp, f64, f64)> = Vec::with_capacity(series.len());
    let mut maxima = Vec::new();
    let mut skipped = Vec::new();

    for (segment, pair) in boundaries.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let slice = series.between(start, end);
        if slice.len() < MIN_SPLINE_POINTS {
            debug!(reactor, segment, points = slice.len(), "segment too short to fit");
            continue;
        }

        let fit = match fit_series(&slice, smoothing.resolve(slice.len())) {
            Ok(fit) => fit,
            Err(err) => {
                warn!(reactor, segment, error = %err, "skipping segment");
                skipped.push(SkippedSegment {
                    reactor: reactor.to_string(),
                    segment,
                    start,
                    end,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if let Some((timestamp, growth_rate)) = fit.derivative.idxmax() {
            if let Some(&od_value) = slice.get(timestamp) {
                maxima.push(SegmentMaximum {
                    segment,
                    start,
                    end,
                    timestamp,
                    od_value,
                    growth_rate,
                });
            }
        }

        points.extend(
            fit.fitted
                .iter()
                .zip(fit.derivative.values())
                .map(|((ts, &value), &slope)| (ts, value, slope)),
        );
    }

    // stable sort, so the earlier segment wins at shared boundaries
    points.sort_by_key(|(ts, _, _)| *ts);
    points.dedup_by_key(|(ts, _, _)| *ts);

    let (index, rest): (Vec<Timestamp>, Vec<(f64, f64)>) =
        points.into_iter().map(|(ts, value, slope)| (ts, (value, slope))).unzip();
    let (values, slopes): (Vec<f64>, Vec<f64>) = rest.into_iter().unzip();

    Ok(ReactorSegments {
        fitted: Series::new(index.clone(), values)?,
        derivative: Series::new(index, slopes)?,
        maxima,
        skipped,
    })
}

/// Fit every reactor of `table` piecewise between its peaks
///
/// Peaks are looked up by reactor name; a reactor without an entry is a
/// single segment. Missing cells are dropped before segmenting. A reactor
/// without any fitted segment keeps an all-missing column.
pub fn fit_growth_data_w_peaks(
    table: &WideTable,
    peaks: &PeakTable,
    smoothing: impl Into<Smoothing>,
) -> Result<SegmentedFit> {
    let smoothing = smoothing.into();
    smoothing.validate()?;

    let reactors: Vec<(&str, Series<f64>)> = table
        .columns()
        .map(|(name, values)| {
            let series = Series::new(table.index().to_vec(), values.to_vec())?;
            Ok((name, series.dropna()))
        })
        .collect::<Result<_>>()?;

    let fit_one = |(name, series): &(&str, Series<f64>)| {
        fit_splines_to_segments(name, series, peaks.get(*name), smoothing)
            .map(|segments| (name.to_string(), segments))
    };
    #[cfg(feature = "parallel")]
    let results: Vec<(String, ReactorSegments)> =
        reactors.par_iter().map(fit_one).collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let results: Vec<(String, ReactorSegments)> =
        reactors.iter().map(fit_one).collect::<Result<_>>()?;

    let mut fitted = Vec::with_capacity(results.len());
    let mut derivatives = Vec::with_capacity(results.len());
    let mut maxima = BTreeMap::new();
    let mut skipped = Vec::new();
    for (reactor, segments) in results {
        if segments.maxima.is_empty() {
            warn!(reactor = %reactor, "no segment could be fitted");
        } else {
            maxima.insert(reactor.clone(), segments.maxima);
        }
        skipped.extend(segments.skipped);
        fitted.push((reactor.clone(), segments.fitted));
        derivatives.push((reactor, segments.derivative));
    }

    let result = SegmentedFit {
        fitted: WideTable::from_sparse_columns(table.index().to_vec(), fitted)?,
        derivatives: WideTable::from_sparse_columns(table.index().to_vec(), derivatives)?,
        maxima,
        skipped,
    };
    info!(
        reactors = table.n_columns(),
        segments = result.n_segments(),
        skipped = result.skipped.len(),
        "segmented growth fit"
    );
    Ok(result)
}
