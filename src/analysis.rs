//! Batch and turbidostat analysis runs
//!
//! Each run threads every intermediate table through its result; nothing is
//! kept between runs.

use std::collections::BTreeMap;
use std::time::Instant;

use growth_core::{IntervalRecord, MaskTable, Result, WideTable};
use growth_filter::{filter_series, mask_non_increasing, rolling_median, FilterOutcome};
use growth_spline::{fit_spline_and_derivatives_per_column, ColumnFits};
use growth_summary::{
    high_growth_intervals, high_growth_mask, summarize_batch, summarize_segments, SummaryInputs,
    SummaryTable,
};
use growth_turbidostat::{
    fit_growth_data_w_peaks, DilutionEvents, PeakDetector, PeakSource, PeakTable, SegmentedFit,
};
use tracing::{info, warn};

use crate::config::AnalysisConfig;

fn timed<T>(step: &'static str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    match run() {
        Ok(value) => {
            info!(
                step,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "analysis step finished"
            );
            Ok(value)
        }
        Err(err) => {
            warn!(
                step,
                elapsed_ms = start.elapsed().as_millis() as u64,
                error = %err,
                "analysis step failed"
            );
            Err(err)
        }
    }
}

/// Filtered readings and their rolling median
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub filter: FilterOutcome,
    pub rolling: WideTable,
}

/// Mask outliers, then smooth with a centered rolling median
pub fn preprocess(table: &WideTable, config: &AnalysisConfig) -> Result<Preprocessed> {
    config.validate()?;
    let filter = timed("filter", || filter_series(table, &config.filter))?;
    let rolling = timed("rolling median", || {
        rolling_median(&filter.filtered, config.filter.rolling_window, config.filter.min_periods)
    })?;
    Ok(Preprocessed { filter, rolling })
}

/// Everything a batch run produces
#[derive(Debug, Clone)]
pub struct BatchAnalysis {
    pub filter: FilterOutcome,
    pub rolling: WideTable,
    pub fits: ColumnFits,
    pub high_growth: MaskTable,
    pub intervals: BTreeMap<String, IntervalRecord>,
    pub summary: SummaryTable,
}

/// One spline per reactor over the whole run
pub fn analyse_batch(table: &WideTable, config: &AnalysisConfig) -> Result<BatchAnalysis> {
    let Preprocessed { filter, rolling } = preprocess(table, config)?;
    let fits = timed("spline fit", || {
        fit_spline_and_derivatives_per_column(&rolling, config.smoothing())
    })?;

    let threshold = config.high_percentage_threshold;
    let high_growth = high_growth_mask(&fits.derivatives, threshold)?;
    let intervals = high_growth_intervals(&fits.derivatives, threshold)?;
    let summary = summarize_batch(
        SummaryInputs {
            rolling: &rolling,
            filtered: Some(&filter.filtered),
            fitted: &fits.fitted,
            derivatives: &fits.derivatives,
        },
        threshold,
    )?;

    info!(
        reactors = table.n_columns(),
        masked = filter.mask.total_true(),
        skipped = fits.skipped.len(),
        "batch analysis finished"
    );
    Ok(BatchAnalysis { filter, rolling, fits, high_growth, intervals, summary })
}

/// Everything a turbidostat run produces
#[derive(Debug, Clone)]
pub struct TurbidostatAnalysis {
    pub filter: FilterOutcome,
    /// Rolling median the segments were fitted on, downward trends removed
    /// when configured
    pub rolling: WideTable,
    pub peaks: PeakTable,
    pub segments: SegmentedFit,
    pub high_growth: MaskTable,
    pub intervals: BTreeMap<String, IntervalRecord>,
    pub summary: SummaryTable,
}

/// One spline per growth phase
///
/// Phase boundaries come from `events` when given, otherwise from peaks
/// detected on the rolling median. Peaks are placed before downward trends
/// are removed, so a dilution drop still marks its boundary.
pub fn analyse_turbidostat(
    table: &WideTable,
    config: &AnalysisConfig,
    events: Option<&DilutionEvents>,
) -> Result<TurbidostatAnalysis> {
    let Preprocessed { filter, rolling } = preprocess(table, config)?;

    let detector;
    let source: &dyn PeakSource = match events {
        Some(events) => {
            if events.round_time() != config.round_time {
                warn!(
                    events_round_time = events.round_time(),
                    round_time = config.round_time,
                    "dilution events were rounded differently from the readings"
                );
            }
            events
        }
        None => {
            detector = PeakDetector::new(
                config.turbidostat.minimum_distance,
                config.turbidostat.minimum_peak_height,
            )?;
            &detector
        }
    };
    let peaks = timed("peaks", || source.peaks_for(&rolling))?;
    info!(
        source = source.source_name(),
        peaks = peaks.values().map(|p| p.len()).sum::<usize>(),
        "segment boundaries placed"
    );

    let rolling = if config.turbidostat.remove_downward_trending {
        mask_non_increasing(&rolling)?
    } else {
        rolling
    };

    let segments = timed("segmented fit", || {
        fit_growth_data_w_peaks(&rolling, &peaks, config.smoothing())
    })?;

    let threshold = config.high_percentage_threshold;
    let high_growth = high_growth_mask(&segments.derivatives, threshold)?;
    let intervals = high_growth_intervals(&segments.derivatives, threshold)?;
    let summary = summarize_segments(
        SummaryInputs {
            rolling: &rolling,
            filtered: Some(&filter.filtered),
            fitted: &segments.fitted,
            derivatives: &segments.derivatives,
        },
        &segments.maxima,
        threshold,
    )?;

    Ok(TurbidostatAnalysis {
        filter,
        rolling,
        peaks,
        segments,
        high_growth,
        intervals,
        summary,
    })
}
