//! Sequential masking pipeline
//!
//! Each stage computes a mask against the table as already filtered by the
//! stages before it. The filtered table is the input with every masked cell
//! set to missing, and the combined mask is the OR of all stage masks.

use std::collections::BTreeMap;
use std::time::Instant;

use growth_core::utils::{quantile_sorted, sorted_present};
use growth_core::{Error, MaskTable, Result, WideTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::iqr::DEFAULT_IQR_FACTOR;
use crate::kernels::IqrOutlierKernel;
use crate::rolling::{Closed, RollingWindow};

/// Options of the filtering pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Mask readings below zero
    pub remove_negative: bool,
    /// Mask readings at or below zero
    pub remove_zero: bool,
    /// Mask readings above a per-reactor quantile
    pub remove_max: bool,
    pub quantile_max: f64,
    /// Mask rolling-window IQR outliers
    pub filter_by_iqr_range: bool,
    pub iqr_range_value: f64,
    pub rolling_window: usize,
    pub min_periods: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            remove_negative: false,
            remove_zero: false,
            remove_max: false,
            quantile_max: 0.99,
            filter_by_iqr_range: true,
            iqr_range_value: DEFAULT_IQR_FACTOR,
            rolling_window: 31,
            min_periods: 5,
        }
    }
}

impl FilterOptions {
    /// Reject option combinations no stage can run with
    pub fn validate(&self) -> Result<()> {
        if !(self.quantile_max > 0.0 && self.quantile_max < 1.0) {
            return Err(Error::Configuration(format!(
                "quantile_max must be in (0, 1), got {}",
                self.quantile_max
            )));
        }
        if !(self.iqr_range_value.is_finite() && self.iqr_range_value > 0.0) {
            return Err(Error::Configuration(format!(
                "iqr_range_value must be positive, got {}",
                self.iqr_range_value
            )));
        }
        if self.rolling_window < 3 || self.rolling_window % 2 == 0 {
            return Err(Error::Configuration(format!(
                "rolling_window must be an odd integer >= 3, got {}",
                self.rolling_window
            )));
        }
        if self.min_periods == 0 || self.min_periods > self.rolling_window {
            return Err(Error::Configuration(format!(
                "min_periods must be in [1, {}], got {}",
                self.rolling_window, self.min_periods
            )));
        }
        Ok(())
    }
}

/// One masking step of the pipeline
pub trait FilterStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cells to exclude, computed on the current filtered table
    ///
    /// Cells that are already missing are never marked.
    fn mask(&self, table: &WideTable) -> Result<MaskTable>;
}

/// Masks zero and/or negative readings
#[derive(Debug, Clone, Copy)]
pub struct NonPositiveStage {
    pub remove_negative: bool,
    pub remove_zero: bool,
}

impl FilterStage for NonPositiveStage {
    fn name(&self) -> &'static str {
        "non_positive"
    }

    fn mask(&self, table: &WideTable) -> Result<MaskTable> {
        table.map_columns(|_, values| {
            values
                .iter()
                .map(|value| match value {
                    Some(v) if self.remove_zero => *v <= 0.0,
                    Some(v) if self.remove_negative => *v < 0.0,
                    _ => false,
                })
                .collect()
        })
    }
}

/// Masks readings strictly above each reactor's `quantile`
#[derive(Debug, Clone, Copy)]
pub struct QuantileMaxStage {
    pub quantile: f64,
}

impl FilterStage for QuantileMaxStage {
    fn name(&self) -> &'static str {
        "quantile_max"
    }

    fn mask(&self, table: &WideTable) -> Result<MaskTable> {
        table.map_columns(|name, values| {
            let sorted = sorted_present(values);
            match quantile_sorted(&sorted, self.quantile) {
                Some(cutoff) => {
                    debug!(reactor = name, cutoff, "quantile cutoff");
                    values
                        .iter()
                        .map(|value| value.map_or(false, |v| v > cutoff))
                        .collect()
                }
                None => vec![false; values.len()],
            }
        })
    }
}

/// Masks the centers of rolling windows that fall outside the IQR fences
#[derive(Debug, Clone, Copy)]
pub struct RollingIqrStage {
    window: RollingWindow,
    kernel: IqrOutlierKernel,
}

impl RollingIqrStage {
    pub fn new(window: usize, min_periods: usize, factor: f64) -> Result<Self> {
        Ok(Self {
            window: RollingWindow::new(window, min_periods)?.closed(Closed::Both),
            kernel: IqrOutlierKernel::new(factor),
        })
    }
}

impl FilterStage for RollingIqrStage {
    fn name(&self) -> &'static str {
        "rolling_iqr"
    }

    fn mask(&self, table: &WideTable) -> Result<MaskTable> {
        // an undefined window (too few present values) is not an outlier
        table.map_columns(|_, values| {
            self.window
                .apply(values, &self.kernel)
                .into_iter()
                .zip(values)
                .map(|(flag, value)| flag.unwrap_or(false) && value.is_some())
                .collect()
        })
    }
}

/// Cells masked by one stage, per reactor
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: &'static str,
    pub masked: BTreeMap<String, usize>,
}

impl StageReport {
    pub fn total(&self) -> usize {
        self.masked.values().sum()
    }
}

/// What every stage removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterReport {
    stages: Vec<StageReport>,
}

impl FilterReport {
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Cells masked by any stage for one reactor
    pub fn total_for(&self, reactor: &str) -> usize {
        self.stages
            .iter()
            .filter_map(|stage| stage.masked.get(reactor))
            .sum()
    }

    pub fn total(&self) -> usize {
        self.stages.iter().map(StageReport::total).sum()
    }
}

/// Filtered table, combined mask and per-stage counts
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub filtered: WideTable,
    pub mask: MaskTable,
    pub report: FilterReport,
}

/// Ordered list of filter stages
pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    pub fn new(stages: Vec<Box<dyn FilterStage>>) -> Self {
        Self { stages }
    }

    /// Stages enabled by `options`, in their fixed order
    pub fn from_options(options: &FilterOptions) -> Result<Self> {
        options.validate()?;
        let mut stages: Vec<Box<dyn FilterStage>> = Vec::new();
        if options.remove_negative || options.remove_zero {
            stages.push(Box::new(NonPositiveStage {
                remove_negative: options.remove_negative,
                remove_zero: options.remove_zero,
            }));
        }
        if options.remove_max {
            stages.push(Box::new(QuantileMaxStage { quantile: options.quantile_max }));
        }
        if options.filter_by_iqr_range {
            stages.push(Box::new(RollingIqrStage::new(
                options.rolling_window,
                options.min_periods,
                options.iqr_range_value,
            )?));
        }
        Ok(Self::new(stages))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn run(&self, table: &WideTable) -> Result<FilterOutcome> {
        let mut filtered = table.clone();
        let mut mask = MaskTable::empty_like(table);
        let mut report = FilterReport::default();

        for stage in &self.stages {
            let start = Instant::now();
            let stage_mask = match stage.mask(&filtered) {
                Ok(stage_mask) => stage_mask,
                Err(err) => {
                    warn!(stage = stage.name(), error = %err, "filter stage failed");
                    return Err(err);
                }
            };
            filtered = filtered.masked(&stage_mask)?;
            mask = mask.or(&stage_mask)?;

            let stage_report = StageReport {
                stage: stage.name(),
                masked: stage_mask.count_true(),
            };
            info!(
                stage = stage.name(),
                masked = stage_report.total(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "filter stage finished"
            );
            report.stages.push(stage_report);
        }

        Ok(FilterOutcome { filtered, mask, report })
    }
}

/// Run the stages enabled by `options` over `table`
pub fn filter_series(table: &WideTable, options: &FilterOptions) -> Result<FilterOutcome> {
    FilterPipeline::from_options(options)?.run(table)
}
