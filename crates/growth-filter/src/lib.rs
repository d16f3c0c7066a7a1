//! Outlier masking and smoothing of optical-density tables
//!
//! - [`filter_series`]: sequential zero/negative, quantile and rolling-IQR
//!   masking that returns the filtered table, the combined mask and a report
//! - [`rolling_median`]: centered rolling-median smoothing
//! - [`mask_non_increasing`]: removal of flat or falling readings
//! - [`out_of_iqr`]: the window kernel behind the rolling-IQR stage
//!
//! # Example
//!
//! ```rust
//! use growth_core::{Timestamp, WideTable};
//! use growth_filter::{filter_series, rolling_median, FilterOptions};
//!
//! let index: Vec<_> = (0..60).map(|i| Timestamp::from_secs(i * 30)).collect();
//! let mut values: Vec<Option<f64>> = (0..60).map(|i| Some(0.1 + 0.01 * i as f64)).collect();
//! values[30] = Some(5.0);
//! let table = WideTable::new(index, vec![("P01".to_string(), values)]).unwrap();
//!
//! let outcome = filter_series(&table, &FilterOptions::default()).unwrap();
//! assert!(outcome.mask.column("P01").unwrap()[30]);
//!
//! let smoothed = rolling_median(&outcome.filtered, 31, 5).unwrap();
//! assert_eq!(smoothed.n_rows(), 60);
//! ```

pub mod iqr;
pub mod kernels;
pub mod pipeline;
pub mod rolling;
pub mod smoothing;
pub mod trend;

pub use iqr::{iqr_fences, out_of_iqr, DEFAULT_IQR_FACTOR};
pub use kernels::{IqrOutlierKernel, MedianKernel};
pub use pipeline::{
    filter_series, FilterOptions, FilterOutcome, FilterPipeline, FilterReport, FilterStage,
    NonPositiveStage, QuantileMaxStage, RollingIqrStage, StageReport,
};
pub use rolling::{Closed, RollingKernel, RollingWindow};
pub use smoothing::rolling_median;
pub use trend::mask_non_increasing;
