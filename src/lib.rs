//! Growth-curve analysis of bioreactor optical-density readings
//!
//! The workspace is split by pipeline stage:
//!
//! - [`growth_core`]: timestamps, wide tables, pivoting, interval finding
//! - [`growth_filter`]: outlier masking and rolling-median smoothing
//! - [`growth_spline`]: smoothing splines and growth rates
//! - [`growth_turbidostat`]: peak detection and segmented fits
//! - [`growth_summary`]: high-growth intervals and summary tables
//! - `growth_polars` (feature `polars`): DataFrame conversions
//!
//! This crate ties them together in [`analysis`] and holds the run
//! [`config`].
//!
//! # Example
//!
//! ```rust
//! use piogrowth::{analyse_batch, AnalysisConfig};
//! use piogrowth::core::{Timestamp, WideTable};
//!
//! let index: Vec<_> = (0..200).map(|i| Timestamp::from_secs(i * 60)).collect();
//! let values = (0..200)
//!     .map(|i| Some(1.0 / (1.0 + 99.0 * (-(i as f64) / 30.0).exp())))
//!     .collect();
//! let table = WideTable::new(index, vec![("P01".to_string(), values)]).unwrap();
//!
//! let config = AnalysisConfig { smoothing_factor: Some(0.01), ..AnalysisConfig::default() };
//! let result = analyse_batch(&table, &config).unwrap();
//! assert_eq!(result.summary.len(), 1);
//! ```

pub mod analysis;
pub mod config;

pub use analysis::{
    analyse_batch, analyse_turbidostat, preprocess, BatchAnalysis, Preprocessed,
    TurbidostatAnalysis,
};
pub use config::{AnalysisConfig, TurbidostatOptions};

pub use growth_core as core;
pub use growth_filter as filter;
#[cfg(feature = "polars")]
pub use growth_polars as polars;
pub use growth_spline as spline;
pub use growth_summary as summary;
pub use growth_turbidostat as turbidostat;
