//! Core types for growth-curve analysis
//!
//! This crate provides the data model shared by every stage of the pipeline:
//!
//! - [`Timestamp`]: millisecond time axis with resolution rounding
//! - [`Series`]: one reactor's values on a strictly increasing index
//! - [`Table`]: wide tables keyed by reactor name ([`WideTable`], [`MaskTable`])
//! - [`pivot_long`]: long readings to a wide table with duplicate detection
//! - [`find_max_range`]: bounding span of a boolean condition
//! - [`Error`]: the error type used across all growth-* crates
//!
//! Missing cells are explicit `Option<f64>` values. A missing value never
//! compares to anything and is excluded from every order statistic.

pub mod error;
pub mod interval;
pub mod pivot;
pub mod series;
pub mod table;
pub mod time;
pub mod utils;

pub use error::{DuplicateEntry, Error, Result};
pub use interval::{find_max_range, find_max_range_in, IntervalRecord};
pub use pivot::{pivot_long, LongRecord};
pub use series::Series;
pub use table::{MaskTable, Selection, Table, WideTable};
pub use time::{elapsed_hours, Timestamp};
