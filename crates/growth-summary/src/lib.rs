//! High-growth intervals and growth summaries
//!
//! - [`high_growth_mask`] / [`high_growth_intervals`]: where each reactor
//!   grows at no less than a percentage of its own maximum rate
//! - [`summarize_batch`]: one row per reactor
//! - [`summarize_segments`]: one row per fitted turbidostat segment
//!
//! Interval columns are named after the threshold, e.g.
//! `max_90%_growth_start`.

pub mod high_growth;
pub mod summary;

pub use high_growth::{
    growth_cutoff, high_growth_intervals, high_growth_mask, validate_threshold,
    DEFAULT_HIGH_GROWTH_THRESHOLD,
};
pub use summary::{
    display_name, interval_column_names, summarize_batch, summarize_segments, SummaryInputs,
    SummaryRow, SummaryTable,
};
