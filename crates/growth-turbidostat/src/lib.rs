//! Turbidostat-mode growth analysis
//!
//! A turbidostat dilutes its culture whenever the OD reaches a set point,
//! so a run is a sequence of growth phases. This crate finds the phase
//! boundaries and fits each phase separately.
//!
//! - [`detect_peaks`] / [`PeakDetector`]: local maxima filtered by distance
//!   and prominence
//! - [`DilutionEvents`]: boundaries taken from the instrument's event log
//! - [`fit_growth_data_w_peaks`]: one spline per segment, stitched back onto
//!   the table index, plus the maximum growth rate of every segment
//!
//! Both boundary sources implement [`PeakSource`].

pub mod events;
pub mod peaks;
pub mod segments;
pub mod traits;
pub mod types;

pub use events::{DilutionEventColumns, DilutionEvents, EventRecord, DEFAULT_EVENT_NAME};
pub use peaks::{
    detect_peaks, local_maxima, peak_prominences, select_by_peak_distance, PeakDetector,
    ADAPTIVE_PROMINENCE_FRACTION, DEFAULT_MINIMUM_DISTANCE,
};
pub use segments::{
    fit_growth_data_w_peaks, fit_splines_to_segments, segment_boundaries, ReactorSegments,
    SegmentedFit, SkippedSegment,
};
pub use traits::{PeakSource, PeakSourceProperties};
pub use types::{PeakSeries, PeakTable, PeakValue, SegmentMaximum};
