//! Types shared by detected and externally supplied peaks

use std::collections::BTreeMap;
use std::fmt;

use growth_core::{Series, Timestamp};
use serde::{Deserialize, Serialize};

/// What marks a peak position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakValue {
    /// Observed OD at a detected local maximum
    Amplitude(f64),
    /// Label of an external dilution event
    Event(String),
}

impl PeakValue {
    pub fn amplitude(&self) -> Option<f64> {
        match self {
            PeakValue::Amplitude(value) => Some(*value),
            PeakValue::Event(_) => None,
        }
    }
}

impl fmt::Display for PeakValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakValue::Amplitude(value) => write!(f, "{value:.4}"),
            PeakValue::Event(label) => write!(f, "{label}"),
        }
    }
}

/// Sparse peak positions of one reactor
pub type PeakSeries = Series<PeakValue>;

/// Peak positions keyed by reactor name
pub type PeakTable = BTreeMap<String, PeakSeries>;

/// Maximum growth rate found inside one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMaximum {
    /// Position of the segment among all segments of the reactor, skipped
    /// segments included
    pub segment: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Timestamp of the derivative maximum, first occurrence on ties
    pub timestamp: Timestamp,
    /// OD of the fitted input at `timestamp`
    pub od_value: f64,
    pub growth_rate: f64,
}

impl fmt::Display for SegmentMaximum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SegmentMaximum {{ segment: {}, at: {}, od: {:.4}, rate: {:.3e} }}",
            self.segment, self.timestamp, self.od_value, self.growth_rate
        )
    }
}
