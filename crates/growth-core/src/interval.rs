//! Bounding span of a boolean condition over time

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Series, Timestamp};

/// First/last timestamp where a condition holds
///
/// All fields are `None` when the condition never holds, which is distinct
/// from a present but interrupted span (`is_continuous == Some(false)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub duration: Option<Duration>,
    pub is_continuous: Option<bool>,
}

impl IntervalRecord {
    /// The record for a condition that never holds
    pub fn no_signal() -> Self {
        Self::default()
    }

    pub fn has_signal(&self) -> bool {
        self.start.is_some()
    }
}

impl fmt::Display for IntervalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end, self.duration, self.is_continuous) {
            (Some(start), Some(end), Some(duration), Some(continuous)) => write!(
                f,
                "Interval {{ start: {start}, end: {end}, duration: {:.1}s, continuous: {continuous} }}",
                duration.as_secs_f64()
            ),
            _ => write!(f, "Interval {{ no signal }}"),
        }
    }
}

/// Interval over parallel index/flag slices
pub fn find_max_range_in(index: &[Timestamp], flags: &[bool]) -> IntervalRecord {
    let first = flags.iter().position(|&flag| flag);
    let last = flags.iter().rposition(|&flag| flag);
    match (first, last) {
        (Some(first), Some(last)) if last < index.len() => {
            let start = index[first];
            let end = index[last];
            IntervalRecord {
                start: Some(start),
                end: Some(end),
                duration: Some(end.duration_since(start)),
                is_continuous: Some(flags[first..=last].iter().all(|&flag| flag)),
            }
        }
        _ => IntervalRecord::no_signal(),
    }
}

/// Interval where `series` is `true`
pub fn find_max_range(series: &Series<bool>) -> IntervalRecord {
    find_max_range_in(series.index(), series.values())
}
