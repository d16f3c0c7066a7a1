//! Timestamps on the measurement axis
//!
//! Instruments report wall-clock times; everything downstream only needs an
//! ordered millisecond counter, differences, and rounding to a resolution.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * MILLIS_PER_SECOND)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Round to a multiple of `resolution_secs`, ties to even
    ///
    /// A resolution of zero leaves the timestamp untouched.
    pub fn round(self, resolution_secs: u32) -> Self {
        if resolution_secs == 0 {
            return self;
        }
        let step = i64::from(resolution_secs) * MILLIS_PER_SECOND;
        let quotient = self.0.div_euclid(step);
        let remainder = self.0.rem_euclid(step);
        let rounded = match (2 * remainder).cmp(&step) {
            std::cmp::Ordering::Less => quotient,
            std::cmp::Ordering::Greater => quotient + 1,
            std::cmp::Ordering::Equal => quotient + quotient.rem_euclid(2),
        };
        Self(rounded * step)
    }

    /// Signed number of seconds since `origin`
    pub fn seconds_since(self, origin: Timestamp) -> f64 {
        (self.0 - origin.0) as f64 / MILLIS_PER_SECOND as f64
    }

    /// Signed number of hours since `origin`
    pub fn hours_since(self, origin: Timestamp) -> f64 {
        (self.0 - origin.0) as f64 / MILLIS_PER_HOUR
    }

    /// Elapsed time since an earlier timestamp, zero if `earlier` is later
    pub fn duration_since(self, earlier: Timestamp) -> Duration {
        let millis = (self.0 - earlier.0).max(0);
        Duration::from_millis(millis as u64)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Elapsed hours of every index entry relative to the first one
///
/// Used by callers that display results on a relative time axis.
pub fn elapsed_hours(index: &[Timestamp]) -> Vec<f64> {
    match index.first() {
        Some(&origin) => index.iter().map(|ts| ts.hours_since(origin)).collect(),
        None => Vec::new(),
    }
}
