//! Centered fixed-length rolling windows over partially missing columns
//!
//! Window geometry for row `i` of an `n`-row column with window length `w`:
//! `end = i + (w - 1) / 2 + 1` (exclusive) and `start = end - w`, with one
//! extra leading row when the window is closed on both sides. Both bounds are
//! clipped to `[0, n]`, so rows near the edges see a shorter window instead
//! of being skipped.

use growth_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which window edges are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Closed {
    /// `w` rows ending at the centered right edge
    #[default]
    Right,
    /// `w + 1` rows, one more on the left
    Both,
}

/// A statistic evaluated on one window of a column
pub trait RollingKernel {
    type Output;

    /// Name used in log output
    fn name(&self) -> &'static str;

    /// Evaluate the window; `None` means the result is undefined
    fn evaluate(&self, window: &[Option<f64>]) -> Option<Self::Output>;
}

/// Centered rolling window with a minimum number of present values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindow {
    window: usize,
    min_periods: usize,
    closed: Closed,
}

impl RollingWindow {
    pub fn new(window: usize, min_periods: usize) -> Result<Self> {
        if window == 0 {
            return Err(Error::InvalidParameter(
                "rolling window must contain at least one row".to_string(),
            ));
        }
        if min_periods > window {
            return Err(Error::InvalidParameter(format!(
                "min_periods {min_periods} must be <= window {window}"
            )));
        }
        Ok(Self { window, min_periods, closed: Closed::Right })
    }

    pub fn closed(mut self, closed: Closed) -> Self {
        self.closed = closed;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn min_periods(&self) -> usize {
        self.min_periods
    }

    /// Row range `[start, end)` covered by the window centered on `row`
    pub fn bounds(&self, row: usize, n: usize) -> (usize, usize) {
        let offset = (self.window - 1) / 2;
        let end = row + offset + 1;
        let span = match self.closed {
            Closed::Right => self.window,
            Closed::Both => self.window + 1,
        };
        (end.saturating_sub(span).min(n), end.min(n))
    }

    /// Evaluate `kernel` for every row of `values`
    ///
    /// Windows with fewer than `min_periods` present values yield `None`
    /// without calling the kernel.
    pub fn apply<K: RollingKernel>(
        &self,
        values: &[Option<f64>],
        kernel: &K,
    ) -> Vec<Option<K::Output>> {
        let n = values.len();
        (0..n)
            .map(|row| {
                let (start, end) = self.bounds(row, n);
                let window = &values[start..end];
                let present = window.iter().filter(|value| value.is_some()).count();
                if present < self.min_periods || present == 0 {
                    None
                } else {
                    kernel.evaluate(window)
                }
            })
            .collect()
    }
}
