//! Window statistics used by the rolling stages

use growth_core::utils::{median_sorted, sorted_present};

use crate::iqr::out_of_iqr;
use crate::rolling::RollingKernel;

/// Flags the middle element of a window outside its IQR fences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrOutlierKernel {
    factor: f64,
}

impl IqrOutlierKernel {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl RollingKernel for IqrOutlierKernel {
    type Output = bool;

    fn name(&self) -> &'static str {
        "iqr_outlier"
    }

    fn evaluate(&self, window: &[Option<f64>]) -> Option<bool> {
        Some(out_of_iqr(window, self.factor))
    }
}

/// Median of the present values in a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedianKernel;

impl RollingKernel for MedianKernel {
    type Output = f64;

    fn name(&self) -> &'static str {
        "median"
    }

    fn evaluate(&self, window: &[Option<f64>]) -> Option<f64> {
        median_sorted(&sorted_present(window))
    }
}
