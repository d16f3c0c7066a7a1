//! Interquartile-range outlier test for the center of a window

use growth_core::utils::{quantile_sorted, sorted_present};

/// Default multiplier of the IQR fences
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;

/// Tukey fences `[q1 - factor * iqr, q3 + factor * iqr]` of the present values
pub fn iqr_fences(window: &[Option<f64>], factor: f64) -> Option<(f64, f64)> {
    let sorted = sorted_present(window);
    let q1 = quantile_sorted(&sorted, 0.25)?;
    let q3 = quantile_sorted(&sorted, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - factor * iqr, q3 + factor * iqr))
}

/// Whether the middle element of `window` lies strictly outside the fences
///
/// The middle element is `window[window.len() / 2]`. A missing middle
/// element is never an outlier, and a value exactly on a fence is kept.
pub fn out_of_iqr(window: &[Option<f64>], factor: f64) -> bool {
    let center = match window.get(window.len() / 2).copied().flatten() {
        Some(center) if !center.is_nan() => center,
        _ => return false,
    };
    match iqr_fences(window, factor) {
        Some((lower, upper)) => center < lower || center > upper,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn window(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_spike_in_center_is_outlier() {
        let values = window(&[1.0, 1.0, 1.0, 1.0, 100.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(out_of_iqr(&values, DEFAULT_IQR_FACTOR));
    }

    #[test]
    fn test_constant_window_is_not_outlier() {
        let values = window(&[2.0; 9]);
        assert!(!out_of_iqr(&values, DEFAULT_IQR_FACTOR));
    }

    #[test]
    fn test_value_on_fence_is_kept() {
        // q1 = 2, q3 = 4, iqr = 2, upper fence = 4 + 1 * 2 = 6
        let values = window(&[1.0, 2.0, 6.0, 3.0, 4.0]);
        let (lower, upper) = iqr_fences(&values, 1.0).unwrap();
        assert_relative_eq!(lower, 0.0);
        assert_relative_eq!(upper, 6.0);
        assert!(!out_of_iqr(&values, 1.0));
    }

    #[test]
    fn test_missing_center_is_not_outlier() {
        let mut values = window(&[1.0, 1.0, 1.0, 1.0, 1.0]);
        values[2] = None;
        assert!(!out_of_iqr(&values, DEFAULT_IQR_FACTOR));
    }

    #[test]
    fn test_missing_values_excluded_from_quartiles() {
        let values = vec![Some(1.0), None, Some(1.2), None, Some(9.0), Some(1.1), Some(0.9)];
        // center is window[3] = None
        assert!(!out_of_iqr(&values, DEFAULT_IQR_FACTOR));
        let values = vec![Some(1.0), None, Some(1.2), Some(9.0), Some(1.1), Some(0.9), None];
        assert!(out_of_iqr(&values, DEFAULT_IQR_FACTOR));
    }

    #[test]
    fn test_empty_window() {
        assert!(!out_of_iqr(&[], DEFAULT_IQR_FACTOR));
    }
}
