//! Utility functions for order statistics over partially missing data

use ordered_float::OrderedFloat;

/// Non-missing, non-NaN values in ascending order
pub fn sorted_present<'a>(values: impl IntoIterator<Item = &'a Option<f64>>) -> Vec<f64> {
    let mut present: Vec<OrderedFloat<f64>> = values
        .into_iter()
        .filter_map(|value| value.filter(|v| !v.is_nan()).map(OrderedFloat))
        .collect();
    present.sort_unstable();
    present.into_iter().map(|v| v.into_inner()).collect()
}

/// Quantile of sorted data with linear interpolation between order statistics
///
/// Returns `None` for empty input.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let fraction = h - lo as f64;
    Some(sorted[lo] + fraction * (sorted[hi] - sorted[lo]))
}

/// Median of sorted data
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    quantile_sorted(sorted, 0.5)
}
