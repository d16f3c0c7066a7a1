//! Spans where a reactor grows close to its maximum rate

use std::collections::BTreeMap;

use growth_core::{find_max_range_in, Error, IntervalRecord, MaskTable, Result, WideTable};

/// Default share of the maximum growth rate, in percent
pub const DEFAULT_HIGH_GROWTH_THRESHOLD: f64 = 90.0;

/// A percentage in `[0, 100]`
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&threshold) {
        return Err(Error::InvalidParameter(format!(
            "high growth threshold must be a percentage in [0, 100], got {threshold}"
        )));
    }
    Ok(())
}

/// `max * threshold / 100` over the present values, `None` without any
pub fn growth_cutoff(values: &[Option<f64>], threshold: f64) -> Option<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
        .map(|max| max * threshold / 100.0)
}

/// Cells whose growth rate reaches the cutoff of their reactor
///
/// Missing cells are never in high growth.
pub fn high_growth_mask(derivatives: &WideTable, threshold: f64) -> Result<MaskTable> {
    validate_threshold(threshold)?;
    derivatives.map_columns(|_, values| match growth_cutoff(values, threshold) {
        Some(cutoff) => values.iter().map(|v| v.is_some_and(|v| v >= cutoff)).collect(),
        None => vec![false; values.len()],
    })
}

/// High-growth interval of every reactor
///
/// A reactor without any derivative value gets [`IntervalRecord::no_signal`].
pub fn high_growth_intervals(
    derivatives: &WideTable,
    threshold: f64,
) -> Result<BTreeMap<String, IntervalRecord>> {
    let mask = high_growth_mask(derivatives, threshold)?;
    Ok(mask
        .columns()
        .map(|(name, flags)| (name.to_string(), find_max_range_in(mask.index(), flags)))
        .collect())
}
