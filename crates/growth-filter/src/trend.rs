//! Removal of non-increasing readings
//!
//! In continuous culture a dilution makes the OD drop; only the rising parts
//! of the curve carry growth information.

use growth_core::{Result, WideTable};

/// Null out every cell that is not above the previous row's value
///
/// A cell is kept when either it or the previous cell is missing, since the
/// difference is undefined there.
pub fn mask_non_increasing(table: &WideTable) -> Result<WideTable> {
    table.map_columns(|_, values| {
        values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let previous = row.checked_sub(1).and_then(|prev| values[prev]);
                match (previous, *value) {
                    (Some(previous), Some(current)) if current - previous <= 0.0 => None,
                    _ => *value,
                }
            })
            .collect()
    })
}
