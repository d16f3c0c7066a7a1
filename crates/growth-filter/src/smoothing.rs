//! Rolling-median smoothing of a wide table

use growth_core::{Result, WideTable};
use tracing::debug;

use crate::kernels::MedianKernel;
use crate::rolling::{Closed, RollingKernel, RollingWindow};

/// Centered rolling median of every reactor column
///
/// Cells whose window holds fewer than `min_periods` present values are
/// missing in the output.
pub fn rolling_median(table: &WideTable, window: usize, min_periods: usize) -> Result<WideTable> {
    let rolling = RollingWindow::new(window, min_periods)?.closed(Closed::Right);
    let kernel = MedianKernel;
    debug!(
        kernel = kernel.name(),
        window,
        min_periods,
        reactors = table.n_columns(),
        "rolling smoothing"
    );
    table.map_columns(|_, values| rolling.apply(values, &kernel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use growth_core::Timestamp;

    fn table(values: Vec<Option<f64>>) -> WideTable {
        let index = (0..values.len() as i64).map(Timestamp::from_secs).collect();
        WideTable::new(index, vec![("P01".to_string(), values)]).unwrap()
    }

    #[test]
    fn test_median_removes_single_spike() {
        let input = table(vec![Some(1.0), Some(1.0), Some(9.0), Some(1.0), Some(1.0)]);
        let smoothed = rolling_median(&input, 3, 1).unwrap();
        assert_eq!(
            smoothed.column("P01").unwrap(),
            &[Some(1.0), Some(1.0), Some(1.0), Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn test_missing_values_do_not_block() {
        let input = table(vec![Some(1.0), None, Some(3.0), None, None]);
        let smoothed = rolling_median(&input, 3, 2).unwrap();
        assert_eq!(
            smoothed.column("P01").unwrap(),
            &[None, Some(2.0), None, None, None]
        );
    }

    #[test]
    fn test_invalid_window() {
        let input = table(vec![Some(1.0)]);
        assert!(rolling_median(&input, 3, 4).is_err());
    }
}
