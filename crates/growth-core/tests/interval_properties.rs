//! Property-based tests for the interval finder

use growth_core::{find_max_range, IntervalRecord, Series, Timestamp};
use proptest::prelude::*;

fn to_series(flags: &[bool]) -> Series<bool> {
    Series::new(
        (0..flags.len() as i64).map(|i| Timestamp::from_secs(i * 5)).collect(),
        flags.to_vec(),
    )
    .unwrap()
}

proptest! {
    // Property: continuity holds exactly when no false lies between start and end
    #[test]
    fn prop_continuity_matches_gap_free_span(flags in prop::collection::vec(any::<bool>(), 0..64)) {
        let record = find_max_range(&to_series(&flags));
        match (flags.iter().position(|&f| f), flags.iter().rposition(|&f| f)) {
            (Some(first), Some(last)) => {
                let gap_free = flags[first..=last].iter().all(|&f| f);
                prop_assert_eq!(record.is_continuous, Some(gap_free));
                prop_assert_eq!(record.start, Some(Timestamp::from_secs(first as i64 * 5)));
                prop_assert_eq!(record.end, Some(Timestamp::from_secs(last as i64 * 5)));
            }
            _ => prop_assert_eq!(record, IntervalRecord::no_signal()),
        }
    }

    // Property: the span never ends before it starts
    #[test]
    fn prop_duration_is_end_minus_start(flags in prop::collection::vec(any::<bool>(), 1..64)) {
        let record = find_max_range(&to_series(&flags));
        if let (Some(start), Some(end), Some(duration)) = (record.start, record.end, record.duration) {
            prop_assert!(start <= end);
            prop_assert_eq!(duration.as_millis() as i64, end.as_millis() - start.as_millis());
        }
    }
}
