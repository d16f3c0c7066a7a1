//! Long-format readings to a wide table
//!
//! Instruments export one row per (timestamp, reactor) reading. Timestamps
//! are rounded to a common resolution first so that reactors sampled a few
//! milliseconds apart land on the same row.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::DuplicateEntry;
use crate::{Error, Result, Timestamp, WideTable};

/// One raw reading
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub timestamp: Timestamp,
    pub reactor: String,
    pub value: Option<f64>,
}

impl LongRecord {
    pub fn new(timestamp: Timestamp, reactor: impl Into<String>, value: Option<f64>) -> Self {
        Self { timestamp, reactor: reactor.into(), value }
    }
}

/// Pivot readings into a table with one column per reactor
///
/// Two readings of the same reactor that round onto the same timestamp make
/// the cell ambiguous; every offending raw row is reported in
/// [`Error::DuplicateTimestamps`].
pub fn pivot_long(records: &[LongRecord], round_time: u32) -> Result<WideTable> {
    let mut cells: BTreeMap<(&str, Timestamp), Vec<(Timestamp, Option<f64>)>> = BTreeMap::new();
    let mut reactors = BTreeSet::new();
    let mut index = BTreeSet::new();

    for record in records {
        let rounded = record.timestamp.round(round_time);
        reactors.insert(record.reactor.as_str());
        index.insert(rounded);
        cells
            .entry((record.reactor.as_str(), rounded))
            .or_default()
            .push((record.timestamp, record.value));
    }

    let conflicts: Vec<DuplicateEntry> = cells
        .iter()
        .filter(|(_, readings)| readings.len() > 1)
        .flat_map(|((reactor, rounded), readings)| {
            readings.iter().map(move |(raw, _)| DuplicateEntry {
                reactor: (*reactor).to_string(),
                raw: *raw,
                rounded: *rounded,
            })
        })
        .collect();
    if !conflicts.is_empty() {
        return Err(Error::DuplicateTimestamps { round_time, conflicts });
    }

    let index: Vec<Timestamp> = index.into_iter().collect();
    let columns = reactors
        .iter()
        .map(|reactor| {
            let values = index
                .iter()
                .map(|ts| cells.get(&(*reactor, *ts)).and_then(|readings| readings[0].1))
                .collect();
            (reactor.to_string(), values)
        })
        .collect();

    debug!(
        rows = index.len(),
        reactors = reactors.len(),
        round_time,
        "pivoted long readings"
    );
    WideTable::new(index, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_aligns_reactors_on_rounded_index() {
        let records = vec![
            LongRecord::new(Timestamp::from_millis(1_000), "P02", Some(0.5)),
            LongRecord::new(Timestamp::from_millis(400), "P01", Some(0.1)),
            LongRecord::new(Timestamp::from_millis(5_300), "P01", Some(0.2)),
            LongRecord::new(Timestamp::from_millis(9_900), "P02", None),
        ];
        let table = pivot_long(&records, 5).unwrap();
        assert_eq!(
            table.index(),
            &[Timestamp::from_secs(0), Timestamp::from_secs(5), Timestamp::from_secs(10)]
        );
        assert_eq!(table.column_names(), &["P01".to_string(), "P02".to_string()]);
        assert_eq!(table.column("P01").unwrap(), &[Some(0.1), Some(0.2), None]);
        assert_eq!(table.column("P02").unwrap(), &[Some(0.5), None, None]);
    }

    #[test]
    fn test_duplicates_after_rounding_list_raw_rows() {
        let records = vec![
            LongRecord::new(Timestamp::from_millis(1_000), "P01", Some(0.1)),
            LongRecord::new(Timestamp::from_millis(2_000), "P01", Some(0.2)),
            LongRecord::new(Timestamp::from_millis(2_000), "P02", Some(0.3)),
        ];
        match pivot_long(&records, 5) {
            Err(Error::DuplicateTimestamps { round_time, conflicts }) => {
                assert_eq!(round_time, 5);
                assert_eq!(conflicts.len(), 2);
                assert!(conflicts.iter().all(|c| c.reactor == "P01"));
                assert!(conflicts.iter().all(|c| c.rounded == Timestamp::from_secs(0)));
            }
            other => panic!("expected duplicate timestamps, got {other:?}"),
        }
        // a finer resolution resolves the conflict
        assert!(pivot_long(&records, 1).is_ok());
    }

    #[test]
    fn test_empty_input() {
        let table = pivot_long(&[], 5).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_columns(), 0);
    }
}
