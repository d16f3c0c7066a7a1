//! Dilution events recorded by the instrument
//!
//! When the run's event log is available, its dilution timestamps replace
//! peak detection: each event, rounded to the OD resolution, becomes a
//! segment boundary of its reactor.

use std::collections::BTreeMap;

use growth_core::{DuplicateEntry, Error, Result, Series, Timestamp, WideTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::traits::{PeakSource, PeakSourceProperties};
use crate::types::{PeakTable, PeakValue};

/// Event name that marks a dilution in the instrument's event log
pub const DEFAULT_EVENT_NAME: &str = "DilutionEvent";

/// Column roles in a tabular event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DilutionEventColumns {
    pub timestamp: String,
    pub reactor: String,
    pub label: String,
}

impl Default for DilutionEventColumns {
    fn default() -> Self {
        Self {
            timestamp: "timestamp_localtime".to_string(),
            reactor: "pioreactor_unit".to_string(),
            label: "event_name".to_string(),
        }
    }
}

impl DilutionEventColumns {
    /// Each role needs its own column
    pub fn validate(&self) -> Result<()> {
        if self.timestamp == self.reactor
            || self.timestamp == self.label
            || self.reactor == self.label
        {
            return Err(Error::Configuration(format!(
                "dilution event columns cannot overlap: timestamp '{}', reactor '{}', label '{}'",
                self.timestamp, self.reactor, self.label
            )));
        }
        Ok(())
    }
}

/// One row of the event log
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub timestamp: Timestamp,
    pub reactor: String,
    pub label: String,
}

impl EventRecord {
    pub fn new(timestamp: Timestamp, reactor: impl Into<String>, label: impl Into<String>) -> Self {
        Self { timestamp, reactor: reactor.into(), label: label.into() }
    }
}

/// Dilution events per reactor on the rounded time axis
#[derive(Debug, Clone, PartialEq)]
pub struct DilutionEvents {
    peaks: PeakTable,
    round_time: u32,
}

impl DilutionEvents {
    /// Group event records by reactor
    ///
    /// With `event_name` set, only records carrying that label are used.
    /// Two events of one reactor that round onto the same timestamp are an
    /// [`Error::DuplicateTimestamps`].
    pub fn from_records(
        records: &[EventRecord],
        round_time: u32,
        event_name: Option<&str>,
    ) -> Result<Self> {
        let selected: Vec<&EventRecord> = records
            .iter()
            .filter(|record| event_name.map_or(true, |name| record.label == name))
            .collect();
        if selected.len() < records.len() {
            info!(
                kept = selected.len(),
                dropped = records.len() - selected.len(),
                event_name = event_name.unwrap_or_default(),
                "filtered event log by event name"
            );
        }

        let mut grouped: BTreeMap<&str, BTreeMap<Timestamp, Vec<&EventRecord>>> = BTreeMap::new();
        for record in selected {
            grouped
                .entry(record.reactor.as_str())
                .or_default()
                .entry(record.timestamp.round(round_time))
                .or_default()
                .push(record);
        }

        let conflicts: Vec<DuplicateEntry> = grouped
            .iter()
            .flat_map(|(reactor, events)| {
                events
                    .iter()
                    .filter(|(_, rows)| rows.len() > 1)
                    .flat_map(move |(rounded, rows)| {
                        rows.iter().map(move |row| DuplicateEntry {
                            reactor: (*reactor).to_string(),
                            raw: row.timestamp,
                            rounded: *rounded,
                        })
                    })
            })
            .collect();
        if !conflicts.is_empty() {
            return Err(Error::DuplicateTimestamps { round_time, conflicts });
        }

        let peaks = grouped
            .into_iter()
            .map(|(reactor, events)| {
                let series = Series::from_pairs(events.into_iter().map(|(rounded, rows)| {
                    (rounded, PeakValue::Event(rows[0].label.clone()))
                }))?;
                Ok((reactor.to_string(), series))
            })
            .collect::<Result<PeakTable>>()?;

        debug!(reactors = peaks.len(), round_time, "grouped dilution events");
        Ok(Self { peaks, round_time })
    }

    pub fn peaks(&self) -> &PeakTable {
        &self.peaks
    }

    pub fn into_peaks(self) -> PeakTable {
        self.peaks
    }

    pub fn round_time(&self) -> u32 {
        self.round_time
    }

    /// Total number of events over all reactors
    pub fn n_events(&self) -> usize {
        self.peaks.values().map(Series::len).sum()
    }
}

impl PeakSourceProperties for DilutionEvents {
    fn source_name(&self) -> &'static str {
        "dilution events"
    }
}

impl PeakSource for DilutionEvents {
    fn peaks_for(&self, table: &WideTable) -> Result<PeakTable> {
        Ok(table
            .column_names()
            .iter()
            .filter_map(|name| {
                self.peaks
                    .get(name)
                    .map(|series| (name.clone(), series.clone()))
            })
            .collect())
    }
}
