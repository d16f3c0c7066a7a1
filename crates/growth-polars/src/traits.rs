//! Extension traits at the DataFrame boundary

use growth_core::{LongRecord, WideTable};
use growth_turbidostat::{DilutionEventColumns, DilutionEvents};
use polars::prelude::*;

use crate::config::{EventFilter, LongColumns};
use crate::Result;

/// Reading OD exports and event logs from a DataFrame
pub trait OdFrameExt {
    /// One record per row of a long OD export
    ///
    /// The timestamp column may be a `Datetime` of any unit or integer
    /// milliseconds; the reactor column any type castable to strings.
    fn to_long_records(&self, columns: &LongColumns) -> Result<Vec<LongRecord>>;

    /// Pivot a long OD export into one column per reactor
    ///
    /// Timestamps are rounded to `round_time` seconds first; readings that
    /// collide after rounding are a duplicate-timestamp error.
    fn to_wide_table(&self, columns: &LongColumns, round_time: u32) -> Result<WideTable>;

    /// Dilution events from an event log
    ///
    /// With a `filter`, only rows whose filter column equals its value are
    /// read.
    fn dilution_events(
        &self,
        columns: &DilutionEventColumns,
        filter: Option<&EventFilter>,
        round_time: u32,
    ) -> Result<DilutionEvents>;
}

/// Export into a DataFrame with a leading `timestamp` column where the
/// data is time-indexed
pub trait ToDataFrame {
    fn to_dataframe(&self) -> Result<DataFrame>;

    /// Same frame with reader-facing column names
    fn to_display_dataframe(&self) -> Result<DataFrame> {
        self.to_dataframe()
    }
}
