//! Conversions between frames and core tables

mod columns;
mod export;
mod import;

use growth_core::{LongRecord, MaskTable, WideTable};
use growth_summary::SummaryTable;
use growth_turbidostat::{DilutionEventColumns, DilutionEvents};
use polars::prelude::*;

use crate::config::{EventFilter, LongColumns};
use crate::traits::{OdFrameExt, ToDataFrame};
use crate::Result;

impl OdFrameExt for DataFrame {
    fn to_long_records(&self, columns: &LongColumns) -> Result<Vec<LongRecord>> {
        import::long_records(self, columns)
    }

    fn to_wide_table(&self, columns: &LongColumns, round_time: u32) -> Result<WideTable> {
        import::wide_table(self, columns, round_time)
    }

    fn dilution_events(
        &self,
        columns: &DilutionEventColumns,
        filter: Option<&EventFilter>,
        round_time: u32,
    ) -> Result<DilutionEvents> {
        import::dilution_events(self, columns, filter, round_time)
    }
}

impl ToDataFrame for WideTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        export::wide_frame(self)
    }
}

impl ToDataFrame for MaskTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        export::mask_frame(self)
    }
}

impl ToDataFrame for SummaryTable {
    fn to_dataframe(&self) -> Result<DataFrame> {
        export::summary_frame(self, false)
    }

    fn to_display_dataframe(&self) -> Result<DataFrame> {
        export::summary_frame(self, true)
    }
}
