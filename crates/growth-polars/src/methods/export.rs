//! Core tables back into frames

use growth_core::{MaskTable, Table, WideTable};
use growth_summary::summary::{
    COL_MAX_GROWTH_RATE, COL_OD_FILTERED, COL_OD_MEDIAN, COL_OD_SPLINE, COL_REACTOR, COL_SEGMENT,
    COL_TIMESTAMP,
};
use growth_summary::{display_name, interval_column_names, SummaryRow, SummaryTable};
use polars::prelude::*;

use super::columns::{datetime_column, duration_column};
use crate::config::TIMESTAMP_COLUMN;
use crate::Result;

fn table_frame<V>(table: &Table<V>, to_column: impl Fn(&str, &[V]) -> Column) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(table.n_columns() + 1);
    columns.push(datetime_column(
        TIMESTAMP_COLUMN,
        table.index().iter().copied().map(Some).collect(),
    )?);
    columns.extend(table.columns().map(|(name, values)| to_column(name, values)));
    Ok(DataFrame::new(columns)?)
}

pub(crate) fn wide_frame(table: &WideTable) -> Result<DataFrame> {
    table_frame(table, |name, values| {
        Series::new(PlSmallStr::from(name), values.to_vec()).into()
    })
}

pub(crate) fn mask_frame(table: &MaskTable) -> Result<DataFrame> {
    table_frame(table, |name, values| {
        Series::new(PlSmallStr::from(name), values.to_vec()).into()
    })
}

pub(crate) fn summary_frame(summary: &SummaryTable, display: bool) -> Result<DataFrame> {
    let label = |name: &str| {
        if display {
            display_name(name).to_string()
        } else {
            name.to_string()
        }
    };
    let rows = summary.rows();
    let f64_column = |name: &str, get: fn(&SummaryRow) -> Option<f64>| -> Column {
        Series::new(PlSmallStr::from(label(name)), rows.iter().map(get).collect::<Vec<_>>()).into()
    };
    let [start, end, duration, continuous] = interval_column_names(summary.threshold());

    let mut columns: Vec<Column> = vec![Series::new(
        PlSmallStr::from(label(COL_REACTOR)),
        rows.iter().map(|row| row.reactor.clone()).collect::<Vec<_>>(),
    )
    .into()];
    if summary.is_segmented() {
        columns.push(
            Series::new(
                PlSmallStr::from(label(COL_SEGMENT)),
                rows.iter()
                    .map(|row| row.segment.map(|s| s as u32))
                    .collect::<Vec<_>>(),
            )
            .into(),
        );
    }
    columns.push(datetime_column(
        &label(COL_TIMESTAMP),
        rows.iter().map(|row| row.timestamp).collect(),
    )?);
    columns.push(f64_column(COL_MAX_GROWTH_RATE, |row| row.max_growth_rate));
    columns.push(f64_column(COL_OD_MEDIAN, |row| row.od_rolling));
    columns.push(f64_column(COL_OD_FILTERED, |row| row.od_filtered));
    columns.push(f64_column(COL_OD_SPLINE, |row| row.od_spline));
    columns.push(datetime_column(&start, rows.iter().map(|row| row.interval.start).collect())?);
    columns.push(datetime_column(&end, rows.iter().map(|row| row.interval.end).collect())?);
    columns.push(duration_column(
        &duration,
        rows.iter().map(|row| row.interval.duration).collect(),
    )?);
    columns.push(
        Series::new(
            PlSmallStr::from(continuous.as_str()),
            rows.iter().map(|row| row.interval.is_continuous).collect::<Vec<_>>(),
        )
        .into(),
    );
    Ok(DataFrame::new(columns)?)
}
