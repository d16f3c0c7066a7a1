//! Long frames and event logs into core tables

use growth_core::{pivot_long, LongRecord, WideTable};
use growth_turbidostat::{DilutionEventColumns, DilutionEvents, EventRecord};
use polars::prelude::*;
use tracing::debug;

use super::columns::{floats, require, strings, timestamps};
use crate::config::{EventFilter, LongColumns};
use crate::{Error, Result};

fn ensure_distinct(columns: &LongColumns) -> Result<()> {
    if columns.timestamp == columns.reactor
        || columns.timestamp == columns.value
        || columns.reactor == columns.value
    {
        return Err(Error::InvalidColumn(format!(
            "long frame columns cannot overlap: timestamp '{}', reactor '{}', value '{}'",
            columns.timestamp, columns.reactor, columns.value
        )));
    }
    Ok(())
}

pub(crate) fn long_records(df: &DataFrame, columns: &LongColumns) -> Result<Vec<LongRecord>> {
    ensure_distinct(columns)?;
    let ts = timestamps(require(df, &columns.timestamp)?)?;
    let reactors = strings(require(df, &columns.reactor)?)?;
    let values = floats(require(df, &columns.value)?)?;

    ts.into_iter()
        .zip(reactors)
        .zip(values)
        .enumerate()
        .map(|(row, ((ts, reactor), value))| match (ts, reactor) {
            (Some(ts), Some(reactor)) => Ok(LongRecord::new(ts, reactor, value)),
            _ => Err(Error::InvalidInput(format!(
                "row {row} has no timestamp or no reactor"
            ))),
        })
        .collect()
}

pub(crate) fn wide_table(df: &DataFrame, columns: &LongColumns, round_time: u32) -> Result<WideTable> {
    let records = long_records(df, columns)?;
    debug!(rows = records.len(), round_time, "read long OD frame");
    Ok(pivot_long(&records, round_time)?)
}

pub(crate) fn dilution_events(
    df: &DataFrame,
    columns: &DilutionEventColumns,
    filter: Option<&EventFilter>,
    round_time: u32,
) -> Result<DilutionEvents> {
    columns.validate()?;
    let ts = timestamps(require(df, &columns.timestamp)?)?;
    let reactors = strings(require(df, &columns.reactor)?)?;
    let labels = strings(require(df, &columns.label)?)?;
    let keep: Vec<bool> = match filter {
        Some(filter) => strings(require(df, &filter.column)?)?
            .into_iter()
            .map(|value| value.as_deref() == Some(filter.value.as_str()))
            .collect(),
        None => vec![true; df.height()],
    };

    let mut records = Vec::with_capacity(df.height());
    for (row, (((ts, reactor), label), keep)) in
        ts.into_iter().zip(reactors).zip(labels).zip(keep).enumerate()
    {
        if !keep {
            continue;
        }
        match (ts, reactor) {
            (Some(ts), Some(reactor)) => {
                records.push(EventRecord::new(ts, reactor, label.unwrap_or_default()))
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "event row {row} has no timestamp or no reactor"
                )))
            }
        }
    }
    debug!(
        rows = df.height(),
        kept = records.len(),
        "read dilution event log"
    );
    Ok(DilutionEvents::from_records(&records, round_time, None)?)
}
