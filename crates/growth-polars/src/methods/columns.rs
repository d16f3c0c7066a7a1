//! Typed access to frame columns

use growth_core::Timestamp;
use polars::prelude::*;

use crate::{Error, Result};

pub(crate) fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| Error::Growth(growth_core::Error::MissingColumn(name.to_string())))
}

fn millis_per_unit(unit: &TimeUnit) -> (i64, i64) {
    // (multiplier, divisor) to milliseconds
    match unit {
        TimeUnit::Nanoseconds => (1, 1_000_000),
        TimeUnit::Microseconds => (1, 1_000),
        TimeUnit::Milliseconds => (1, 1),
    }
}

/// Timestamps from a `Datetime` column of any unit or integer milliseconds
pub(crate) fn timestamps(column: &Column) -> Result<Vec<Option<Timestamp>>> {
    let (multiplier, divisor) = match column.dtype() {
        DataType::Datetime(unit, _) => millis_per_unit(unit),
        dtype if dtype.is_integer() => (1, 1),
        other => {
            return Err(Error::TypeMismatch {
                column: column.name().to_string(),
                expected: "Datetime or integer milliseconds".to_string(),
                got: other.to_string(),
            })
        }
    };
    let raw = column.cast(&DataType::Int64)?;
    Ok(raw
        .i64()?
        .into_iter()
        .map(|value| value.map(|v| Timestamp::from_millis((v * multiplier).div_euclid(divisor))))
        .collect())
}

/// Any column castable to strings
pub(crate) fn strings(column: &Column) -> Result<Vec<Option<String>>> {
    let cast = column.cast(&DataType::String)?;
    Ok(cast.str()?.into_iter().map(|value| value.map(str::to_string)).collect())
}

/// Numeric column as `f64`, NaN becomes missing
pub(crate) fn floats(column: &Column) -> Result<Vec<Option<f64>>> {
    if !column.dtype().is_primitive_numeric() {
        return Err(Error::TypeMismatch {
            column: column.name().to_string(),
            expected: "numeric".to_string(),
            got: column.dtype().to_string(),
        });
    }
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect())
}

/// `Datetime[ms]` column from timestamps
pub(crate) fn datetime_column(name: &str, values: Vec<Option<Timestamp>>) -> Result<Column> {
    let millis: Vec<Option<i64>> = values.into_iter().map(|ts| ts.map(Timestamp::as_millis)).collect();
    let series = Series::new(PlSmallStr::from(name), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series.into())
}

/// `Duration[ms]` column
pub(crate) fn duration_column(name: &str, values: Vec<Option<std::time::Duration>>) -> Result<Column> {
    let millis: Vec<Option<i64>> = values
        .into_iter()
        .map(|d| d.map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX)))
        .collect();
    let series = Series::new(PlSmallStr::from(name), millis)
        .cast(&DataType::Duration(TimeUnit::Milliseconds))?;
    Ok(series.into())
}
