//! Common test utilities for growth-polars tests

use polars::prelude::*;

/// Long OD frame with the timestamp column stored in `unit`
pub fn long_frame(unit: TimeUnit) -> DataFrame {
    let millis: Vec<i64> = vec![0, 1_200, 5_100, 9_800, 10_400];
    let scale = match unit {
        TimeUnit::Nanoseconds => 1_000_000,
        TimeUnit::Microseconds => 1_000,
        TimeUnit::Milliseconds => 1,
    };
    let raw: Vec<i64> = millis.iter().map(|m| m * scale).collect();
    let timestamp = Series::new(PlSmallStr::from("timestamp"), raw)
        .cast(&DataType::Datetime(unit, None))
        .unwrap();
    DataFrame::new(vec![
        timestamp.into(),
        Series::new(
            PlSmallStr::from("pioreactor_unit"),
            vec!["P02", "P01", "P01", "P02", "P01"],
        )
        .into(),
        Series::new(
            PlSmallStr::from("od_reading"),
            vec![Some(0.5), Some(0.1), Some(0.2), None, Some(0.3)],
        )
        .into(),
    ])
    .unwrap()
}

/// Event log with one non-dilution row
pub fn event_frame() -> DataFrame {
    let timestamp = Series::new(
        PlSmallStr::from("timestamp_localtime"),
        vec![3_000i64, 12_400, 8_000],
    )
    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
    .unwrap();
    DataFrame::new(vec![
        timestamp.into(),
        Series::new(PlSmallStr::from("pioreactor_unit"), vec!["P01", "P01", "P02"]).into(),
        Series::new(
            PlSmallStr::from("event_name"),
            vec!["DilutionEvent", "DilutionEvent", "StirringEvent"],
        )
        .into(),
    ])
    .unwrap()
}

/// Extract a nullable f64 column
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}
