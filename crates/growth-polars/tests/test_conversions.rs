//! Frame <-> table conversions

mod common;

use common::{event_frame, f64_values, long_frame};
use growth_core::{IntervalRecord, MaskTable, Timestamp};
use growth_polars::{
    DilutionEventColumns, Error, EventFilter, LongColumns, OdFrameExt, ToDataFrame,
};
use growth_summary::{SummaryRow, SummaryTable};
use polars::prelude::*;

#[test]
fn test_datetime_units_give_same_table() {
    let expected = long_frame(TimeUnit::Milliseconds)
        .to_wide_table(&LongColumns::default(), 5)
        .unwrap();
    for unit in [TimeUnit::Nanoseconds, TimeUnit::Microseconds] {
        let table = long_frame(unit).to_wide_table(&LongColumns::default(), 5).unwrap();
        assert_eq!(table, expected);
    }

    assert_eq!(
        expected.index(),
        &[Timestamp::from_secs(0), Timestamp::from_secs(5), Timestamp::from_secs(10)]
    );
    assert_eq!(expected.column("P01").unwrap(), &[Some(0.1), Some(0.2), Some(0.3)]);
    assert_eq!(expected.column("P02").unwrap(), &[Some(0.5), None, None]);
}

#[test]
fn test_integer_millis_and_numeric_reactors() {
    let df = DataFrame::new(vec![
        Series::new(PlSmallStr::from("time"), vec![0i64, 60_000, 120_000]).into(),
        Series::new(PlSmallStr::from("unit"), vec![1i32, 1, 2]).into(),
        Series::new(PlSmallStr::from("od"), vec![1i64, 2, 3]).into(),
    ])
    .unwrap();
    let columns = LongColumns {
        timestamp: "time".to_string(),
        reactor: "unit".to_string(),
        value: "od".to_string(),
    };
    let table = df.to_wide_table(&columns, 0).unwrap();
    assert_eq!(table.column_names(), &["1".to_string(), "2".to_string()]);
    assert_eq!(table.column("2").unwrap(), &[None, None, Some(3.0)]);
}

#[test]
fn test_schema_errors() {
    let df = long_frame(TimeUnit::Milliseconds);
    let missing = LongColumns { value: "od_calibrated".to_string(), ..LongColumns::default() };
    let err = df.to_wide_table(&missing, 5).unwrap_err();
    assert!(matches!(err, Error::Growth(growth_core::Error::MissingColumn(_))));
    assert!(err.is_schema_error());

    let text_values = LongColumns { value: "pioreactor_unit".to_string(), ..LongColumns::default() };
    assert!(df.to_wide_table(&text_values, 5).is_err());

    let wrong_values = LongColumns {
        reactor: "od_reading".to_string(),
        value: "timestamp".to_string(),
        ..LongColumns::default()
    };
    assert!(df.to_wide_table(&wrong_values, 5).is_err());

    // rounding to a minute merges P01's readings
    match df.to_wide_table(&LongColumns::default(), 60) {
        Err(Error::Growth(growth_core::Error::DuplicateTimestamps { conflicts, .. })) => {
            assert!(!conflicts.is_empty())
        }
        other => panic!("expected duplicate timestamps, got {other:?}"),
    }
}

#[test]
fn test_overlapping_long_columns() -> anyhow::Result<()> {
    let df = long_frame(TimeUnit::Milliseconds);
    let overlapping = LongColumns {
        reactor: "timestamp".to_string(),
        ..LongColumns::default()
    };
    let err = match df.to_wide_table(&overlapping, 5) {
        Err(err) => err,
        Ok(table) => anyhow::bail!("overlapping columns were accepted: {table:?}"),
    };
    assert!(matches!(err, Error::InvalidColumn(_)));
    assert!(err.is_schema_error());

    // distinct columns still read
    let table = df.to_wide_table(&LongColumns::default(), 5)?;
    assert_eq!(table.n_columns(), 2);
    Ok(())
}

#[test]
fn test_dilution_events_with_filter() {
    let df = event_frame();
    let filter = EventFilter::default();
    let events = df
        .dilution_events(&DilutionEventColumns::default(), Some(&filter), 5)
        .unwrap();
    assert_eq!(events.n_events(), 2);
    assert_eq!(
        events.peaks()["P01"].index(),
        &[Timestamp::from_secs(5), Timestamp::from_secs(10)]
    );
    assert!(!events.peaks().contains_key("P02"));

    let unfiltered = df.dilution_events(&DilutionEventColumns::default(), None, 5).unwrap();
    assert_eq!(unfiltered.n_events(), 3);

    let overlapping = DilutionEventColumns {
        label: "pioreactor_unit".to_string(),
        ..DilutionEventColumns::default()
    };
    assert!(matches!(
        df.dilution_events(&overlapping, None, 5),
        Err(Error::Growth(growth_core::Error::Configuration(_)))
    ));
}

#[test]
fn test_wide_and_mask_export() {
    let table = long_frame(TimeUnit::Milliseconds)
        .to_wide_table(&LongColumns::default(), 5)
        .unwrap();
    let df = table.to_dataframe().unwrap();
    assert_eq!(df.shape(), (3, 3));
    assert!(matches!(
        df.column("timestamp").unwrap().dtype(),
        DataType::Datetime(TimeUnit::Milliseconds, _)
    ));
    assert_eq!(f64_values(&df, "P02"), vec![Some(0.5), None, None]);

    let mask = MaskTable::empty_like(&table).to_dataframe().unwrap();
    assert_eq!(mask.shape(), (3, 3));
    assert!(mask
        .column("P01")
        .unwrap()
        .bool()
        .unwrap()
        .into_iter()
        .all(|flag| flag == Some(false)));
}

#[test]
fn test_summary_export_names() {
    let summary = SummaryTable::new(
        90.0,
        vec![SummaryRow {
            reactor: "P01".to_string(),
            segment: None,
            timestamp: Some(Timestamp::from_secs(60)),
            max_growth_rate: Some(1e-4),
            od_rolling: Some(0.4),
            od_filtered: None,
            od_spline: Some(0.41),
            interval: IntervalRecord::no_signal(),
        }],
    );
    let raw = summary.to_dataframe().unwrap();
    assert_eq!(raw.shape(), (1, 10));
    assert!(raw.column("max_90%_growth_start").is_ok());
    assert_eq!(f64_values(&raw, "OD_median"), vec![Some(0.4)]);

    let display = summary.to_display_dataframe().unwrap();
    assert!(display.column("OD (rolling median)").is_ok());
    assert!(display.column("maximum growth rate").is_ok());
    assert_eq!(f64_values(&display, "OD (filtered data)"), vec![None]);
}
