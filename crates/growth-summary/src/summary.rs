//! Per-reactor growth summaries
//!
//! A batch run has one row per reactor; a turbidostat run has one row per
//! fitted segment. OD values are looked up by reactor name and timestamp in
//! each input table, so the tables only need to share reactor names.

use std::collections::BTreeMap;
use std::fmt;

use growth_core::{IntervalRecord, Result, Timestamp, WideTable};
use growth_turbidostat::SegmentMaximum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::high_growth::high_growth_intervals;

pub const COL_REACTOR: &str = "pioreactor_unit";
pub const COL_SEGMENT: &str = "segment";
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_MAX_GROWTH_RATE: &str = "max_growth_rate";
pub const COL_OD_MEDIAN: &str = "OD_median";
pub const COL_OD_FILTERED: &str = "OD_in_filtered_data";
pub const COL_OD_SPLINE: &str = "OD_spline";

/// Reader-facing name of a summary column, the column itself if unmapped
pub fn display_name(column: &str) -> &str {
    match column {
        COL_OD_MEDIAN => "OD (rolling median)",
        COL_OD_SPLINE => "OD (estimated spline)",
        COL_MAX_GROWTH_RATE | "OD_derivative" => "maximum growth rate",
        COL_OD_FILTERED => "OD (filtered data)",
        other => other,
    }
}

/// `max_{threshold}%_growth_{start,end,duration,is_continuous}`
pub fn interval_column_names(threshold: f64) -> [String; 4] {
    let prefix = format!("max_{threshold}%_growth");
    [
        format!("{prefix}_start"),
        format!("{prefix}_end"),
        format!("{prefix}_duration"),
        format!("{prefix}_is_continuous"),
    ]
}

/// One reactor, or one segment of a reactor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub reactor: String,
    /// Segment position for turbidostat runs
    pub segment: Option<usize>,
    /// Timestamp of the maximum growth rate
    pub timestamp: Option<Timestamp>,
    pub max_growth_rate: Option<f64>,
    pub od_rolling: Option<f64>,
    pub od_filtered: Option<f64>,
    pub od_spline: Option<f64>,
    pub interval: IntervalRecord,
}

impl fmt::Display for SummaryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reactor)?;
        if let Some(segment) = self.segment {
            write!(f, "[{segment}]")?;
        }
        match (self.timestamp, self.max_growth_rate) {
            (Some(ts), Some(rate)) => write!(f, ": max rate {rate:.3e} at {ts}, {}", self.interval),
            _ => write!(f, ": no growth signal"),
        }
    }
}

/// Summary rows sharing one high-growth threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    threshold: f64,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new(threshold: f64, rows: Vec<SummaryRow>) -> Self {
        Self { threshold, rows }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one reactor in table order
    pub fn reactor(&self, reactor: &str) -> impl Iterator<Item = &SummaryRow> + '_ {
        let reactor = reactor.to_string();
        self.rows.iter().filter(move |row| row.reactor == reactor)
    }

    /// Whether any row carries a segment position
    pub fn is_segmented(&self) -> bool {
        self.rows.iter().any(|row| row.segment.is_some())
    }

    /// Column names in export order
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![COL_REACTOR.to_string()];
        if self.is_segmented() {
            names.push(COL_SEGMENT.to_string());
        }
        names.extend(
            [COL_TIMESTAMP, COL_MAX_GROWTH_RATE, COL_OD_MEDIAN, COL_OD_FILTERED, COL_OD_SPLINE]
                .map(String::from),
        );
        names.extend(interval_column_names(self.threshold));
        names
    }

    pub fn display_column_names(&self) -> Vec<String> {
        self.column_names()
            .iter()
            .map(|name| display_name(name).to_string())
            .collect()
    }
}

/// Tables a summary reads its OD values from
#[derive(Debug, Clone, Copy)]
pub struct SummaryInputs<'a> {
    pub rolling: &'a WideTable,
    /// Filtered readings before smoothing, if still at hand
    pub filtered: Option<&'a WideTable>,
    pub fitted: &'a WideTable,
    pub derivatives: &'a WideTable,
}

impl SummaryInputs<'_> {
    fn lookup(table: &WideTable, timestamp: Timestamp, reactor: &str) -> Option<f64> {
        table.get(timestamp, reactor).copied().flatten()
    }

    fn row(
        &self,
        reactor: &str,
        segment: Option<usize>,
        at: Option<(Timestamp, f64)>,
        interval: IntervalRecord,
    ) -> SummaryRow {
        let timestamp = at.map(|(ts, _)| ts);
        let value_in = |table: &WideTable| timestamp.and_then(|ts| Self::lookup(table, ts, reactor));
        SummaryRow {
            reactor: reactor.to_string(),
            segment,
            timestamp,
            max_growth_rate: at.map(|(_, rate)| rate),
            od_rolling: value_in(self.rolling),
            od_filtered: self.filtered.and_then(value_in),
            od_spline: value_in(self.fitted),
            interval,
        }
    }
}

/// First timestamp and value of the column maximum
fn column_max(index: &[Timestamp], values: &[Option<f64>]) -> Option<(Timestamp, f64)> {
    let mut best: Option<(Timestamp, f64)> = None;
    for (&ts, value) in index.iter().zip(values) {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((ts, value)),
        }
    }
    best
}

/// One row per reactor of the derivative table
pub fn summarize_batch(inputs: SummaryInputs<'_>, threshold: f64) -> Result<SummaryTable> {
    let intervals = high_growth_intervals(inputs.derivatives, threshold)?;
    let index = inputs.derivatives.index();
    let rows: Vec<SummaryRow> = inputs
        .derivatives
        .columns()
        .map(|(reactor, values)| {
            let interval = intervals.get(reactor).copied().unwrap_or_default();
            inputs.row(reactor, None, column_max(index, values), interval)
        })
        .collect();
    debug!(rows = rows.len(), threshold, "batch summary");
    Ok(SummaryTable::new(threshold, rows))
}

/// One row per fitted segment, ordered by reactor then timestamp
///
/// The growth rate is read from the stitched derivative table at the
/// segment's maximum, which differs from the segment-local fit only at a
/// boundary shared with the previous segment. The interval covers the whole
/// reactor series.
pub fn summarize_segments(
    inputs: SummaryInputs<'_>,
    maxima: &BTreeMap<String, Vec<SegmentMaximum>>,
    threshold: f64,
) -> Result<SummaryTable> {
    let intervals = high_growth_intervals(inputs.derivatives, threshold)?;
    let mut rows = Vec::new();
    for (reactor, segments) in maxima {
        let interval = intervals.get(reactor).copied().unwrap_or_default();
        let mut segments: Vec<&SegmentMaximum> = segments.iter().collect();
        segments.sort_by_key(|maximum| maximum.timestamp);
        for maximum in segments {
            let rate = SummaryInputs::lookup(inputs.derivatives, maximum.timestamp, reactor)
                .unwrap_or(maximum.growth_rate);
            rows.push(inputs.row(
                reactor,
                Some(maximum.segment),
                Some((maximum.timestamp, rate)),
                interval,
            ));
        }
    }
    debug!(rows = rows.len(), threshold, "segment summary");
    Ok(SummaryTable::new(threshold, rows))
}
