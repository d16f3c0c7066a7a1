//! Wide tables: one shared timestamp index, one column per reactor
//!
//! Columns are always addressed by reactor name. Two tables built
//! independently are combined only after checking that their index and
//! column names agree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::series::ensure_strictly_increasing;
use crate::{Error, Result, Series, Timestamp};

/// Column-major table keyed by reactor name
#[derive(Debug, Clone, PartialEq)]
pub struct Table<V> {
    index: Vec<Timestamp>,
    names: Vec<String>,
    columns: Vec<Vec<V>>,
}

/// OD readings, missing cells are `None`
pub type WideTable = Table<Option<f64>>;

/// `true` marks a cell excluded from the clean data
pub type MaskTable = Table<bool>;

/// Whether a reactor list names the columns to keep or to drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Keep,
    Remove,
}

impl<V> Table<V> {
    pub fn new(index: Vec<Timestamp>, columns: Vec<(String, Vec<V>)>) -> Result<Self> {
        ensure_strictly_increasing(&index, "table index")?;
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            if values.len() != index.len() {
                return Err(Error::size_mismatch(
                    index.len(),
                    values.len(),
                    &format!("column '{name}'"),
                ));
            }
            if names.contains(&name) {
                return Err(Error::InvalidInput(format!("duplicate column '{name}'")));
            }
            names.push(name);
            data.push(values);
        }
        Ok(Self { index, names, columns: data })
    }

    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[V]> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(|position| self.columns[position].as_slice())
    }

    pub fn require_column(&self, name: &str) -> Result<&[V]> {
        self.column(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[V])> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Copy of one column as a series on the full index
    pub fn series(&self, name: &str) -> Option<Series<V>>
    where
        V: Clone,
    {
        let values = self.column(name)?.to_vec();
        Series::new(self.index.clone(), values).ok()
    }

    /// Cell lookup by timestamp and reactor
    pub fn get(&self, timestamp: Timestamp, name: &str) -> Option<&V> {
        let row = self.index.binary_search(&timestamp).ok()?;
        self.column(name).map(|column| &column[row])
    }

    /// Build a new table of the same shape, one column at a time
    pub fn map_columns<U>(&self, mut f: impl FnMut(&str, &[V]) -> Vec<U>) -> Result<Table<U>> {
        let columns = self
            .columns()
            .map(|(name, values)| (name.to_string(), f(name, values)))
            .collect();
        Table::new(self.index.clone(), columns)
    }

    /// Cell-wise combination with a table of identical shape
    pub fn zip_with<W, U>(
        &self,
        other: &Table<W>,
        mut f: impl FnMut(&V, &W) -> U,
    ) -> Result<Table<U>> {
        self.ensure_same_shape(other)?;
        let columns = self
            .columns()
            .zip(other.columns.iter())
            .map(|((name, left), right)| {
                let values = left.iter().zip(right.iter()).map(|(l, r)| f(l, r)).collect();
                (name.to_string(), values)
            })
            .collect();
        Table::new(self.index.clone(), columns)
    }

    pub fn ensure_same_shape<W>(&self, other: &Table<W>) -> Result<()> {
        if self.index != other.index {
            return Err(Error::InvalidInput(
                "tables do not share the same timestamp index".to_string(),
            ));
        }
        if self.names != other.names {
            return Err(Error::InvalidInput(format!(
                "tables do not share the same reactors: {:?} vs {:?}",
                self.names, other.names
            )));
        }
        Ok(())
    }

    /// Keep or drop the named reactors, preserving column order
    pub fn select(&self, reactors: &[&str], mode: Selection) -> Result<Self>
    where
        V: Clone,
    {
        if let Some(unknown) = reactors.iter().find(|name| self.column(name).is_none()) {
            return Err(Error::MissingColumn((*unknown).to_string()));
        }
        let columns = self
            .columns()
            .filter(|(name, _)| {
                let listed = reactors.contains(name);
                match mode {
                    Selection::Keep => listed,
                    Selection::Remove => !listed,
                }
            })
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect();
        Table::new(self.index.clone(), columns)
    }

    /// Rows with `start <= timestamp <= end`; open bounds are unbounded
    pub fn slice_time(&self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self
    where
        V: Clone,
    {
        let lo = start.map_or(0, |start| self.index.partition_point(|ts| *ts < start));
        let hi = end
            .map_or(self.index.len(), |end| self.index.partition_point(|ts| *ts <= end))
            .max(lo);
        Self {
            index: self.index[lo..hi].to_vec(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[lo..hi].to_vec()).collect(),
        }
    }
}

impl WideTable {
    /// Null out every cell the mask marks
    pub fn masked(&self, mask: &MaskTable) -> Result<WideTable> {
        self.zip_with(mask, |value, &excluded| if excluded { None } else { *value })
    }

    pub fn has_missing(&self) -> bool {
        self.columns.iter().flatten().any(Option::is_none)
    }

    /// Place sparse per-reactor series onto a shared index
    ///
    /// Every series timestamp must exist in `index`; cells without a value
    /// stay missing.
    pub fn from_sparse_columns(
        index: Vec<Timestamp>,
        columns: Vec<(String, Series<f64>)>,
    ) -> Result<Self> {
        let mut dense = Vec::with_capacity(columns.len());
        for (name, series) in columns {
            let mut values = vec![None; index.len()];
            for (ts, &value) in series.iter() {
                let row = index.binary_search(&ts).map_err(|_| {
                    Error::InvalidInput(format!(
                        "timestamp {ts} of column '{name}' is not part of the index"
                    ))
                })?;
                values[row] = Some(value);
            }
            dense.push((name, values));
        }
        Table::new(index, dense)
    }
}

impl MaskTable {
    /// An all-`false` mask with the shape of `table`
    pub fn empty_like<W>(table: &Table<W>) -> Self {
        Self {
            index: table.index.clone(),
            names: table.names.clone(),
            columns: vec![vec![false; table.index.len()]; table.names.len()],
        }
    }

    /// Logical OR of two masks
    pub fn or(&self, other: &MaskTable) -> Result<MaskTable> {
        self.zip_with(other, |a, b| *a || *b)
    }

    /// Number of excluded cells per reactor
    pub fn count_true(&self) -> BTreeMap<String, usize> {
        self.columns()
            .map(|(name, values)| (name.to_string(), values.iter().filter(|v| **v).count()))
            .collect()
    }

    pub fn total_true(&self) -> usize {
        self.columns.iter().flatten().filter(|v| **v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn sample() -> WideTable {
        Table::new(
            vec![ts(0), ts(5), ts(10), ts(15)],
            vec![
                ("P01".to_string(), vec![Some(0.1), Some(0.2), None, Some(0.4)]),
                ("P02".to_string(), vec![Some(1.0), Some(1.1), Some(1.2), Some(1.3)]),
                ("P03".to_string(), vec![None, None, None, None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_duplicate_columns() {
        let result = WideTable::new(
            vec![ts(0)],
            vec![("A".to_string(), vec![None]), ("A".to_string(), vec![None])],
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_lookup_by_name() {
        let table = sample();
        assert_eq!(table.get(ts(5), "P02"), Some(&Some(1.1)));
        assert_eq!(table.get(ts(6), "P02"), None);
        assert!(matches!(
            table.require_column("P09"),
            Err(Error::MissingColumn(name)) if name == "P09"
        ));
    }

    #[test]
    fn test_masked_and_or() {
        let table = sample();
        let mut first = MaskTable::empty_like(&table);
        first.columns[0][0] = true;
        let mut second = MaskTable::empty_like(&table);
        second.columns[1][3] = true;

        let combined = first.or(&second).unwrap();
        assert_eq!(combined.total_true(), 2);
        let filtered = table.masked(&combined).unwrap();
        assert_eq!(filtered.get(ts(0), "P01"), Some(&None));
        assert_eq!(filtered.get(ts(15), "P02"), Some(&None));
        assert_eq!(filtered.get(ts(5), "P01"), Some(&Some(0.2)));
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let table = sample();
        let other = table.select(&["P01"], Selection::Keep).unwrap();
        let mask = MaskTable::empty_like(&other);
        assert!(table.masked(&mask).is_err());
    }

    #[test]
    fn test_select_keep_and_remove() {
        let table = sample();
        let kept = table.select(&["P03", "P01"], Selection::Keep).unwrap();
        assert_eq!(kept.column_names(), &["P01".to_string(), "P03".to_string()]);
        let removed = table.select(&["P01"], Selection::Remove).unwrap();
        assert_eq!(removed.column_names(), &["P02".to_string(), "P03".to_string()]);
        assert!(table.select(&["nope"], Selection::Keep).is_err());
    }

    #[test]
    fn test_slice_time_inclusive() {
        let table = sample();
        let sliced = table.slice_time(Some(ts(5)), Some(ts(10)));
        assert_eq!(sliced.index(), &[ts(5), ts(10)]);
        assert_eq!(sliced.column("P02").unwrap(), &[Some(1.1), Some(1.2)]);
        let open = table.slice_time(None, Some(ts(0)));
        assert_eq!(open.n_rows(), 1);
    }

    #[test]
    fn test_from_sparse_columns() {
        let index = vec![ts(0), ts(5), ts(10)];
        let series = Series::new(vec![ts(5), ts(10)], vec![2.0, 3.0]).unwrap();
        let table =
            WideTable::from_sparse_columns(index.clone(), vec![("A".to_string(), series)]).unwrap();
        assert_eq!(table.column("A").unwrap(), &[None, Some(2.0), Some(3.0)]);
        assert!(table.has_missing());

        let stray = Series::new(vec![ts(7)], vec![1.0]).unwrap();
        assert!(WideTable::from_sparse_columns(index, vec![("A".to_string(), stray)]).is_err());
    }
}
