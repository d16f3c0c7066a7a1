//! Single-reactor time series

use crate::{Error, Result, Timestamp};

/// Values indexed by a strictly increasing timestamp axis
#[derive(Debug, Clone, PartialEq)]
pub struct Series<V> {
    index: Vec<Timestamp>,
    values: Vec<V>,
}

pub(crate) fn ensure_strictly_increasing(index: &[Timestamp], context: &str) -> Result<()> {
    if let Some(pair) = index.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(Error::InvalidInput(format!(
            "{context} must be strictly increasing: {} is followed by {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

impl<V> Series<V> {
    pub fn new(index: Vec<Timestamp>, values: Vec<V>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(Error::size_mismatch(index.len(), values.len(), "series values"));
        }
        ensure_strictly_increasing(&index, "series index")?;
        Ok(Self { index, values })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Timestamp, V)>) -> Result<Self> {
        let (index, values) = pairs.into_iter().unzip();
        Self::new(index, values)
    }

    pub fn empty() -> Self {
        Self { index: Vec::new(), values: Vec::new() }
    }

    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, &V)> + '_ {
        self.index.iter().copied().zip(self.values.iter())
    }

    /// Value at an exact timestamp
    pub fn get(&self, timestamp: Timestamp) -> Option<&V> {
        self.index
            .binary_search(&timestamp)
            .ok()
            .map(|position| &self.values[position])
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.index.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.index.last().copied()
    }

    /// Sub-series with `start <= timestamp <= end`
    pub fn between(&self, start: Timestamp, end: Timestamp) -> Series<V>
    where
        V: Clone,
    {
        let lo = self.index.partition_point(|ts| *ts < start);
        let hi = self.index.partition_point(|ts| *ts <= end).max(lo);
        Series {
            index: self.index[lo..hi].to_vec(),
            values: self.values[lo..hi].to_vec(),
        }
    }

    pub fn map<U>(&self, f: impl FnMut(&V) -> U) -> Series<U> {
        Series {
            index: self.index.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }

    pub fn into_parts(self) -> (Vec<Timestamp>, Vec<V>) {
        (self.index, self.values)
    }
}

impl Series<Option<f64>> {
    /// Drop missing cells
    pub fn dropna(&self) -> Series<f64> {
        let (index, values) = self
            .iter()
            .filter_map(|(ts, value)| value.map(|v| (ts, v)))
            .unzip();
        Series { index, values }
    }

    pub fn count_present(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

impl Series<f64> {
    /// Timestamp and value of the maximum, first occurrence on ties
    pub fn idxmax(&self) -> Option<(Timestamp, f64)> {
        let mut best: Option<(Timestamp, f64)> = None;
        for (ts, &value) in self.iter() {
            if value.is_nan() {
                continue;
            }
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((ts, value)),
            }
        }
        best
    }

    pub fn to_optional(&self) -> Series<Option<f64>> {
        self.map(|&value| Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    #[test]
    fn test_rejects_unsorted_index() {
        let result = Series::new(vec![ts(0), ts(10), ts(10)], vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let result = Series::new(vec![ts(0), ts(10)], vec![1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_between_is_inclusive() {
        let series = Series::new(
            (0..6).map(|i| ts(i * 10)).collect(),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap();
        let slice = series.between(ts(10), ts(30));
        assert_eq!(slice.values(), &[1.0, 2.0, 3.0]);
        assert!(series.between(ts(31), ts(39)).is_empty());
        assert!(series.between(ts(40), ts(10)).is_empty());
    }

    #[test]
    fn test_dropna_and_get() {
        let series = Series::new(
            vec![ts(0), ts(5), ts(10)],
            vec![Some(1.0), None, Some(3.0)],
        )
        .unwrap();
        let dropped = series.dropna();
        assert_eq!(dropped.index(), &[ts(0), ts(10)]);
        assert_eq!(series.count_present(), 2);
        assert_eq!(series.get(ts(5)), Some(&None));
        assert_eq!(series.get(ts(6)), None);
    }

    #[test]
    fn test_idxmax_first_occurrence() {
        let series = Series::new(
            vec![ts(0), ts(1), ts(2), ts(3)],
            vec![1.0, 4.0, f64::NAN, 4.0],
        )
        .unwrap();
        assert_eq!(series.idxmax(), Some((ts(1), 4.0)));
        assert_eq!(Series::<f64>::empty().idxmax(), None);
    }
}
