use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::MonthKey;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, strum_macros::Display)]
pub enum ExternalSeriesKind {
    #[strum(serialize = "search volume")]
    SearchVolume,
    #[strum(serialize = "psychology index")]
    Psychology,
}

/// A monthly series supplied from outside the pipeline, looked up by exact month key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalSeries {
    pub kind: ExternalSeriesKind,
    values: BTreeMap<MonthKey, f64>,
}

impl ExternalSeries {
    pub fn new(kind: ExternalSeriesKind) -> Self {
        ExternalSeries {
            kind,
            values: BTreeMap::new(),
        }
    }

    pub fn from_pairs(kind: ExternalSeriesKind, pairs: impl IntoIterator<Item = (MonthKey, f64)>) -> Self {
        ExternalSeries {
            kind,
            values: pairs.into_iter().collect(),
        }
    }

    /// Inserts unless the month already has a value; returns whether it was inserted.
    pub fn insert_first(&mut self, month: MonthKey, value: f64) -> bool {
        if self.values.contains_key(&month) {
            return false;
        }
        self.values.insert(month, value);
        true
    }

    pub fn get(&self, month: MonthKey) -> Option<f64> {
        self.values.get(&month).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The two external inputs every region is scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSeriesSet {
    pub search_volume: ExternalSeries,
    pub psychology: ExternalSeries,
}
