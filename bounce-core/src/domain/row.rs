//! Candidate rows and the fetched candidate table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::column::Column;

/// One symbol from the fetched snapshot.
///
/// Fetched values are fixed at construction. After that a row can only grow:
/// stages may append derived fields, but never overwrite or remove anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    /// Provider ticker, e.g. `NASDAQ:AAPL`.
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    values: BTreeMap<Column, f64>,
    #[serde(default)]
    derived: BTreeMap<String, f64>,
}

impl CandidateRow {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            values: BTreeMap::new(),
            derived: BTreeMap::new(),
        }
    }

    /// Builder-style helper for constructing rows from fetched data.
    pub fn with(mut self, column: Column, value: f64) -> Self {
        self.values.insert(column, value);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Numeric value of a column. NaN is reported as missing.
    pub fn get(&self, column: Column) -> Option<f64> {
        self.values.get(&column).copied().filter(|v| !v.is_nan())
    }

    /// Next earnings release as a UTC timestamp, if the provider knows it.
    pub fn earnings_date(&self) -> Option<DateTime<Utc>> {
        let secs = self.get(Column::EarningsNextDate)?;
        DateTime::from_timestamp(secs.trunc() as i64, 0)
    }

    /// Append a derived field. Returns `false` (and leaves the row untouched)
    /// if the field already exists.
    pub fn append_derived(&mut self, key: &str, value: f64) -> bool {
        if self.derived.contains_key(key) {
            return false;
        }
        self.derived.insert(key.to_string(), value);
        true
    }

    pub fn derived(&self, key: &str) -> Option<f64> {
        self.derived.get(key).copied()
    }

    pub fn values(&self) -> &BTreeMap<Column, f64> {
        &self.values
    }
}

/// The symbol-keyed result of one remote query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateTable {
    rows: Vec<CandidateRow>,
    /// Total matches reported by the provider (may exceed `rows.len()` when
    /// the query limit truncated the result).
    pub total_count: usize,
}

impl CandidateTable {
    /// Build a table, keeping the first row seen for each symbol.
    pub fn new(rows: Vec<CandidateRow>, total_count: usize) -> Self {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|r| seen.insert(r.symbol.clone()))
            .collect();
        Self { rows, total_count }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CandidateRow] {
        &self.rows
    }

    pub fn get(&self, symbol: &str) -> Option<&CandidateRow> {
        self.rows.iter().find(|r| r.symbol == symbol)
    }

    pub fn into_rows(self) -> Vec<CandidateRow> {
        self.rows
    }
}
