//! Column values and column-named result rows exchanged with the store,
//! plus the encodings used for timestamps and amounts.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::traits::StoreError;

/// Fixed-width UTC format; lexical order equals chronological order
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

/// One result row keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMap {
    values: HashMap<String, ColumnValue>,
}

impl RowMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: ColumnValue) {
        self.values.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, column: &str) -> Result<&ColumnValue, StoreError> {
        self.values
            .get(column)
            .ok_or_else(|| StoreError::decode(column, "column missing from result"))
    }

    pub fn text(&self, column: &str) -> Result<&str, StoreError> {
        match self.require(column)? {
            ColumnValue::Text(s) => Ok(s),
            other => Err(StoreError::decode(column, format!("expected text, got {:?}", other))),
        }
    }

    pub fn integer(&self, column: &str) -> Result<i64, StoreError> {
        match self.require(column)? {
            ColumnValue::Integer(i) => Ok(*i),
            other => Err(StoreError::decode(column, format!("expected integer, got {:?}", other))),
        }
    }

    /// Integer column where SQL NULL means zero (e.g. SUM over no rows)
    pub fn integer_or_zero(&self, column: &str) -> Result<i64, StoreError> {
        match self.require(column)? {
            ColumnValue::Null => Ok(0),
            _ => self.integer(column),
        }
    }
}

impl FromIterator<(String, ColumnValue)> for RowMap {
    fn from_iter<I: IntoIterator<Item = (String, ColumnValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

pub fn encode_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::decode(column, format!("bad timestamp {raw:?}: {e}")))
}

/// Amounts are stored as whole cents so that sums stay exact
pub fn encode_amount(amount: &Decimal) -> Result<i64, StoreError> {
    let mut cents = *amount;
    cents.rescale(2);
    i64::try_from(cents.mantissa())
        .map_err(|_| StoreError::Encode(format!("amount {amount} does not fit the amount column")))
}

pub fn decode_amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
