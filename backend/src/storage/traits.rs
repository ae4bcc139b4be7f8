//! # Storage Traits
//!
//! Two seams separate the domain from persistence:
//!
//! - [`ColumnarStore`] is the narrow interface of the external store: append
//!   row-major data under an ordered column list, and run a filtered query
//!   that returns column-named rows.
//! - [`TransactionStorage`] is what the services talk to. It owns predicate
//!   construction and row decoding and is implemented once over any
//!   `ColumnarStore`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{ReportFilter, TransactionRecord};

use super::row::{ColumnValue, RowMap};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("cannot decode column {column}: {reason}")]
    Decode { column: String, reason: String },
    #[error("cannot encode value: {0}")]
    Encode(String),
}

impl StoreError {
    pub fn decode(column: &str, reason: impl Into<String>) -> Self {
        StoreError::Decode {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

/// Interface of the external append-oriented store.
///
/// Implementations acquire a connection per call and must release it on
/// every exit path. Rows written under the same identifier are collapsed
/// by the store; readers query the collapsed view.
#[async_trait]
pub trait ColumnarStore: Send + Sync {
    /// Append `rows` to `table`. Each row lists values in `columns` order.
    /// All rows are written or none are.
    async fn insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<ColumnValue>>,
    ) -> Result<(), StoreError>;

    /// Run a query with positional parameters and return column-named rows
    async fn query(&self, sql: &str, params: &[ColumnValue]) -> Result<Vec<RowMap>, StoreError>;
}

/// Per-category count and sum as returned by the store.
/// Categories without rows are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsRow {
    pub category: String,
    pub transaction_count: u64,
    pub total_amount: Decimal,
}

/// Distinct counterpart names of one category as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct CounterpartRow {
    pub category: String,
    pub counterpart_names: Vec<String>,
}

/// Trait defining the transaction persistence operations used by the services
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Store enriched records. Re-inserting an identifier replaces the
    /// earlier row in every subsequent read.
    async fn insert_records(&self, records: &[TransactionRecord]) -> Result<(), StoreError>;

    /// Count and total amount per category
    async fn query_category_statistics(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<StatisticsRow>, StoreError>;

    /// Full records ordered by category, then transaction time descending
    async fn query_transactions_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Distinct counterpart names per category
    async fn query_counterparts_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<CounterpartRow>, StoreError>;
}
