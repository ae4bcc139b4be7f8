//! # Storage Module
//!
//! Persistence for enriched transaction records.
//!
//! The store is append-only: every insert adds a new version of a
//! transaction identifier, and all reads go through the collapsed view that
//! keeps only the latest version. That is what makes resubmission
//! idempotent.
//!
//! - **connection**: SQLite-backed [`ColumnarStore`] and schema setup
//! - **predicate**: time-range and category filter clauses
//! - **row**: column values, column-named rows, timestamp/amount encodings
//! - **repositories**: [`TransactionStorage`] over any `ColumnarStore`

pub mod connection;
pub mod predicate;
pub mod repositories;
pub mod row;
pub mod traits;

pub use connection::DbConnection;
pub use predicate::Predicate;
pub use repositories::TransactionRepository;
pub use row::{ColumnValue, RowMap};
pub use traits::{ColumnarStore, CounterpartRow, StatisticsRow, StoreError, TransactionStorage};
