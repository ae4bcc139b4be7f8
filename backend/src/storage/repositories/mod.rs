pub mod transaction_repository;

pub use transaction_repository::{record_to_row, TransactionRepository, RECORD_COLUMNS};
