//! CSV exports to `POST /transaction_list` request bodies.

use shared::{Transaction, TransactionList};
use std::io::Read;

use crate::domain::MAX_BATCH_SIZE;

/// Read up to `count` transactions starting at data row `start_row`
/// (0-based, header excluded). `count` is capped at the batch bound so the
/// result is always a submittable body.
pub fn read_transaction_batch<R: Read>(
    reader: R,
    start_row: usize,
    count: usize,
) -> Result<TransactionList, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let transactions = rdr
        .deserialize::<Transaction>()
        .skip(start_row)
        .take(count.min(MAX_BATCH_SIZE))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransactionList { transactions })
}
