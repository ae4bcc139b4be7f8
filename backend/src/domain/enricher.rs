use chrono::SubsecRound;
use shared::{Transaction, TransactionRecord};
use tracing::info;

use super::classifier::Classifier;
use crate::storage::row::encode_amount;

/// Upper bound on transactions per batch submission. Each item costs one
/// classification call, so this keeps a request under the provider's rate
/// limits.
pub const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("At most {max} transactions can be submitted per request, got {actual}")]
    BatchTooLarge { max: usize, actual: usize },
    #[error("Transaction id cannot be empty")]
    EmptyTransactionId,
    #[error("Amount {amount} of transaction {transaction_id} has more than 2 decimal places")]
    AmountPrecision {
        transaction_id: String,
        amount: String,
    },
    #[error("Amount {amount} of transaction {transaction_id} is out of range")]
    AmountOutOfRange {
        transaction_id: String,
        amount: String,
    },
}

/// Check a single transaction before any classification or store call
pub fn validate(transaction: &Transaction) -> Result<(), ValidationError> {
    if transaction.transaction_id.trim().is_empty() {
        return Err(ValidationError::EmptyTransactionId);
    }
    if transaction.amount.normalize().scale() > 2 {
        return Err(ValidationError::AmountPrecision {
            transaction_id: transaction.transaction_id.clone(),
            amount: transaction.amount.to_string(),
        });
    }
    if encode_amount(&transaction.amount).is_err() {
        return Err(ValidationError::AmountOutOfRange {
            transaction_id: transaction.transaction_id.clone(),
            amount: transaction.amount.to_string(),
        });
    }
    Ok(())
}

/// Check the batch bound and every item of a batch
pub fn validate_batch(transactions: &[Transaction]) -> Result<(), ValidationError> {
    if transactions.len() > MAX_BATCH_SIZE {
        return Err(ValidationError::BatchTooLarge {
            max: MAX_BATCH_SIZE,
            actual: transactions.len(),
        });
    }
    transactions.iter().try_for_each(validate)
}

/// Builds stored records from raw transactions plus their assigned category
#[derive(Clone)]
pub struct Enricher {
    classifier: Classifier,
}

impl Enricher {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub async fn enrich(&self, mut transaction: Transaction) -> TransactionRecord {
        transaction.transaction_time_utc = transaction.transaction_time_utc.trunc_subsecs(6);
        let category = self.classifier.classify(&transaction.counterpart_name).await;
        TransactionRecord::new(transaction, category)
    }

    /// Enrich a whole batch in submission order. Oversized batches are
    /// rejected before the first classification call.
    pub async fn enrich_batch(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<TransactionRecord>, ValidationError> {
        validate_batch(&transactions)?;
        info!("Enriching batch of {} transactions", transactions.len());

        let mut records = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            records.push(self.enrich(transaction).await);
        }
        Ok(records)
    }
}
