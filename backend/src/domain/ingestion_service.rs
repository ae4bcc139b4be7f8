//! Ingestion of single transactions and bounded batches.
use shared::{Transaction, TransactionList, TransactionRecord, TransactionRecordList};
use std::sync::Arc;
use tracing::info;

use super::enricher::{validate, Enricher, ValidationError};
use crate::storage::{StoreError, TransactionStorage};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to store transactions: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct IngestionService {
    enricher: Enricher,
    storage: Arc<dyn TransactionStorage>,
}

impl IngestionService {
    pub fn new(enricher: Enricher, storage: Arc<dyn TransactionStorage>) -> Self {
        Self { enricher, storage }
    }

    pub async fn submit_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<TransactionRecord, IngestError> {
        validate(&transaction)?;

        let record = self.enricher.enrich(transaction).await;
        self.storage
            .insert_records(std::slice::from_ref(&record))
            .await?;

        info!(
            "Stored transaction {} as {}",
            record.transaction_id(),
            record.category
        );
        Ok(record)
    }

    /// Enrich in order, then store the whole batch in one insert. The
    /// enricher validates every item first, so nothing is classified or
    /// stored if any item is invalid.
    pub async fn submit_transaction_list(
        &self,
        list: TransactionList,
    ) -> Result<TransactionRecordList, IngestError> {
        let records = self.enricher.enrich_batch(list.transactions).await?;
        self.storage.insert_records(&records).await?;

        info!("Stored batch of {} transactions", records.len());
        Ok(TransactionRecordList {
            transactions: records,
        })
    }
}
