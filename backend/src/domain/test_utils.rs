//! Test doubles shared by the domain and REST tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use shared::{ReportFilter, Transaction, TransactionRecord};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::classifier::{ClassificationProvider, ProviderError};
use crate::storage::{CounterpartRow, StatisticsRow, StoreError, TransactionStorage};

type Reply = Box<dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync>;

/// Provider that answers every prompt from a fixed script and records what it was asked
pub struct ScriptedProvider {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn with(
        reply: impl Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(answer: &str) -> Self {
        let answer = answer.to_string();
        Self::with(move |_| Ok(answer.clone()))
    }

    pub fn failing(make_error: fn() -> ProviderError) -> Self {
        Self::with(move |_| Err(make_error()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassificationProvider for ScriptedProvider {
    async fn complete(&self, instruction: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(instruction.to_string());
        (self.reply)(instruction)
    }
}

/// In-memory storage that counts calls and can be told to fail every operation
#[derive(Default)]
pub struct RecordingStorage {
    pub fail: bool,
    calls: AtomicUsize,
    inserted: Mutex<Vec<TransactionRecord>>,
}

impl RecordingStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inserted(&self) -> Vec<TransactionRecord> {
        self.inserted.lock().unwrap().clone()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStorage for RecordingStorage {
    async fn insert_records(&self, records: &[TransactionRecord]) -> Result<(), StoreError> {
        self.enter()?;
        self.inserted.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn query_category_statistics(
        &self,
        _filter: &ReportFilter,
    ) -> Result<Vec<StatisticsRow>, StoreError> {
        self.enter()?;
        Ok(Vec::new())
    }

    async fn query_transactions_by_category(
        &self,
        _filter: &ReportFilter,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        self.enter()?;
        Ok(self.inserted())
    }

    async fn query_counterparts_by_category(
        &self,
        _filter: &ReportFilter,
    ) -> Result<Vec<CounterpartRow>, StoreError> {
        self.enter()?;
        Ok(Vec::new())
    }
}

pub fn sample_transaction(id: &str, counterpart_name: &str) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        transaction_time_utc: Utc.with_ymd_and_hms(2024, 6, 10, 3, 44, 35).unwrap(),
        transaction_type: "CARD_TRANSACTION".to_string(),
        counterpart_name: counterpart_name.to_string(),
        amount: Decimal::new(-1897, 2),
    }
}
