use async_trait::async_trait;
use shared::{Category, ReportFilter, Transaction, TransactionRecord};
use std::str::FromStr;
use tracing::info;

use crate::storage::connection::{TRANSACTIONS_FINAL_VIEW, TRANSACTIONS_TABLE};
use crate::storage::predicate::Predicate;
use crate::storage::row::{
    decode_amount, decode_timestamp, encode_amount, encode_timestamp, ColumnValue, RowMap,
};
use crate::storage::traits::{
    ColumnarStore, CounterpartRow, StatisticsRow, StoreError, TransactionStorage,
};

/// Stored record schema, in write order
pub const RECORD_COLUMNS: [&str; 6] = [
    "transactionId",
    "transactionTimeUtc",
    "transactionType",
    "counterpartName",
    "amount",
    "category",
];

/// Repository for transaction records over any columnar store
#[derive(Clone)]
pub struct TransactionRepository<S> {
    store: S,
}

impl<S: ColumnarStore> TransactionRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn run(&self, sql: String, predicate: &Predicate) -> Result<Vec<RowMap>, StoreError> {
        info!("Querying transaction store with: {}", sql);
        self.store.query(&sql, predicate.params()).await
    }
}

/// Encode a record as one row, values in `RECORD_COLUMNS` order
pub fn record_to_row(record: &TransactionRecord) -> Result<Vec<ColumnValue>, StoreError> {
    let tx = &record.transaction;
    Ok(vec![
        tx.transaction_id.as_str().into(),
        encode_timestamp(&tx.transaction_time_utc).into(),
        tx.transaction_type.as_str().into(),
        tx.counterpart_name.as_str().into(),
        encode_amount(&tx.amount)?.into(),
        record.category.as_str().into(),
    ])
}

fn row_to_record(row: &RowMap) -> Result<TransactionRecord, StoreError> {
    let category_label = row.text("category")?;
    let category = Category::from_str(category_label)
        .map_err(|e| StoreError::decode("category", e.to_string()))?;

    let transaction = Transaction {
        transaction_id: row.text("transactionId")?.to_string(),
        transaction_time_utc: decode_timestamp(
            "transactionTimeUtc",
            row.text("transactionTimeUtc")?,
        )?,
        transaction_type: row.text("transactionType")?.to_string(),
        counterpart_name: row.text("counterpartName")?.to_string(),
        amount: decode_amount(row.integer("amount")?),
    };

    Ok(TransactionRecord::new(transaction, category))
}

fn row_to_statistics(row: &RowMap) -> Result<StatisticsRow, StoreError> {
    let count = row.integer("transaction_count")?;
    Ok(StatisticsRow {
        category: row.text("category")?.to_string(),
        transaction_count: u64::try_from(count).map_err(|_| {
            StoreError::decode("transaction_count", format!("negative count {count}"))
        })?,
        total_amount: decode_amount(row.integer_or_zero("total_amount")?),
    })
}

fn row_to_counterparts(row: &RowMap) -> Result<CounterpartRow, StoreError> {
    let names: Vec<String> = serde_json::from_str(row.text("counterpart_names")?)
        .map_err(|e| StoreError::decode("counterpart_names", e.to_string()))?;
    Ok(CounterpartRow {
        category: row.text("category")?.to_string(),
        counterpart_names: names,
    })
}

#[async_trait]
impl<S: ColumnarStore> TransactionStorage for TransactionRepository<S> {
    async fn insert_records(&self, records: &[TransactionRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let rows = records
            .iter()
            .map(record_to_row)
            .collect::<Result<Vec<_>, _>>()?;

        info!("Inserting {} transaction records", rows.len());
        self.store.insert(TRANSACTIONS_TABLE, &RECORD_COLUMNS, rows).await
    }

    async fn query_category_statistics(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<StatisticsRow>, StoreError> {
        let predicate = Predicate::from_filter(filter);
        let sql = format!(
            "SELECT category, COUNT(*) AS transaction_count, SUM(amount) AS total_amount \
             FROM {} {} GROUP BY category",
            TRANSACTIONS_FINAL_VIEW,
            predicate.where_clause()
        );

        self.run(sql, &predicate)
            .await?
            .iter()
            .map(row_to_statistics)
            .collect()
    }

    async fn query_transactions_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let predicate = Predicate::from_filter(filter);
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY category, transactionTimeUtc DESC",
            RECORD_COLUMNS.join(", "),
            TRANSACTIONS_FINAL_VIEW,
            predicate.where_clause()
        );

        self.run(sql, &predicate)
            .await?
            .iter()
            .map(row_to_record)
            .collect()
    }

    async fn query_counterparts_by_category(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<CounterpartRow>, StoreError> {
        let predicate = Predicate::from_filter(filter);
        let sql = format!(
            "SELECT category, json_group_array(DISTINCT counterpartName) AS counterpart_names \
             FROM {} {} GROUP BY category",
            TRANSACTIONS_FINAL_VIEW,
            predicate.where_clause()
        );

        self.run(sql, &predicate)
            .await?
            .iter()
            .map(row_to_counterparts)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connection::DbConnection;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    async fn setup_test() -> TransactionRepository<DbConnection> {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        TransactionRepository::new(db)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn record(
        id: &str,
        time: DateTime<Utc>,
        counterpart: &str,
        cents: i64,
        category: Category,
    ) -> TransactionRecord {
        TransactionRecord::new(
            Transaction {
                transaction_id: id.to_string(),
                transaction_time_utc: time,
                transaction_type: "CARD_TRANSACTION".to_string(),
                counterpart_name: counterpart.to_string(),
                amount: Decimal::new(cents, 2),
            },
            category,
        )
    }

    async fn seed(repo: &TransactionRepository<DbConnection>) {
        repo.insert_records(&[
            record("t1", at(1, 8), "Muffin Break", -1897, Category::Food),
            record("t2", at(3, 12), "Muffin Break", -550, Category::Food),
            record("t3", at(2, 9), "Opal", -420, Category::Transport),
            record("t4", at(5, 18), "Event Cinemas", -2500, Category::Entertainment),
            record("t5", at(4, 7), "Boost Juice", -890, Category::Food),
        ])
        .await
        .expect("Failed to seed records");
    }

    #[test]
    fn test_record_row_follows_column_order() {
        let r = record("t1", at(1, 0), "Muffin Break", -1897, Category::Food);
        let row = record_to_row(&r).unwrap();

        assert_eq!(row.len(), RECORD_COLUMNS.len());
        assert_eq!(row[0], ColumnValue::from("t1"));
        assert_eq!(row[1], ColumnValue::from("2024-01-01T00:00:00.000000Z"));
        assert_eq!(row[2], ColumnValue::from("CARD_TRANSACTION"));
        assert_eq!(row[3], ColumnValue::from("Muffin Break"));
        assert_eq!(row[4], ColumnValue::Integer(-1897));
        assert_eq!(row[5], ColumnValue::from("food"));
    }

    #[tokio::test]
    async fn test_reinserting_same_id_yields_one_record() {
        let repo = setup_test().await;

        let first = record("t1", at(1, 0), "Muffin Break", -1897, Category::Uncategorized);
        let second = record("t1", at(1, 0), "Muffin Break", -1897, Category::Food);
        repo.insert_records(&[first]).await.unwrap();
        repo.insert_records(&[second.clone()]).await.unwrap();

        let records = repo
            .query_transactions_by_category(&ReportFilter::default())
            .await
            .unwrap();
        assert_eq!(records, vec![second]);

        let stats = repo
            .query_category_statistics(&ReportFilter::default())
            .await
            .unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].category, "food");
        assert_eq!(stats[0].transaction_count, 1);
    }

    #[tokio::test]
    async fn test_statistics_sum_exactly() {
        let repo = setup_test().await;
        seed(&repo).await;

        let mut stats = repo
            .query_category_statistics(&ReportFilter::default())
            .await
            .unwrap();
        stats.sort_by(|a, b| a.category.cmp(&b.category));

        let food = stats.iter().find(|s| s.category == "food").unwrap();
        assert_eq!(food.transaction_count, 3);
        assert_eq!(food.total_amount, Decimal::new(-3337, 2));

        let transport = stats.iter().find(|s| s.category == "transport").unwrap();
        assert_eq!(transport.transaction_count, 1);
        assert_eq!(transport.total_amount, Decimal::new(-420, 2));

        assert!(stats.iter().all(|s| s.category != "retail"));
    }

    #[tokio::test]
    async fn test_time_bounds_are_inclusive() {
        let repo = setup_test().await;
        seed(&repo).await;

        let filter = ReportFilter::between(at(2, 9), at(4, 7));
        let records = repo.query_transactions_by_category(&filter).await.unwrap();

        let mut ids: Vec<&str> = records.iter().map(|r| r.transaction_id()).collect();
        ids.sort();
        assert_eq!(ids, vec!["t2", "t3", "t5"]);
    }

    #[tokio::test]
    async fn test_transactions_ordered_by_category_then_time_desc() {
        let repo = setup_test().await;
        seed(&repo).await;

        let records = repo
            .query_transactions_by_category(&ReportFilter::default())
            .await
            .unwrap();

        let order: Vec<&str> = records.iter().map(|r| r.transaction_id()).collect();
        // entertainment < food < transport; food newest first
        assert_eq!(order, vec!["t4", "t5", "t2", "t1", "t3"]);
    }

    #[tokio::test]
    async fn test_category_filter() {
        let repo = setup_test().await;
        seed(&repo).await;

        let records = repo
            .query_transactions_by_category(&ReportFilter::for_category(Category::Transport))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_id(), "t3");

        let stats = repo
            .query_category_statistics(&ReportFilter::for_category(Category::Retail))
            .await
            .unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_counterparts_are_distinct_per_category() {
        let repo = setup_test().await;
        seed(&repo).await;

        let rows = repo
            .query_counterparts_by_category(&ReportFilter::default())
            .await
            .unwrap();

        let food = rows.iter().find(|r| r.category == "food").unwrap();
        let mut names = food.counterpart_names.clone();
        names.sort();
        assert_eq!(names, vec!["Boost Juice", "Muffin Break"]);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_microseconds_and_amount() {
        let repo = setup_test().await;
        let time = DateTime::parse_from_rfc3339("2024-06-10T03:44:35.035695Z")
            .unwrap()
            .with_timezone(&Utc);
        let original = record("ef8a119b", time, "Muffin Break (Miranda)", -1897, Category::Food);

        repo.insert_records(&[original.clone()]).await.unwrap();
        let records = repo
            .query_transactions_by_category(&ReportFilter::default())
            .await
            .unwrap();

        assert_eq!(records, vec![original]);
    }
}
