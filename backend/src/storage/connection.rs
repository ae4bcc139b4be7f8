use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use super::row::{ColumnValue, RowMap};
use super::traits::{ColumnarStore, StoreError};
use crate::config::StoreConfig;

/// Append-only table; every insert becomes a new version of its identifier
pub const TRANSACTIONS_TABLE: &str = "transactions";

/// Collapsed view exposing only the latest version of each identifier
pub const TRANSACTIONS_FINAL_VIEW: &str = "transactions_final";

/// DbConnection wraps the SQLite pool backing the transaction store.
///
/// Connections are checked out per operation and handed back by the pool
/// guard when it drops, whether the operation succeeded or not.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Connect (creating the database file if needed) and set up the schema
    pub async fn new(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        info!("Connected to transaction store at {}", url);

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn init(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(&config.database_url, config.max_connections).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self, StoreError> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url, 1).await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                version INTEGER PRIMARY KEY AUTOINCREMENT,
                transactionId TEXT NOT NULL,
                transactionTimeUtc TEXT NOT NULL,
                transactionType TEXT NOT NULL,
                counterpartName TEXT NOT NULL,
                amount INTEGER NOT NULL,
                category TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_id_version
            ON transactions(transactionId, version DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_time
            ON transactions(transactionTimeUtc);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE VIEW IF NOT EXISTS transactions_final AS
            SELECT transactionId, transactionTimeUtc, transactionType, counterpartName,
                   amount, category
            FROM transactions
            WHERE version IN (SELECT MAX(version) FROM transactions GROUP BY transactionId);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q ColumnValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        ColumnValue::Null => query.bind(None::<String>),
        ColumnValue::Integer(i) => query.bind(*i),
        ColumnValue::Real(f) => query.bind(*f),
        ColumnValue::Text(s) => query.bind(s.as_str()),
    }
}

fn decode_row(row: &SqliteRow) -> Result<RowMap, StoreError> {
    let mut map = RowMap::new();

    for column in row.columns() {
        let index = column.ordinal();
        let name = column.name();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            ColumnValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => ColumnValue::Integer(row.try_get(index)?),
                "REAL" => ColumnValue::Real(row.try_get(index)?),
                "TEXT" => ColumnValue::Text(row.try_get(index)?),
                other => {
                    return Err(StoreError::decode(name, format!("unsupported column type {other}")))
                }
            }
        };

        map.insert(name, value);
    }

    Ok(map)
}

#[async_trait]
impl ColumnarStore for DbConnection {
    async fn insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<ColumnValue>>,
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        // Dropping the transaction on an early return rolls it back and
        // returns the connection to the pool.
        let mut tx = self.pool.begin().await?;
        for row in &rows {
            if row.len() != columns.len() {
                return Err(StoreError::Encode(format!(
                    "row has {} values for {} columns",
                    row.len(),
                    columns.len()
                )));
            }

            let mut query = sqlx::query(&sql);
            for value in row {
                query = bind_value(query, value);
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        debug!("Inserted {} rows into {}", rows.len(), table);
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[ColumnValue]) -> Result<Vec<RowMap>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let mut query = sqlx::query(sql);
        for value in params {
            query = bind_value(query, value);
        }
        let rows = query.fetch_all(&mut *conn).await?;

        debug!("Query returned {} rows", rows.len());
        rows.iter().map(decode_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> DbConnection {
        DbConnection::init_test().await.expect("Failed to create test database")
    }

    fn row(id: &str, amount: i64) -> Vec<ColumnValue> {
        vec![
            id.into(),
            "2024-01-01T00:00:00.000000Z".into(),
            "CARD".into(),
            "Muffin Break".into(),
            amount.into(),
            "food".into(),
        ]
    }

    const COLUMNS: [&str; 6] = [
        "transactionId",
        "transactionTimeUtc",
        "transactionType",
        "counterpartName",
        "amount",
        "category",
    ];

    #[tokio::test]
    async fn test_raw_table_keeps_history_but_view_collapses() {
        let db = setup_test().await;

        db.insert(TRANSACTIONS_TABLE, &COLUMNS, vec![row("t1", -100)]).await.unwrap();
        db.insert(TRANSACTIONS_TABLE, &COLUMNS, vec![row("t1", -250)]).await.unwrap();

        let history = db
            .query("SELECT transactionId FROM transactions", &[])
            .await
            .unwrap();
        assert_eq!(history.len(), 2);

        let collapsed = db
            .query("SELECT transactionId, amount FROM transactions_final", &[])
            .await
            .unwrap();
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].integer("amount").unwrap(), -250);
    }

    #[tokio::test]
    async fn test_query_binds_parameters_and_decodes_types() {
        let db = setup_test().await;
        db.insert(TRANSACTIONS_TABLE, &COLUMNS, vec![row("t1", -100), row("t2", 40)])
            .await
            .unwrap();

        let rows = db
            .query(
                "SELECT transactionId, amount, NULL AS empty_col, 1.5 AS ratio \
                 FROM transactions_final WHERE transactionId = ?",
                &[ColumnValue::from("t2")],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("transactionId").unwrap(), "t2");
        assert_eq!(rows[0].integer("amount").unwrap(), 40);
        assert_eq!(rows[0].get("empty_col"), Some(&ColumnValue::Null));
        assert_eq!(rows[0].get("ratio"), Some(&ColumnValue::Real(1.5)));
    }

    #[tokio::test]
    async fn test_batch_insert_is_all_or_nothing() {
        let db = setup_test().await;

        let short_row = vec![ColumnValue::from("t2")];
        let result = db
            .insert(TRANSACTIONS_TABLE, &COLUMNS, vec![row("t1", -100), short_row])
            .await;
        assert!(matches!(result, Err(StoreError::Encode(_))));

        let rows = db.query("SELECT * FROM transactions", &[]).await.unwrap();
        assert!(rows.is_empty(), "Failed batch must not leave partial rows");

        // The connection went back to the pool: a follow-up operation still works
        db.insert(TRANSACTIONS_TABLE, &COLUMNS, vec![row("t3", 5)]).await.unwrap();
        let rows = db.query("SELECT * FROM transactions_final", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_query_releases_connection() {
        let db = setup_test().await;

        assert!(db.query("SELECT * FROM no_such_table", &[]).await.is_err());
        // Pool has a single connection; this would time out if it leaked
        assert!(db.query("SELECT 1 AS one", &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_insert_is_a_no_op() {
        let db = setup_test().await;
        db.insert(TRANSACTIONS_TABLE, &COLUMNS, Vec::new()).await.unwrap();
        let rows = db.query("SELECT * FROM transactions", &[]).await.unwrap();
        assert!(rows.is_empty());
    }
}
