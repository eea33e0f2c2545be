//! Database connection and query execution.

use crate::{DbError, QueryResult, Row, Value};
use serde::de::DeserializeOwned;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePool,
    SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::Duration;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Pooled SQLite database handle.
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Clone, Debug)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open a database from a `sqlite://` URL, creating the file if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::connect("sqlite://hearth.db?mode=rwc").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::OpenError(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;

        tracing::info!(url, "database opened");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds a single connection that never expires, so every
    /// query sees the same memory database.
    pub async fn connect_in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::OpenError(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Execute a SQL statement that doesn't return rows.
    ///
    /// Returns the number of rows affected, which callers use to detect
    /// conditional updates that matched nothing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// db.execute(
    ///     "UPDATE coupons SET used_count = used_count + 1 WHERE id = ?",
    ///     params![id]
    /// ).await?;
    /// ```
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        run_execute(&self.pool, sql, params).await
    }

    /// Execute several `;`-separated statements without parameters.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Execute a SQL query and return raw results.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        run_query(&self.pool, sql, params).await
    }

    /// Execute a SQL query and deserialize results into a vector.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params).await?.deserialize_all()
    }

    /// Execute a SQL query and deserialize the first row.
    ///
    /// Returns an error if no rows are returned.
    pub async fn query_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<T, DbError> {
        self.query_optional(sql, params)
            .await?
            .ok_or(DbError::NotFound)
    }

    /// Execute a SQL query and deserialize the first row if present.
    pub async fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        match self.query(sql, params).await?.first() {
            Some(row) => row.deserialize().map(Some),
            None => Ok(None),
        }
    }

    /// Return the first row of a query, if any.
    pub async fn query_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, DbError> {
        Ok(self.query(sql, params).await?.rows.into_iter().next())
    }

    /// Start a transaction. Dropping it without [`Transaction::commit`] rolls back.
    pub async fn begin(&self) -> Result<Transaction, DbError> {
        let inner = self.pool.begin().await?;
        Ok(Transaction { inner })
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// An open database transaction.
pub struct Transaction {
    inner: sqlx::Transaction<'static, Sqlite>,
}

impl Transaction {
    /// Execute a statement inside the transaction.
    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        run_execute(&mut *self.inner, sql, params).await
    }

    /// Run a query inside the transaction.
    pub async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        run_query(&mut *self.inner, sql, params).await
    }

    /// Return the first row of a query inside the transaction, if any.
    pub async fn query_row(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>, DbError> {
        Ok(self.query(sql, params).await?.rows.into_iter().next())
    }

    /// Commit all statements.
    pub async fn commit(self) -> Result<(), DbError> {
        self.inner.commit().await?;
        Ok(())
    }

    /// Discard all statements.
    pub async fn rollback(self) -> Result<(), DbError> {
        self.inner.rollback().await?;
        Ok(())
    }
}

fn bind_all<'q>(sql: &'q str, params: &'q [Value]) -> SqliteQuery<'q> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            Value::Null => query.bind(Option::<i64>::None),
            Value::Integer(i) => query.bind(*i),
            Value::Real(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Blob(b) => query.bind(b.as_slice()),
        };
    }
    query
}

async fn run_execute<'e, E>(executor: E, sql: &'e str, params: &'e [Value]) -> Result<u64, DbError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = bind_all(sql, params).execute(executor).await?;
    Ok(result.rows_affected())
}

async fn run_query<'e, E>(
    executor: E,
    sql: &'e str,
    params: &'e [Value],
) -> Result<QueryResult, DbError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = bind_all(sql, params).fetch_all(executor).await?;
    convert_rows(&rows)
}

fn convert_rows(rows: &[SqliteRow]) -> Result<QueryResult, DbError> {
    let columns: Vec<String> = match rows.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        None => Vec::new(),
    };

    let mut converted = Vec::with_capacity(rows.len());
    for row in rows {
        let values = (0..columns.len())
            .map(|i| convert_value(row, i))
            .collect::<Result<Vec<_>, _>>()?;
        converted.push(Row::new(columns.clone(), values));
    }

    Ok(QueryResult::new(columns, converted))
}

// SQLite is dynamically typed, so decode by the storage class of each value
// rather than the declared column type.
fn convert_value(row: &SqliteRow, index: usize) -> Result<Value, DbError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage = raw.type_info().name().to_string();

    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => Value::Real(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => Value::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Item {
        id: i64,
        name: String,
        price: f64,
    }

    async fn setup() -> Db {
        let db = Db::connect_in_memory().await.unwrap();
        db.execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE, price REAL NOT NULL, tag TEXT);
             CREATE TABLE counters (id TEXT PRIMARY KEY, used INTEGER NOT NULL, max_uses INTEGER);",
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_query_as() {
        let db = setup().await;
        db.execute(
            "INSERT INTO items (name, price) VALUES (?, ?)",
            params!["Ghee", 12.5],
        )
        .await
        .unwrap();

        let items: Vec<Item> = db
            .query_as("SELECT id, name, price FROM items", params![])
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Ghee");
        assert_eq!(items[0].id, 1);
        assert!((items[0].price - 12.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_null_round_trip() {
        let db = setup().await;
        db.execute(
            "INSERT INTO items (name, price, tag) VALUES (?, ?, ?)",
            params!["Jaggery", 3.0, None::<String>],
        )
        .await
        .unwrap();

        let row = db
            .query_row("SELECT tag FROM items WHERE name = ?", params!["Jaggery"])
            .await
            .unwrap()
            .unwrap();
        assert!(row.get("tag").unwrap().is_null());
    }

    #[tokio::test]
    async fn test_query_one_missing_row() {
        let db = setup().await;
        let result: Result<Item, _> = db
            .query_one("SELECT id, name, price FROM items WHERE id = ?", params![99])
            .await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_unique_violation_is_classified() {
        let db = setup().await;
        db.execute("INSERT INTO items (name, price) VALUES (?, ?)", params!["Salt", 1.0])
            .await
            .unwrap();
        let err = db
            .execute("INSERT INTO items (name, price) VALUES (?, ?)", params!["Salt", 2.0])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_conditional_update_reports_rows_affected() {
        let db = setup().await;
        db.execute(
            "INSERT INTO counters (id, used, max_uses) VALUES (?, ?, ?)",
            params!["c1", 0, 1],
        )
        .await
        .unwrap();

        let sql = "UPDATE counters SET used = used + 1 WHERE id = ? AND (max_uses IS NULL OR used < max_uses)";
        assert_eq!(db.execute(sql, params!["c1"]).await.unwrap(), 1);
        assert_eq!(db.execute(sql, params!["c1"]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transaction_rollback_on_drop() {
        let db = setup().await;
        {
            let mut tx = db.begin().await.unwrap();
            tx.execute("INSERT INTO items (name, price) VALUES (?, ?)", params!["Tea", 4.0])
                .await
                .unwrap();
        }
        let result = db.query("SELECT * FROM items", params![]).await.unwrap();
        assert!(result.is_empty());

        let mut tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO items (name, price) VALUES (?, ?)", params!["Tea", 4.0])
            .await
            .unwrap();
        tx.commit().await.unwrap();
        let result = db.query("SELECT * FROM items", params![]).await.unwrap();
        assert_eq!(result.len(), 1);
    }
}
