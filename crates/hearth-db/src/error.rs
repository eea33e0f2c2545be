//! Database error types.

use thiserror::Error;

/// Errors that can occur when using the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open the database.
    #[error("Failed to open database: {0}")]
    OpenError(String),

    /// Failed to execute a query.
    #[error("Query execution failed: {0}")]
    QueryError(String),

    /// A UNIQUE constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A FOREIGN KEY constraint rejected the write.
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Failed to deserialize a row.
    #[error("Deserialization error: {0}")]
    DeserializeError(String),

    /// Type conversion error.
    #[error("Type conversion error: {0}")]
    TypeError(String),

    /// No rows returned when one was expected.
    #[error("No rows returned")]
    NotFound,
}

impl DbError {
    /// Whether this error came from a uniqueness constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    DbError::UniqueViolation(db_err.message().to_string())
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation(db_err.message().to_string())
                } else {
                    DbError::QueryError(db_err.message().to_string())
                }
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::TypeError(format!("column {}: {}", index, source))
            }
            other => DbError::QueryError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}
