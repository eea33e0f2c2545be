//! Type-safe SQLite database layer for Hearth.
//!
//! Wraps a pooled sqlx SQLite connection behind a small dynamic API:
//! positional parameters built with [`params!`], rows returned as
//! [`Row`] values that can be read column by column or deserialized
//! through serde.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_db::{Db, params};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Category {
//!     id: String,
//!     name: String,
//! }
//!
//! let db = Db::connect("sqlite://hearth.db?mode=rwc").await?;
//!
//! db.execute(
//!     "INSERT INTO categories (id, name, slug) VALUES (?, ?, ?)",
//!     params!["cat_1", "Pickles", "pickles"]
//! ).await?;
//!
//! let categories: Vec<Category> = db.query_as(
//!     "SELECT id, name FROM categories WHERE slug = ?",
//!     params!["pickles"]
//! ).await?;
//! ```

mod db;
mod error;
mod types;

pub use db::{Db, Transaction};
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Db, DbError, QueryResult, Row, Transaction, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use hearth_db::params;
///
/// let params = params!["value1", 42, 3.14];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
