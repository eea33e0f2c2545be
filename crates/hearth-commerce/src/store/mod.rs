//! Persistence over `hearth-db`.
//!
//! [`Store`] is a thin handle around a [`Db`] pool. Each submodule adds the
//! queries for one area of the domain. Row mapping is explicit so booleans,
//! money and JSON columns are decoded in one place per entity.

mod catalog;
mod content;
mod coupons;
mod customers;
mod orders;
mod schema;

pub use coupons::Redemption;
pub use orders::{OrderListFilter, PaymentRecord};
pub use schema::{migrate, SCHEMA};

use crate::money::{Currency, Money};
use crate::slug::{candidates, slugify};
use crate::CommerceError;
use hearth_db::{Db, Row, Value};

/// Upper bound on `-N` suffixes tried before giving up.
const MAX_SLUG_ATTEMPTS: usize = 1_000;

/// Repository handle shared by every request.
#[derive(Clone, Debug)]
pub struct Store {
    db: Db,
}

impl Store {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Open an in-memory store with the schema applied.
    pub async fn in_memory() -> Result<Self, CommerceError> {
        let store = Self::new(Db::connect_in_memory().await?);
        store.migrate().await?;
        Ok(store)
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Apply the embedded schema.
    pub async fn migrate(&self) -> Result<(), CommerceError> {
        migrate(&self.db).await?;
        Ok(())
    }

    /// Pick the slug for a row.
    ///
    /// An explicit `requested` slug must be free, otherwise the write is a
    /// conflict. A slug derived from `source` takes the first free suffix.
    pub(crate) async fn allocate_slug(
        &self,
        table: &'static str,
        scope: Option<(&'static str, &str)>,
        requested: Option<&str>,
        source: &str,
        exclude_id: Option<&str>,
    ) -> Result<String, CommerceError> {
        if let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) {
            let slug = slugify(requested);
            if slug.is_empty() {
                return Err(CommerceError::validation("Slug must contain letters or digits"));
            }
            if self.slug_taken(table, scope, &slug, exclude_id).await? {
                return Err(CommerceError::Conflict(format!("Slug '{}' is already in use", slug)));
            }
            return Ok(slug);
        }

        let base = slugify(source);
        if base.is_empty() {
            return Err(CommerceError::validation(
                "Cannot derive a slug; provide one explicitly",
            ));
        }
        for candidate in candidates(&base).take(MAX_SLUG_ATTEMPTS) {
            if !self.slug_taken(table, scope, &candidate, exclude_id).await? {
                return Ok(candidate);
            }
        }
        Err(CommerceError::Conflict(format!(
            "No free slug left for '{}'",
            base
        )))
    }

    async fn slug_taken(
        &self,
        table: &'static str,
        scope: Option<(&'static str, &str)>,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, CommerceError> {
        let mut sql = format!("SELECT 1 AS taken FROM {} WHERE slug = ? AND id != ?", table);
        let mut params = vec![Value::from(slug), Value::from(exclude_id.unwrap_or(""))];
        if let Some((column, value)) = scope {
            sql.push_str(&format!(" AND {} = ?", column));
            params.push(Value::from(value));
        }
        Ok(self.db.query_row(&sql, &params).await?.is_some())
    }
}

/// Read a currency code column.
pub(crate) fn currency_column(row: &Row, column: &str) -> Result<Currency, CommerceError> {
    let code = row.text(column)?;
    Currency::from_code(&code)
        .ok_or_else(|| CommerceError::DatabaseError(format!("unknown currency {}", code)))
}

/// Read a minor-units column as money.
pub(crate) fn money_column(
    row: &Row,
    column: &str,
    currency: Currency,
) -> Result<Money, CommerceError> {
    Ok(Money::new(row.integer(column)?, currency))
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
