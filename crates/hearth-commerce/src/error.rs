//! Commerce error types.

use crate::coupon::CouponRejection;
use thiserror::Error;

/// Errors that can occur in e-commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A record looked up by id or slug does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Input failed domain validation.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A unique slug or code is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The coupon cannot be applied.
    #[error("{0}")]
    CouponRejected(CouponRejection),

    /// Invalid order status transition.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Shorthand for a missing record.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        CommerceError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        CommerceError::ValidationError(message.into())
    }
}

impl From<CouponRejection> for CommerceError {
    fn from(r: CouponRejection) -> Self {
        CommerceError::CouponRejected(r)
    }
}

#[cfg(feature = "storage")]
impl From<hearth_db::DbError> for CommerceError {
    fn from(e: hearth_db::DbError) -> Self {
        match e {
            hearth_db::DbError::UniqueViolation(msg) => CommerceError::Conflict(msg),
            hearth_db::DbError::ForeignKeyViolation(_) => {
                CommerceError::validation("Referenced record does not exist")
            }
            other => CommerceError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
