//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    /// No session under the presented id.
    #[error("Not authenticated")]
    SessionNotFound,

    /// Session expired.
    #[error("Session expired")]
    SessionExpired,

    /// Password too weak.
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// The admin password is not configured, so the gate refuses everyone.
    #[error("Admin access is not configured")]
    AdminNotConfigured,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cache error.
    #[error("Session store error: {0}")]
    Cache(#[from] hearth_cache::CacheError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::SessionNotFound | AuthError::SessionExpired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(AuthError::InvalidCredentials.is_auth_failure());
        assert!(AuthError::SessionExpired.is_auth_failure());
        assert!(!AuthError::WeakPassword("short".into()).is_auth_failure());
        assert!(!AuthError::AdminNotConfigured.is_auth_failure());
    }
}
