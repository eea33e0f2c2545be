//! Stored customer accounts.

use crate::ids::UserId;
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// A registered storefront customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerAccount {
    pub id: UserId,
    /// Login name, stored lowercase and unique.
    pub username: String,
    /// Contact email, stored lowercase and unique.
    pub email: String,
    /// PHC-format password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: i64,
}

impl CustomerAccount {
    /// Create an account from already validated fields and a password hash.
    pub fn new(
        username: &str,
        email: &str,
        password_hash: impl Into<String>,
    ) -> Result<Self, CommerceError> {
        let username = normalize_username(username);
        let email = email.trim().to_lowercase();
        validate_username(&username)?;
        validate_email(&email)?;
        Ok(Self {
            id: UserId::generate(),
            username,
            email,
            password_hash: password_hash.into(),
            created_at: chrono::Utc::now().timestamp(),
        })
    }
}

/// Lowercase and trim a username for lookup.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

fn validate_username(username: &str) -> Result<(), CommerceError> {
    if !(3..=32).contains(&username.chars().count()) {
        return Err(CommerceError::validation(
            "Username must be between 3 and 32 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(CommerceError::validation(
            "Username may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), CommerceError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(CommerceError::validation("Email address is not valid"));
    }
    Ok(())
}
