//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) so the parameters and salt
//! travel with the hash and old hashes keep verifying if defaults change.

use crate::AuthError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id with the crate's default parameters.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password under a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// A mismatch is `Ok(false)`. A malformed hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("invalid password hash: {e}")))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!("password verification failed: {e}"))),
        }
    }

    /// Check password strength requirements.
    pub fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if !password.chars().any(|c| c.is_alphabetic()) {
            return Err(AuthError::WeakPassword("must contain a letter".into()));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::WeakPassword("must contain a digit".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "SecurePass123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher.verify(password, &hash).unwrap());
        assert!(!hasher.verify("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn test_password_validation() {
        assert!(PasswordHasher::validate_password("securepass1").is_ok());
        assert!(PasswordHasher::validate_password("short1").is_err());
        assert!(PasswordHasher::validate_password("12345678").is_err());
        assert!(PasswordHasher::validate_password("NoNumbers").is_err());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = PasswordHasher::new();
        let password = "TestPassword1";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = PasswordHasher::new();
        assert!(hasher.verify("anything", "$pbkdf2$not-a-phc").is_err());
    }
}
