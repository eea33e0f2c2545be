//! Shared-password gate in front of the admin API.

use crate::session::{AuthSession, SessionStore};
use crate::user::User;
use crate::{AuthError, PasswordHasher};
use hearth_cache::{Cache, SessionId};
use std::time::Duration;

/// Cache namespace for admin sessions.
pub const ADMIN_NAMESPACE: &str = "admin";

/// Checks the admin password and issues admin sessions.
///
/// The configured password is hashed once at construction so every login
/// goes through Argon2 verification rather than a byte comparison.
#[derive(Debug, Clone)]
pub struct AdminGate {
    password_hash: Option<String>,
    hasher: PasswordHasher,
    sessions: SessionStore,
}

impl AdminGate {
    /// Gate with the standard 24 hour session.
    pub fn new(password: &str, cache: Cache) -> Result<Self, AuthError> {
        let duration = Duration::from_secs(AuthSession::ADMIN_DURATION_SECS as u64);
        Self::with_duration(password, cache, duration)
    }

    pub fn with_duration(
        password: &str,
        cache: Cache,
        duration: Duration,
    ) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new();
        let password_hash = if password.is_empty() {
            tracing::warn!("admin password is empty, admin login disabled");
            None
        } else {
            Some(hasher.hash(password)?)
        };
        Ok(Self {
            password_hash,
            hasher,
            sessions: SessionStore::new(cache, ADMIN_NAMESPACE, duration),
        })
    }

    /// Exchange the admin password for a session.
    pub fn login(&self, password: &str) -> Result<(SessionId, AuthSession), AuthError> {
        let hash = self
            .password_hash
            .as_deref()
            .ok_or(AuthError::AdminNotConfigured)?;
        if !self.hasher.verify(password, hash)? {
            tracing::warn!("admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        let (id, session) = self.sessions.start(User::Admin)?;
        tracing::info!(expires_at = session.expires_at, "admin session started");
        Ok((id, session))
    }

    /// Resolve a presented admin session id.
    pub fn authenticate(&self, id: &SessionId) -> Result<AuthSession, AuthError> {
        let session = self.sessions.resolve(id)?;
        if !session.user.is_admin() {
            return Err(AuthError::SessionNotFound);
        }
        Ok(session)
    }

    pub fn logout(&self, id: &SessionId) -> Result<(), AuthError> {
        self.sessions.end(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_password_opens_24h_session() {
        let gate = AdminGate::new("open-sesame", Cache::new()).unwrap();
        let (id, session) = gate.login("open-sesame").unwrap();
        assert_eq!(session.expires_at - session.created_at, 24 * 60 * 60);
        assert!(session.user.is_admin());

        let current = gate.authenticate(&id).unwrap();
        assert_eq!(current, session);
    }

    #[test]
    fn test_wrong_password_rejected() {
        let gate = AdminGate::new("open-sesame", Cache::new()).unwrap();
        let err = gate.login("open-sesame ").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(gate.login("").is_err());
    }

    #[test]
    fn test_expired_session_requires_login() {
        let gate =
            AdminGate::with_duration("open-sesame", Cache::new(), Duration::ZERO).unwrap();
        let (id, _) = gate.login("open-sesame").unwrap();
        let err = gate.authenticate(&id).unwrap_err();
        assert!(err.is_auth_failure());

        // A fresh login works again.
        assert!(gate.login("open-sesame").is_ok());
    }

    #[test]
    fn test_logout_ends_session() {
        let gate = AdminGate::new("open-sesame", Cache::new()).unwrap();
        let (id, _) = gate.login("open-sesame").unwrap();
        gate.logout(&id).unwrap();
        assert!(matches!(
            gate.authenticate(&id),
            Err(AuthError::SessionNotFound)
        ));
    }

    #[test]
    fn test_unconfigured_gate_refuses_everyone() {
        let gate = AdminGate::new("", Cache::new()).unwrap();
        assert!(matches!(gate.login(""), Err(AuthError::AdminNotConfigured)));
    }

    #[test]
    fn test_customer_session_is_not_admin() {
        let cache = Cache::new();
        let gate = AdminGate::new("open-sesame", cache.clone()).unwrap();
        let rogue = SessionStore::new(cache, ADMIN_NAMESPACE, Duration::from_secs(60));
        let (id, _) = rogue.start(User::Anonymous).unwrap();
        assert!(gate.authenticate(&id).is_err());
    }
}
