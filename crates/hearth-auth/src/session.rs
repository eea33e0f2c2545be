//! Expiring sessions for customers and the admin panel.

use crate::user::User;
use crate::AuthError;
use hearth_cache::{Cache, Session, SessionId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An authenticated session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    /// The user (anonymous, customer or admin).
    pub user: User,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp when the session expires.
    pub expires_at: i64,
}

impl AuthSession {
    /// Customer session duration: 7 days.
    pub const DEFAULT_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

    /// Admin session duration: 24 hours.
    pub const ADMIN_DURATION_SECS: i64 = 24 * 60 * 60;

    pub fn new(user: User) -> Self {
        let now = current_timestamp();
        Self {
            user,
            created_at: now,
            expires_at: now + Self::DEFAULT_DURATION_SECS,
        }
    }

    /// Create session with custom duration.
    pub fn with_duration(mut self, duration_secs: i64) -> Self {
        self.expires_at = self.created_at + duration_secs;
        self
    }

    /// A session is valid strictly before `expires_at`.
    pub fn is_expired(&self) -> bool {
        current_timestamp() >= self.expires_at
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.is_expired() {
            return Err(AuthError::SessionExpired);
        }
        Ok(())
    }

    /// Seconds until expiry, zero once expired.
    pub fn remaining_secs(&self) -> i64 {
        (self.expires_at - current_timestamp()).max(0)
    }
}

/// Session registry for one audience, backed by the shared cache.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Session<AuthSession>,
}

impl SessionStore {
    /// Sessions under `namespace` that live for `duration`.
    pub fn new(cache: Cache, namespace: &str, duration: Duration) -> Self {
        Self {
            sessions: Session::new(cache, namespace, duration),
        }
    }

    pub fn duration(&self) -> Duration {
        self.sessions.ttl()
    }

    /// Start a session for `user` under a fresh id.
    pub fn start(&self, user: User) -> Result<(SessionId, AuthSession), AuthError> {
        let duration = i64::try_from(self.duration().as_secs())
            .map_err(|_| AuthError::Internal("session duration out of range".into()))?;
        let session = AuthSession::new(user).with_duration(duration);
        let (id, data) = self.sessions.create(session)?;
        Ok((id, data.data))
    }

    /// Look up a live session.
    pub fn resolve(&self, id: &SessionId) -> Result<AuthSession, AuthError> {
        let session = self
            .sessions
            .get(id)?
            .ok_or(AuthError::SessionNotFound)?;
        if let Err(e) = session.validate() {
            self.sessions.delete(id)?;
            return Err(e);
        }
        Ok(session)
    }

    /// The session's user, or anonymous when there is no live session.
    pub fn user(&self, id: Option<&SessionId>) -> User {
        id.and_then(|id| self.resolve(id).ok())
            .map(|s| s.user)
            .unwrap_or_default()
    }

    pub fn end(&self, id: &SessionId) -> Result<(), AuthError> {
        self.sessions.delete(id)?;
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("duration", &self.duration())
            .finish()
    }
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
