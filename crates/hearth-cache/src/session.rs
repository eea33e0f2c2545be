//! Session management on top of the key-value cache.

use crate::kv::current_timestamp;
use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Maximum retry attempts for optimistic concurrency control.
const MAX_UPDATE_RETRIES: u32 = 3;

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session data stored in the cache.
///
/// Generic over the user data type `T`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    /// The session ID.
    pub id: SessionId,
    /// User-defined session data.
    pub data: T,
    /// Version for optimistic concurrency control.
    pub version: u64,
    /// When the session was created (Unix timestamp).
    pub created_at: i64,
    /// When the session was last written (Unix timestamp).
    pub last_accessed: i64,
    /// When the session stops being valid (Unix timestamp).
    pub expires_at: i64,
}

/// Session manager for one kind of session.
///
/// Each manager owns a key namespace, so admin and customer sessions can
/// share one [`Cache`] without colliding.
///
/// # Example
///
/// ```rust,ignore
/// use hearth_cache::{Cache, Session};
/// use std::time::Duration;
///
/// let sessions = Session::<CustomerSession>::new(cache, "customer", Duration::from_secs(604_800));
/// let (id, data) = sessions.create(CustomerSession { user_id })?;
/// let data = sessions.get(&id)?;
/// sessions.delete(&id)?;
/// ```
pub struct Session<T> {
    cache: Cache,
    namespace: String,
    ttl: Duration,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            namespace: self.namespace.clone(),
            ttl: self.ttl,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Create a session manager in `namespace` whose sessions live for `ttl`.
    pub fn new(cache: Cache, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            namespace: namespace.into(),
            ttl,
            _phantom: std::marker::PhantomData,
        }
    }

    /// The lifetime given to new sessions.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a new session under a fresh random id.
    pub fn create(&self, data: T) -> Result<(SessionId, SessionData<T>), CacheError> {
        let id = SessionId::generate();
        let now = current_timestamp();
        let session_data = SessionData {
            id: id.clone(),
            data,
            version: 1,
            created_at: now,
            last_accessed: now,
            expires_at: now.saturating_add(self.ttl.as_secs() as i64),
        };
        self.cache
            .set_until(&self.session_key(&id), &session_data, session_data.expires_at)?;
        Ok((id, session_data))
    }

    /// Get session data, or create a new session if it doesn't exist.
    pub fn get_or_create(&self, id: &SessionId) -> Result<T, CacheError> {
        match self.get_versioned(id)? {
            Some(session_data) => Ok(session_data.data),
            None => {
                let data = T::default();
                self.set_internal(id, &data, 1, None)?;
                Ok(data)
            }
        }
    }

    /// Get session data if it exists and has not expired.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|s| s.data))
    }

    /// Get full session data including version and expiry.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get::<SessionData<T>>(&self.session_key(id))
    }

    /// Set session data (unconditional write). The original expiry is kept.
    pub fn set(&self, id: &SessionId, data: &T) -> Result<(), CacheError> {
        let current = self.get_versioned(id)?;
        let version = current.as_ref().map(|s| s.version + 1).unwrap_or(1);
        self.set_internal(id, data, version, current.as_ref())
    }

    fn set_internal(
        &self,
        id: &SessionId,
        data: &T,
        version: u64,
        previous: Option<&SessionData<T>>,
    ) -> Result<(), CacheError> {
        let session_data = self.next_data(id, data.clone(), version, previous);
        self.cache.set_until(
            &self.session_key(id),
            &session_data,
            session_data.expires_at,
        )
    }

    fn next_data(
        &self,
        id: &SessionId,
        data: T,
        version: u64,
        previous: Option<&SessionData<T>>,
    ) -> SessionData<T> {
        let now = current_timestamp();
        SessionData {
            id: id.clone(),
            data,
            version,
            created_at: previous.map(|p| p.created_at).unwrap_or(now),
            last_accessed: now,
            expires_at: previous
                .map(|p| p.expires_at)
                .unwrap_or_else(|| now.saturating_add(self.ttl.as_secs() as i64)),
        }
    }

    /// Delete a session.
    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        self.cache.delete(&self.session_key(id))
    }

    /// Check if a live session exists.
    pub fn exists(&self, id: &SessionId) -> Result<bool, CacheError> {
        self.cache.exists(&self.session_key(id))
    }

    /// Update session data with a closure, using optimistic concurrency control.
    ///
    /// The write only lands if the stored session is unchanged since it was
    /// read. Retries up to MAX_UPDATE_RETRIES times on a lost race.
    ///
    /// # Returns
    /// - `Ok(T)` - The updated data after successful write
    /// - `Err(CacheError::ConcurrentModification)` - If all retries failed
    pub fn update<F>(&self, id: &SessionId, f: F) -> Result<T, CacheError>
    where
        F: Fn(&mut T),
    {
        let key = self.session_key(id);

        for _attempt in 0..MAX_UPDATE_RETRIES {
            let raw = self.cache.get_raw(&key)?;
            let current: Option<SessionData<T>> = match &raw {
                Some(bytes) => Some(serde_json::from_slice(bytes)?),
                None => None,
            };

            let (mut data, expected_version) = match &current {
                Some(session_data) => (session_data.data.clone(), session_data.version),
                None => (T::default(), 0),
            };
            f(&mut data);

            let next = self.next_data(id, data.clone(), expected_version + 1, current.as_ref());
            if self
                .cache
                .compare_and_set(&key, raw.as_deref(), &next, Some(next.expires_at))?
            {
                return Ok(data);
            }
            tracing::debug!(session = %id, "session update lost a race, retrying");
        }

        Err(CacheError::ConcurrentModification(
            "max retries exceeded".to_string(),
        ))
    }

    fn session_key(&self, id: &SessionId) -> String {
        crate::cache_key!("session", self.namespace, id)
    }
}
