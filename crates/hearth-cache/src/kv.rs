//! Key-value store with automatic serialization and expiry.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

struct Entry {
    bytes: Vec<u8>,
    /// Unix seconds after which the entry is gone. `None` never expires.
    expires_at: Option<i64>,
}

impl Entry {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Type-safe cache shared by every clone of the handle.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
#[derive(Clone, Default)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let quote: Option<Quote> = cache.get("quote:abc")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value with no expiry.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.put(key, serde_json::to_vec(value)?, None)
    }

    /// Set a value that disappears after `ttl`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// cache.set_with_ttl("session:abc", &data, Duration::from_secs(86_400))?;
    /// ```
    pub fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let expires_at = current_timestamp().saturating_add(ttl.as_secs() as i64);
        self.put(key, serde_json::to_vec(value)?, Some(expires_at))
    }

    /// Set a value that disappears at the given Unix timestamp.
    pub fn set_until<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: i64,
    ) -> Result<(), CacheError> {
        self.put(key, serde_json::to_vec(value)?, Some(expires_at))
    }

    /// Replace a value only if the stored bytes still equal `expected`.
    ///
    /// `expected = None` means the key must be absent. Returns `false`
    /// when another writer got there first. The expiry of the existing
    /// entry is kept unless `expires_at` is given.
    pub fn compare_and_set<T: Serialize>(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &T,
        expires_at: Option<i64>,
    ) -> Result<bool, CacheError> {
        let bytes = serde_json::to_vec(value)?;
        let now = current_timestamp();
        let mut entries = self.write()?;

        let current = entries.get(key).filter(|e| e.is_live(now));
        let matches = match (current, expected) {
            (None, None) => true,
            (Some(entry), Some(expected)) => entry.bytes == expected,
            _ => false,
        };
        if !matches {
            return Ok(false);
        }

        let expires_at = expires_at.or_else(|| current.and_then(|e| e.expires_at));
        entries.insert(key.to_string(), Entry { bytes, expires_at });
        Ok(true)
    }

    /// Read the raw JSON bytes stored under a key.
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = current_timestamp();
        {
            let entries = self.read()?;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.bytes.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: purge on access.
        let mut entries = self.write()?;
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.write()?.remove(key);
        Ok(())
    }

    /// Check if a live key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get_raw(key)?.is_some())
    }

    /// Get all live keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let now = current_timestamp();
        Ok(self
            .read()?
            .iter()
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect())
    }

    /// Number of stored entries, counting expired ones not yet purged.
    pub fn entry_count(&self) -> Result<usize, CacheError> {
        Ok(self.read()?.len())
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = current_timestamp();
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "purged expired cache entries");
        }
        Ok(removed)
    }

    fn put(&self, key: &str, bytes: Vec<u8>, expires_at: Option<i64>) -> Result<(), CacheError> {
        self.write()?
            .insert(key.to_string(), Entry { bytes, expires_at });
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries
            .read()
            .map_err(|_| CacheError::StoreError("cache lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::StoreError("cache lock poisoned".to_string()))
    }
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("quote", cart_id);
/// // Returns "quote:abc"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let cache = Cache::new();
        cache.set("k", &vec![1, 2, 3]).unwrap();
        assert_eq!(cache.get::<Vec<i32>>("k").unwrap(), Some(vec![1, 2, 3]));
        assert!(cache.exists("k").unwrap());

        cache.delete("k").unwrap();
        assert_eq!(cache.get::<Vec<i32>>("k").unwrap(), None);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = Cache::new();
        let other = cache.clone();
        cache.set("shared", &"yes").unwrap();
        assert_eq!(other.get::<String>("shared").unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn test_expired_entry_is_invisible_and_purged() {
        let cache = Cache::new();
        cache.set_until("old", &1, current_timestamp() - 1).unwrap();
        cache.set_with_ttl("fresh", &2, Duration::from_secs(60)).unwrap();

        assert_eq!(cache.get::<i32>("old").unwrap(), None);
        assert_eq!(cache.get::<i32>("fresh").unwrap(), Some(2));
        assert_eq!(cache.keys().unwrap(), vec!["fresh".to_string()]);
        assert_eq!(cache.purge_expired().unwrap(), 0);
    }

    #[test]
    fn test_entry_count_includes_expired_until_purged() {
        let cache = Cache::new();
        cache.set("live", &1).unwrap();
        cache.set_until("stale", &2, current_timestamp() - 1).unwrap();
        assert_eq!(cache.entry_count().unwrap(), 2);
        assert_eq!(cache.keys().unwrap(), vec!["live".to_string()]);

        cache.purge_expired().unwrap();
        assert_eq!(cache.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_purge_expired_counts() {
        let cache = Cache::new();
        cache.set_until("a", &1, current_timestamp() - 10).unwrap();
        cache.set_until("b", &1, current_timestamp() - 10).unwrap();
        cache.set("c", &1).unwrap();
        assert_eq!(cache.purge_expired().unwrap(), 2);
    }

    #[test]
    fn test_compare_and_set() {
        let cache = Cache::new();
        assert!(cache.compare_and_set("k", None, &1, None).unwrap());
        assert!(!cache.compare_and_set("k", None, &2, None).unwrap());

        let current = cache.get_raw("k").unwrap().unwrap();
        assert!(cache.compare_and_set("k", Some(&current), &3, None).unwrap());
        assert!(!cache.compare_and_set("k", Some(&current), &4, None).unwrap());
        assert_eq!(cache.get::<i32>("k").unwrap(), Some(3));
    }

    #[test]
    fn test_cache_key_macro() {
        let id = 42;
        assert_eq!(cache_key!("order", id), "order:42");
        assert_eq!(cache_key!("a", "b", 3), "a:b:3");
    }
}
