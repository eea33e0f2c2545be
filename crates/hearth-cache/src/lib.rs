//! Type-safe key-value caching layer for Hearth.
//!
//! Values are stored as JSON bytes in a process-wide map behind a lock.
//! Every entry may carry a time-to-live; expired entries read as missing
//! and are dropped the next time they are touched.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_cache::Cache;
//! use std::time::Duration;
//!
//! let cache = Cache::new();
//! cache.set_with_ttl("quote:abc", &quote, Duration::from_secs(300))?;
//! let quote: Option<Quote> = cache.get("quote:abc")?;
//! cache.delete("quote:abc")?;
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::Cache;
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Session, SessionData, SessionId};
}
