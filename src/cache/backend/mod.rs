//! Backing Store Module
//!
//! The command surface the cache store needs from a key/value service, with a
//! Redis implementation and an in-process implementation.
//!
//! # URL Schemes
//! - `redis://`, `rediss://` - Redis over a multiplexed async connection
//! - `memory://[?max_entries=N]` - in-process store with TTL and LRU eviction

mod entry;
mod lru;
mod memory;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{BackendError, BackendResult};

pub use self::redis::RedisBackend;
pub(crate) use entry::StoredEntry;
pub(crate) use lru::LruTracker;
pub use memory::{MemoryBackend, DEFAULT_MAX_ENTRIES};

// == Backend Trait ==
/// Commands a backing store must support.
///
/// Values are opaque text; keys are already namespaced by the caller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// GET
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// SETEX
    async fn set_ex(&self, key: &str, value: String, ttl_seconds: u64) -> BackendResult<()>;

    /// SET .. KEEPTTL XX; returns false when the key does not exist.
    async fn set_keep_ttl(&self, key: &str, value: String) -> BackendResult<bool>;

    /// Multi-key DEL; returns the number of keys removed.
    async fn del(&self, keys: &[String]) -> BackendResult<u64>;

    /// EXISTS
    async fn exists(&self, key: &str) -> BackendResult<bool>;

    /// INCR
    async fn incr(&self, key: &str) -> BackendResult<i64>;

    /// EXPIRE; returns false when the key does not exist.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> BackendResult<bool>;

    /// TTL in seconds; `None` for a missing key or a key without expiry.
    async fn ttl(&self, key: &str) -> BackendResult<Option<u64>>;

    /// KEYS
    async fn keys(&self, pattern: &str) -> BackendResult<Vec<String>>;

    /// DBSIZE
    async fn dbsize(&self) -> BackendResult<u64>;

    /// Human-readable memory usage (`INFO memory` `used_memory_human`).
    async fn used_memory(&self) -> BackendResult<String>;

    /// FLUSHDB
    async fn flush(&self) -> BackendResult<()>;

    /// PING
    async fn ping(&self) -> BackendResult<()>;

    /// Releases the connection.
    async fn close(&self);
}

// == Open ==
/// Opens and handshakes a backend for the given URL.
///
/// `cleanup_interval` drives the expiry sweep of the in-process backend.
pub async fn open(url: &str, cleanup_interval: Duration) -> BackendResult<Arc<dyn Backend>> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "redis" | "rediss" => {
            let backend = RedisBackend::connect(url).await?;
            Ok(Arc::new(backend) as Arc<dyn Backend>)
        }
        "memory" => {
            let max_entries = parsed
                .query_pairs()
                .find(|(name, _)| name == "max_entries")
                .and_then(|(_, value)| value.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES);
            let backend = MemoryBackend::new(max_entries);
            backend.start_sweeper(cleanup_interval);
            Ok(backend as Arc<dyn Backend>)
        }
        other => Err(BackendError::UnsupportedScheme(other.to_string())),
    }
}

/// Returns the URL with any password replaced, for logging.
pub fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("****"));
            }
            parsed.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

/// Formats a byte count the way Redis reports `used_memory_human`.
pub fn bytes_to_human(bytes: u64) -> String {
    const UNITS: [(&str, f64); 3] = [
        ("G", 1024.0 * 1024.0 * 1024.0),
        ("M", 1024.0 * 1024.0),
        ("K", 1024.0),
    ];
    for (suffix, size) in UNITS {
        if bytes as f64 >= size {
            return format!("{:.2}{}", bytes as f64 / size, suffix);
        }
    }
    format!("{}B", bytes)
}
