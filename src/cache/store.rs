//! Cache Store Module
//!
//! Best-effort memoization over a backing store. Every operation degrades to
//! a miss (`None`/`false`/`0`) instead of failing when the store is not Ready
//! or a command errors; only `connect` reports failure.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::backend::{self, Backend};
use super::connection::{Connection, ConnectionState};
use super::pattern::escape;
use super::CacheStats;
use crate::config::CacheConfig;
use crate::error::{BackendResult, CacheError};

// == Cache Store ==
/// Connection-managed key/value cache with TTL expiry.
///
/// Constructed once by the process entry point and shared by reference.
pub struct CacheStore {
    config: CacheConfig,
    connection: RwLock<Connection>,
    /// Serializes connect/disconnect sequences; holds the last connect failure
    lifecycle: Mutex<Option<CacheError>>,
    /// Bumped each time a connect sequence finishes
    connect_generation: AtomicU64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store in the `Disconnected` state.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            connection: RwLock::new(Connection::new()),
            lifecycle: Mutex::new(None),
            connect_generation: AtomicU64::new(0),
        }
    }

    /// Settings this store was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.connection.read().await.state
    }

    /// Failed handshake attempts since the last Ready.
    pub async fn retry_count(&self) -> u32 {
        self.connection.read().await.retry_count
    }

    /// Whether operations are currently served.
    pub async fn is_ready(&self) -> bool {
        self.state().await.is_ready()
    }

    // == Connect ==
    /// Opens the backing store, retrying with capped linear backoff.
    ///
    /// Concurrent callers are serialized; a caller that queued behind a
    /// running sequence returns that sequence's outcome instead of starting
    /// another. Already Ready is a no-op.
    pub async fn connect(&self) -> Result<(), CacheError> {
        let observed = self.connect_generation.load(Ordering::Acquire);
        let mut last_failure = self.lifecycle.lock().await;

        if self.is_ready().await {
            return Ok(());
        }
        if self.connect_generation.load(Ordering::Acquire) != observed {
            if let Some(err) = last_failure.as_ref() {
                debug!(error = %err, "Connect finished while waiting, reusing outcome");
                return Err(err.clone());
            }
        }

        let outcome = self.open_with_retry().await;
        *last_failure = outcome.as_ref().err().cloned();
        self.connect_generation.fetch_add(1, Ordering::Release);
        outcome
    }

    async fn open_with_retry(&self) -> Result<(), CacheError> {
        let Some(url) = self.config.url.clone() else {
            warn!(event = "error", "No cache URL configured, caching disabled");
            return Err(CacheError::Configuration(
                "backing store URL is not set".to_string(),
            ));
        };

        self.set_state(ConnectionState::Connecting).await;
        info!(event = "connecting", url = %backend::redact(&url), "Connecting to cache");

        let policy = self.config.retry;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = tokio::time::timeout(
                self.config.command_timeout,
                backend::open(&url, self.config.cleanup_interval),
            )
            .await;

            let reason = match outcome {
                Ok(Ok(opened)) => {
                    self.connection.write().await.mark_ready(opened);
                    info!(event = "ready", attempt, "Cache connection ready");
                    return Ok(());
                }
                Ok(Err(err)) => err.to_string(),
                Err(_) => "handshake timed out".to_string(),
            };

            error!(event = "error", attempt, error = %reason, "Cache connection attempt failed");

            if attempt >= policy.max_attempts {
                let mut conn = self.connection.write().await;
                conn.state = ConnectionState::Failed;
                conn.retry_count = attempt;
                return Err(CacheError::Connection {
                    attempts: attempt,
                    reason,
                });
            }

            self.connection.write().await.retry_count = attempt;
            tokio::time::sleep(policy.delay_for(attempt)).await;
        }
    }

    // == Disconnect ==
    /// Closes the connection. No-op unless Ready.
    pub async fn disconnect(&self) {
        let _lifecycle = self.lifecycle.lock().await;

        let backend = {
            let mut conn = self.connection.write().await;
            if !conn.state.is_ready() {
                return;
            }
            conn.release(ConnectionState::Disconnecting)
        };

        if let Some(backend) = backend {
            backend.close().await;
        }
        self.set_state(ConnectionState::Disconnected).await;
        info!(event = "disconnected", "Cache connection closed");
    }

    // == Get ==
    /// Returns the decoded value, or `None` on miss, not-Ready, or a payload
    /// that does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let key = self.namespaced(key);
        let raw = self
            .run("get", None, |b| async move { b.get(&key).await })
            .await?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(op = "get", error = %err, "Cached payload did not decode, treating as miss");
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` for `ttl` seconds (default TTL when `None`).
    ///
    /// Returns `true` when stored.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(op = "set", error = %err, "Value did not encode, not cached");
                return false;
            }
        };
        let key = self.namespaced(key);
        let ttl = ttl.unwrap_or(self.config.default_ttl).max(1);
        self.run("set", false, |b| async move {
            b.set_ex(&key, payload, ttl).await.map(|()| true)
        })
        .await
    }

    // == Replace ==
    /// Overwrites an existing key, keeping its remaining TTL.
    ///
    /// Returns `false` when the key is absent or the store is unavailable.
    pub async fn replace<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(op = "replace", error = %err, "Value did not encode, not cached");
                return false;
            }
        };
        let key = self.namespaced(key);
        self.run("replace", false, |b| async move {
            b.set_keep_ttl(&key, payload).await
        })
        .await
    }

    // == Delete ==
    /// Deletes a key. `true` means the delete was issued, whether or not the
    /// key existed.
    pub async fn delete(&self, key: &str) -> bool {
        let keys = vec![self.namespaced(key)];
        self.run("delete", false, |b| async move {
            b.del(&keys).await.map(|_| true)
        })
        .await
    }

    // == Delete Pattern ==
    /// Deletes every key matching a Redis-style glob in one batch.
    ///
    /// Returns the number of keys removed.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let pattern = self.namespaced_pattern(pattern);
        let removed = self
            .run("delete_pattern", 0, |b| async move {
                let keys = b.keys(&pattern).await?;
                if keys.is_empty() {
                    return Ok(0);
                }
                b.del(&keys).await
            })
            .await;
        debug!(op = "delete_pattern", removed, "Pattern invalidation");
        removed
    }

    // == Exists ==
    /// Whether the key is present and unexpired.
    pub async fn exists(&self, key: &str) -> bool {
        let key = self.namespaced(key);
        self.run("exists", false, |b| async move { b.exists(&key).await })
            .await
    }

    // == Increment ==
    /// Atomically increments a counter, creating it at 0 first if absent.
    ///
    /// Returns 0 when the store is unavailable; use [`try_increment`] to tell
    /// that apart from a real count.
    ///
    /// [`try_increment`]: CacheStore::try_increment
    pub async fn increment(&self, key: &str) -> i64 {
        self.try_increment(key).await.unwrap_or(0)
    }

    /// Atomically increments a counter; `None` when the store is unavailable.
    pub async fn try_increment(&self, key: &str) -> Option<i64> {
        let key = self.namespaced(key);
        self.run("increment", None, |b| async move {
            b.incr(&key).await.map(Some)
        })
        .await
    }

    // == Expire ==
    /// Rewrites the TTL of an existing key without touching its value.
    pub async fn expire(&self, key: &str, ttl: u64) -> bool {
        let key = self.namespaced(key);
        let ttl = ttl.max(1);
        self.run("expire", false, |b| async move { b.expire(&key, ttl).await })
            .await
    }

    // == TTL ==
    /// Remaining TTL in seconds; `None` when absent, persistent, or unavailable.
    pub async fn ttl(&self, key: &str) -> Option<u64> {
        let key = self.namespaced(key);
        self.run("ttl", None, |b| async move { b.ttl(&key).await })
            .await
    }

    // == Stats ==
    /// Snapshot of connection and namespace size; zeroed when not Ready.
    pub async fn get_stats(&self) -> CacheStats {
        let prefix_pattern = self
            .config
            .key_prefix
            .as_ref()
            .map(|prefix| format!("{}:*", escape(prefix)));

        self.run("stats", CacheStats::offline(), |b| async move {
            let key_count = match prefix_pattern {
                Some(pattern) => b.keys(&pattern).await?.len() as u64,
                None => b.dbsize().await?,
            };
            let memory_used = b.used_memory().await?;
            Ok(CacheStats {
                connected: true,
                key_count,
                memory_used,
            })
        })
        .await
    }

    // == Clear ==
    /// Wipes the namespace.
    ///
    /// With a key prefix configured only that tenant's keys are removed;
    /// without one the whole database is flushed.
    pub async fn clear(&self) -> bool {
        if self.config.key_prefix.is_some() {
            let removed = self.delete_pattern("*").await;
            info!(removed, "Cleared cache namespace");
            return self.is_ready().await;
        }
        let cleared = self
            .run("clear", false, |b| async move { b.flush().await.map(|()| true) })
            .await;
        if cleared {
            warn!("Flushed entire cache database");
        }
        cleared
    }

    // == Internals ==
    fn namespaced(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn namespaced_pattern(&self, pattern: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", escape(prefix), pattern),
            None => pattern.to_string(),
        }
    }

    async fn set_state(&self, state: ConnectionState) {
        self.connection.write().await.state = state;
    }

    /// Runs one backend call with failure isolation.
    ///
    /// Returns `fallback` when not Ready, on error, or on timeout. A lost
    /// connection moves the store to `Disconnected`.
    async fn run<T, F, Fut>(&self, op: &'static str, fallback: T, call: F) -> T
    where
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        let Some(backend) = self.connection.read().await.ready_backend() else {
            debug!(op, "Cache not ready, skipping");
            return fallback;
        };

        match tokio::time::timeout(self.config.command_timeout, call(backend.clone())).await {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => {
                warn!(op, error = %err, "Cache operation failed");
                if err.is_connection_lost() {
                    self.handle_connection_lost(&backend).await;
                }
                fallback
            }
            Err(_) => {
                warn!(op, timeout_ms = self.config.command_timeout.as_millis() as u64, "Cache operation timed out");
                fallback
            }
        }
    }

    async fn handle_connection_lost(&self, failed: &Arc<dyn Backend>) {
        let mut conn = self.connection.write().await;
        let same_backend = conn
            .backend
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, failed));
        if conn.state.is_ready() && same_backend {
            conn.release(ConnectionState::Disconnected);
            warn!(event = "disconnected", "Backing store closed the connection");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::MemoryBackend;
    use crate::config::RetryPolicy;
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Quote {
        symbol: String,
        price_usd: f64,
    }

    async fn ready_store() -> CacheStore {
        let store = CacheStore::new(CacheConfig::with_url("memory://"));
        store.connect().await.unwrap();
        store
    }

    impl CacheStore {
        /// Installs an already-open backend, bypassing the handshake.
        async fn attach(&self, backend: Arc<dyn Backend>) {
            self.connection.write().await.mark_ready(backend);
        }
    }

    #[tokio::test]
    async fn test_store_starts_disconnected() {
        let store = CacheStore::new(CacheConfig::default());
        assert_eq!(store.state().await, ConnectionState::Disconnected);
        assert_eq!(store.retry_count().await, 0);
    }

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let store = ready_store().await;
        assert_eq!(store.state().await, ConnectionState::Ready);

        // Second connect is a no-op
        store.connect().await.unwrap();
        assert!(store.is_ready().await);
    }

    #[tokio::test]
    async fn test_connect_without_url_is_configuration_error() {
        let store = CacheStore::new(CacheConfig::default());

        let result = store.connect().await;

        assert!(matches!(result, Err(CacheError::Configuration(_))));
        assert!(!store.is_ready().await);
    }

    #[tokio::test]
    async fn test_connect_exhausts_retry_budget() {
        let config = CacheConfig {
            url: Some("redis://127.0.0.1:1/".to_string()),
            retry: RetryPolicy {
                max_attempts: 3,
                step_ms: 5,
                cap_ms: 10,
            },
            ..CacheConfig::default()
        };
        let store = CacheStore::new(config);

        let result = store.connect().await;

        assert!(matches!(result, Err(CacheError::Connection { attempts: 3, .. })));
        assert_eq!(store.state().await, ConnectionState::Failed);
        assert_eq!(store.retry_count().await, 3);
        assert!(!store.set("k", &1, None).await);
    }

    #[tokio::test]
    async fn test_queued_connects_share_failed_outcome() {
        let config = CacheConfig {
            url: Some("redis://127.0.0.1:1/".to_string()),
            retry: RetryPolicy {
                max_attempts: 3,
                step_ms: 150,
                cap_ms: 150,
            },
            ..CacheConfig::default()
        };
        let store = Arc::new(CacheStore::new(config));

        let started = std::time::Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.connect().await })
            })
            .collect();
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(CacheError::Connection { attempts: 3, .. })));
        }

        // One sequence sleeps ~300ms; four back-to-back would take ~1.2s
        assert!(started.elapsed() < Duration::from_millis(900));
        assert_eq!(store.state().await, ConnectionState::Failed);
        assert_eq!(store.retry_count().await, 3);
    }

    #[tokio::test]
    async fn test_connect_after_failure_retries_again() {
        let config = CacheConfig {
            url: Some("redis://127.0.0.1:1/".to_string()),
            retry: RetryPolicy {
                max_attempts: 1,
                step_ms: 1,
                cap_ms: 1,
            },
            ..CacheConfig::default()
        };
        let store = CacheStore::new(config);

        assert!(store.connect().await.is_err());
        let generation = store.connect_generation.load(Ordering::Acquire);

        assert!(store.connect().await.is_err());
        assert_eq!(store.connect_generation.load(Ordering::Acquire), generation + 1);
    }

    #[tokio::test]
    async fn test_connect_unsupported_scheme_fails() {
        let config = CacheConfig {
            url: Some("memcached://localhost".to_string()),
            retry: RetryPolicy {
                max_attempts: 1,
                step_ms: 1,
                cap_ms: 1,
            },
            ..CacheConfig::default()
        };
        let store = CacheStore::new(config);

        assert!(store.connect().await.is_err());
        assert_eq!(store.state().await, ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_concurrent_connects_collapse() {
        let store = Arc::new(CacheStore::new(CacheConfig::with_url("memory://")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.connect().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(store.is_ready().await);
        assert_eq!(store.retry_count().await, 0);
    }

    #[tokio::test]
    async fn test_set_and_get_typed_value() {
        let store = ready_store().await;
        let quote = Quote {
            symbol: "ETH".to_string(),
            price_usd: 3120.5,
        };

        assert!(store.set("price:eth", &quote, None).await);
        assert_eq!(store.get::<Quote>("price:eth").await, Some(quote));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let store = ready_store().await;
        assert_eq!(store.get::<String>("nonexistent").await, None);
    }

    #[tokio::test]
    async fn test_get_undecodable_payload_is_miss() {
        let store = ready_store().await;

        store.set("name", "alice", None).await;

        assert_eq!(store.get::<u64>("name").await, None);
        assert_eq!(store.get::<String>("name").await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_default_ttl_applied() {
        let store = ready_store().await;

        store.set("k", &1, None).await;

        let ttl = store.ttl("k").await.unwrap();
        assert!(ttl <= 3600 && ttl > 3590);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = ready_store().await;

        store.set("short", &"v", Some(1)).await;
        assert!(store.exists("short").await);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get::<String>("short").await, None);
        assert!(!store.exists("short").await);
    }

    #[tokio::test]
    async fn test_delete_is_true_even_when_absent() {
        let store = ready_store().await;

        store.set("k", &1, None).await;
        assert!(store.delete("k").await);
        assert!(!store.exists("k").await);
        assert!(store.delete("k").await);
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let store = ready_store().await;
        for key in ["sess:1", "sess:2", "user:1"] {
            store.set(key, &key, None).await;
        }

        assert_eq!(store.delete_pattern("sess:*").await, 2);
        assert!(!store.exists("sess:1").await);
        assert!(!store.exists("sess:2").await);
        assert!(store.exists("user:1").await);
        assert_eq!(store.delete_pattern("sess:*").await, 0);
    }

    #[tokio::test]
    async fn test_delete_pattern_with_repeated_stars() {
        let store = ready_store().await;
        for key in ["sess:1", "sess:2", "user:1"] {
            store.set(key, &key, None).await;
        }

        assert_eq!(store.delete_pattern("sess:**").await, 2);
        assert!(!store.exists("sess:1").await);
        assert!(store.exists("user:1").await);
    }

    #[tokio::test]
    async fn test_increment_counts_from_zero() {
        let store = ready_store().await;

        assert_eq!(store.increment("logins").await, 1);
        assert_eq!(store.increment("logins").await, 2);
        assert_eq!(store.try_increment("logins").await, Some(3));
        assert_eq!(store.get::<i64>("logins").await, Some(3));
    }

    #[tokio::test]
    async fn test_increment_wrong_type_degrades() {
        let store = ready_store().await;

        store.set("name", "alice", None).await;

        assert_eq!(store.try_increment("name").await, None);
        assert!(store.is_ready().await, "command errors must not drop the connection");
    }

    #[tokio::test]
    async fn test_concurrent_increment_loses_no_updates() {
        let store = Arc::new(ready_store().await);
        let n = 64;

        let handles: Vec<_> = (0..n)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment("counter").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get::<i64>("counter").await, Some(n));
    }

    #[tokio::test]
    async fn test_expire_rewrites_ttl() {
        let store = ready_store().await;

        store.set("k", &"v", Some(1)).await;
        assert!(store.expire("k", 60).await);
        assert!(!store.expire("missing", 60).await);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(store.get::<String>("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_huge_ttl_degrades_to_false() {
        let store = ready_store().await;
        store.set("k", &1, Some(30)).await;

        assert!(!store.set("k", &2, Some(u64::MAX)).await);
        assert!(!store.expire("k", u64::MAX).await);
        assert!(!store.expire("k", u64::MAX / 2).await);

        assert!(store.is_ready().await);
        assert_eq!(store.get::<i64>("k").await, Some(1));
        assert!(store.ttl("k").await.unwrap() <= 30);
    }

    #[tokio::test]
    async fn test_replace_keeps_ttl() {
        let store = ready_store().await;

        assert!(!store.replace("absent", &1).await);
        assert!(!store.exists("absent").await);

        store.set("k", &1, Some(30)).await;
        assert!(store.replace("k", &2).await);
        assert_eq!(store.get::<i64>("k").await, Some(2));
        assert!(store.ttl("k").await.unwrap() <= 30);
    }

    #[tokio::test]
    async fn test_stats_when_ready() {
        let store = ready_store().await;
        store.set("a", &1, None).await;
        store.set("b", &2, None).await;

        let stats = store.get_stats().await;

        assert!(stats.connected);
        assert_eq!(stats.key_count, 2);
        assert_ne!(stats.memory_used, "0B");
    }

    #[tokio::test]
    async fn test_degraded_mode_returns_miss_values() {
        let store = CacheStore::new(CacheConfig::default());
        let _ = store.connect().await;

        assert_eq!(store.get::<String>("k").await, None);
        assert!(!store.set("k", &"v", None).await);
        assert!(!store.replace("k", &"v").await);
        assert!(!store.delete("k").await);
        assert_eq!(store.delete_pattern("*").await, 0);
        assert!(!store.exists("k").await);
        assert_eq!(store.increment("k").await, 0);
        assert_eq!(store.try_increment("k").await, None);
        assert!(!store.expire("k", 10).await);
        assert_eq!(store.ttl("k").await, None);
        assert!(!store.clear().await);
        assert_eq!(store.get_stats().await, CacheStats::offline());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let store = ready_store().await;

        store.disconnect().await;
        assert_eq!(store.state().await, ConnectionState::Disconnected);

        store.disconnect().await;
        assert_eq!(store.state().await, ConnectionState::Disconnected);
        assert_eq!(store.get::<String>("k").await, None);
    }

    #[tokio::test]
    async fn test_reconnect_after_disconnect() {
        let store = ready_store().await;

        store.disconnect().await;
        store.connect().await.unwrap();

        assert!(store.set("k", &1, None).await);
    }

    #[tokio::test]
    async fn test_store_closure_moves_to_disconnected() {
        let store = CacheStore::new(CacheConfig::with_url("memory://"));
        let backend = MemoryBackend::new(100);
        store.attach(backend.clone()).await;
        assert!(store.set("k", &1, None).await);

        backend.shutdown().await;

        assert_eq!(store.get::<i64>("k").await, None);
        assert_eq!(store.state().await, ConnectionState::Disconnected);
        assert!(!store.set("k", &1, None).await);
    }

    #[tokio::test]
    async fn test_key_prefix_isolates_tenants() {
        let shared = MemoryBackend::new(100);
        let tenant_a = CacheStore::new(CacheConfig {
            key_prefix: Some("a".to_string()),
            ..CacheConfig::with_url("memory://")
        });
        let tenant_b = CacheStore::new(CacheConfig {
            key_prefix: Some("b".to_string()),
            ..CacheConfig::with_url("memory://")
        });
        tenant_a.attach(shared.clone()).await;
        tenant_b.attach(shared.clone()).await;

        tenant_a.set("user:1", &"alice", None).await;
        tenant_b.set("user:1", &"bob", None).await;
        assert_eq!(tenant_a.get::<String>("user:1").await.as_deref(), Some("alice"));
        assert_eq!(tenant_a.get_stats().await.key_count, 1);

        assert!(tenant_a.clear().await);

        assert!(!tenant_a.exists("user:1").await);
        assert_eq!(tenant_b.get::<String>("user:1").await.as_deref(), Some("bob"));
        assert!(shared.exists("b:user:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_without_prefix_flushes() {
        let store = ready_store().await;
        store.set("a", &1, None).await;
        store.set("b", &1, None).await;

        assert!(store.clear().await);
        assert_eq!(store.get_stats().await.key_count, 0);
    }
}
