//! In-Process Backend Module
//!
//! HashMap storage with TTL expiration and LRU eviction, speaking the same
//! command surface as Redis. Used for `memory://` URLs and in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::entry::deadline_after;
use super::{bytes_to_human, Backend, LruTracker, StoredEntry};
use crate::cache::pattern::KeyPattern;
use crate::error::{BackendError, BackendResult};
use crate::tasks::spawn_cleanup_task;

/// Capacity used when the URL does not set `max_entries`
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Rejects TTLs Redis would refuse with "invalid expire time".
fn check_ttl(ttl_seconds: u64) -> BackendResult<()> {
    match deadline_after(ttl_seconds) {
        Some(_) => Ok(()),
        None => Err(BackendError::Command("invalid expire time".to_string())),
    }
}

// == Memory State ==
#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, StoredEntry>,
    lru: LruTracker,
    closed: bool,
}

impl MemoryState {
    fn ensure_open(&self) -> BackendResult<()> {
        if self.closed {
            Err(BackendError::Closed)
        } else {
            Ok(())
        }
    }

    /// Returns the live entry for `key`, dropping it first if expired.
    fn live(&mut self, key: &str) -> Option<&mut StoredEntry> {
        if self.entries.get(key).is_some_and(StoredEntry::is_expired) {
            self.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    fn insert(&mut self, key: &str, entry: StoredEntry, max_entries: usize) {
        if !self.entries.contains_key(key) && self.entries.len() >= max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                tracing::debug!(key = %evicted, "evicted least recently used entry");
            }
        }
        self.entries.insert(key.to_string(), entry);
        self.lru.touch(key);
    }
}

// == Memory Backend ==
/// In-process backing store.
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    max_entries: usize,
    sweeper: StdMutex<Option<JoinHandle<()>>>,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(MemoryState::default()),
            max_entries: max_entries.max(1),
            sweeper: StdMutex::new(None),
        })
    }

    /// Starts the background expiry sweep.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) {
        let handle = spawn_cleanup_task(Arc::downgrade(self), interval);
        if let Ok(mut slot) = self.sweeper.lock() {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Removes all expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut state = self.state.write().await;
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            state.remove(key);
        }
        expired.len()
    }

    /// Simulates the store dropping the connection.
    ///
    /// Every later command fails with [`BackendError::Closed`].
    pub async fn shutdown(&self) {
        self.state.write().await.closed = true;
        self.stop_sweeper();
    }

    /// Number of entries currently held, expired or not.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    fn stop_sweeper(&self) {
        if let Ok(mut slot) = self.sweeper.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        let value = state.live(key).map(|entry| entry.value.clone());
        if value.is_some() {
            state.lru.touch(key);
        }
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: String, ttl_seconds: u64) -> BackendResult<()> {
        check_ttl(ttl_seconds)?;
        let mut state = self.state.write().await;
        state.ensure_open()?;
        state.insert(key, StoredEntry::new(value, Some(ttl_seconds)), self.max_entries);
        Ok(())
    }

    async fn set_keep_ttl(&self, key: &str, value: String) -> BackendResult<bool> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        let replaced = match state.live(key) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        };
        if replaced {
            state.lru.touch(key);
        }
        Ok(replaced)
    }

    async fn del(&self, keys: &[String]) -> BackendResult<u64> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        let mut removed = 0;
        for key in keys {
            if state.live(key).is_some() && state.remove(key) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        Ok(state.live(key).is_some())
    }

    async fn incr(&self, key: &str) -> BackendResult<i64> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        let next = match state.live(key) {
            Some(entry) => {
                let current: i64 = entry.value.trim().parse().map_err(|_| {
                    BackendError::Command("value is not an integer or out of range".to_string())
                })?;
                let next = current.checked_add(1).ok_or_else(|| {
                    BackendError::Command("increment or decrement would overflow".to_string())
                })?;
                entry.value = next.to_string();
                next
            }
            None => {
                state.insert(key, StoredEntry::new("1".to_string(), None), self.max_entries);
                1
            }
        };
        state.lru.touch(key);
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> BackendResult<bool> {
        check_ttl(ttl_seconds)?;
        let mut state = self.state.write().await;
        state.ensure_open()?;
        match state.live(key) {
            Some(entry) => {
                entry.set_ttl(ttl_seconds);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> BackendResult<Option<u64>> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        Ok(state.live(key).and_then(|entry| entry.ttl_remaining()))
    }

    async fn keys(&self, pattern: &str) -> BackendResult<Vec<String>> {
        let matcher =
            KeyPattern::new(pattern).map_err(|err| BackendError::Command(err.to_string()))?;
        let state = self.state.read().await;
        state.ensure_open()?;
        Ok(state
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && matcher.matches(key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn dbsize(&self) -> BackendResult<u64> {
        let state = self.state.read().await;
        state.ensure_open()?;
        Ok(state.entries.values().filter(|e| !e.is_expired()).count() as u64)
    }

    async fn used_memory(&self) -> BackendResult<String> {
        let state = self.state.read().await;
        state.ensure_open()?;
        let bytes: usize = state
            .entries
            .iter()
            .map(|(key, entry)| key.len() + entry.size())
            .sum();
        Ok(bytes_to_human(bytes as u64))
    }

    async fn flush(&self) -> BackendResult<()> {
        let mut state = self.state.write().await;
        state.ensure_open()?;
        state.entries.clear();
        state.lru.clear();
        Ok(())
    }

    async fn ping(&self) -> BackendResult<()> {
        self.state.read().await.ensure_open()
    }

    async fn close(&self) {
        self.stop_sweeper();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryBackend::new(100);

        store.set_ex("key1", "\"value1\"".to_string(), 60).await.unwrap();

        assert_eq!(store.get("key1").await.unwrap().as_deref(), Some("\"value1\""));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let store = MemoryBackend::new(100);

        store.set_ex("key1", "1".to_string(), 1).await.unwrap();
        assert!(store.exists("key1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get("key1").await.unwrap(), None);
        assert!(!store.exists("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let store = MemoryBackend::new(3);

        for key in ["k1", "k2", "k3"] {
            store.set_ex(key, "1".to_string(), 60).await.unwrap();
        }
        // k1 becomes most recently used; k2 is now oldest
        store.get("k1").await.unwrap();
        store.set_ex("k4", "1".to_string(), 60).await.unwrap();

        assert_eq!(store.len().await, 3);
        assert!(store.exists("k1").await.unwrap());
        assert!(!store.exists("k2").await.unwrap());
        assert!(store.exists("k4").await.unwrap());
    }

    #[tokio::test]
    async fn test_incr_creates_and_counts() {
        let store = MemoryBackend::new(100);

        assert_eq!(store.incr("counter").await.unwrap(), 1);
        assert_eq!(store.incr("counter").await.unwrap(), 2);
        assert_eq!(store.get("counter").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.ttl("counter").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incr_keeps_ttl() {
        let store = MemoryBackend::new(100);

        store.set_ex("counter", "5".to_string(), 60).await.unwrap();
        assert_eq!(store.incr("counter").await.unwrap(), 6);
        assert!(store.ttl("counter").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_incr_rejects_non_integer() {
        let store = MemoryBackend::new(100);

        store.set_ex("text", "\"abc\"".to_string(), 60).await.unwrap();
        assert!(matches!(
            store.incr("text").await,
            Err(BackendError::Command(_))
        ));
    }

    #[tokio::test]
    async fn test_keys_and_multi_delete() {
        let store = MemoryBackend::new(100);

        for key in ["sess:1", "sess:2", "user:1"] {
            store.set_ex(key, "1".to_string(), 60).await.unwrap();
        }

        let mut matched = store.keys("sess:*").await.unwrap();
        matched.sort();
        assert_eq!(matched, keys(&["sess:1", "sess:2"]));

        assert_eq!(store.del(&matched).await.unwrap(), 2);
        assert_eq!(store.del(&keys(&["sess:1"])).await.unwrap(), 0);
        assert!(store.exists("user:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_keep_ttl_only_existing() {
        let store = MemoryBackend::new(100);

        assert!(!store.set_keep_ttl("absent", "1".to_string()).await.unwrap());
        assert!(!store.exists("absent").await.unwrap());

        store.set_ex("present", "1".to_string(), 30).await.unwrap();
        assert!(store.set_keep_ttl("present", "2".to_string()).await.unwrap());
        assert_eq!(store.get("present").await.unwrap().as_deref(), Some("2"));
        assert!(store.ttl("present").await.unwrap().unwrap() <= 30);
    }

    #[tokio::test]
    async fn test_expire_existing_and_missing() {
        let store = MemoryBackend::new(100);

        store.set_ex("key", "1".to_string(), 1).await.unwrap();
        assert!(store.expire("key", 120).await.unwrap());
        assert!(!store.expire("missing", 120).await.unwrap());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(store.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_command_error() {
        let store = MemoryBackend::new(100);
        store.set_ex("key", "1".to_string(), 60).await.unwrap();

        assert!(matches!(
            store.set_ex("key", "2".to_string(), u64::MAX).await,
            Err(BackendError::Command(_))
        ));
        assert!(matches!(
            store.expire("key", u64::MAX / 2).await,
            Err(BackendError::Command(_))
        ));
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("1"));
        assert!(store.ttl("key").await.unwrap().unwrap() <= 60);
    }

    #[tokio::test]
    async fn test_shutdown_closes_connection() {
        let store = MemoryBackend::new(100);

        store.shutdown().await;

        assert!(matches!(store.get("key").await, Err(BackendError::Closed)));
        assert!(matches!(store.ping().await, Err(BackendError::Closed)));
    }

    #[tokio::test]
    async fn test_flush_and_stats() {
        let store = MemoryBackend::new(100);

        store.set_ex("a", "12345".to_string(), 60).await.unwrap();
        assert_eq!(store.dbsize().await.unwrap(), 1);
        assert_eq!(store.used_memory().await.unwrap(), "6B");

        store.flush().await.unwrap();
        assert_eq!(store.dbsize().await.unwrap(), 0);
        assert_eq!(store.used_memory().await.unwrap(), "0B");
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryBackend::new(100);

        store.set_ex("short", "1".to_string(), 1).await.unwrap();
        store.set_ex("long", "1".to_string(), 60).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }
}
