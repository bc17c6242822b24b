//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! in-process backend. The task holds only a weak reference and exits once
//! the backend is dropped.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::backend::MemoryBackend;

/// Spawns a background task that periodically purges expired entries.
///
/// # Arguments
/// * `backend` - weak handle to the in-process store
/// * `interval` - time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted when the backend closes.
pub fn spawn_cleanup_task(backend: Weak<MemoryBackend>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = backend.upgrade() else {
                debug!("Backend dropped, stopping TTL cleanup task");
                break;
            };
            let removed = store.purge_expired().await;
            drop(store);

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::Backend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = MemoryBackend::new(100);
        store
            .set_ex("expire_soon", "1".to_string(), 1)
            .await
            .unwrap();
        store.set_ex("long_lived", "1".to_string(), 3600).await.unwrap();

        let handle = spawn_cleanup_task(Arc::downgrade(&store), Duration::from_millis(500));

        tokio::time::sleep(Duration::from_millis(2000)).await;

        // Sweep removed the entry without any read touching it
        assert_eq!(store.len().await, 1);
        assert!(store.exists("long_lived").await.unwrap());

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_when_backend_dropped() {
        let store = MemoryBackend::new(100);
        let handle = spawn_cleanup_task(Arc::downgrade(&store), Duration::from_millis(50));

        drop(store);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(handle.is_finished(), "Task should exit after backend drop");
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let store = MemoryBackend::new(100);
        let handle = spawn_cleanup_task(Arc::downgrade(&store), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
