//! Cache Statistics Module
//!
//! Point-in-time snapshot for operational dashboards.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of the backing store as seen by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Whether the connection is Ready
    pub connected: bool,
    /// Number of keys in the namespace
    pub key_count: u64,
    /// Memory reported by the store, human readable
    pub memory_used: String,
}

impl CacheStats {
    /// Snapshot reported while the store is not Ready.
    pub fn offline() -> Self {
        Self {
            connected: false,
            key_count: 0,
            memory_used: "0B".to_string(),
        }
    }
}
