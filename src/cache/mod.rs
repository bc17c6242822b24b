//! Cache Module
//!
//! Fail-open caching over a pluggable backing store with TTL expiration,
//! pattern invalidation and a managed connection lifecycle.

pub mod backend;
mod connection;
pub mod pattern;
mod stats;
mod store;


// Re-export public types
pub use backend::{Backend, MemoryBackend, RedisBackend};
pub use connection::ConnectionState;
pub use stats::CacheStats;
pub use store::CacheStore;
