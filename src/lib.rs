//! Wallet Session - bearer sessions for wallet sign-in over a fail-open cache
//!
//! The cache store fronts Redis (or an in-process backend) and degrades to
//! misses when the store is unavailable. The authenticator keeps all session
//! state in that store.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use auth::{SessionAuthenticator, WalletProof};
pub use cache::{CacheStats, CacheStore, ConnectionState};
pub use config::Config;
pub use error::{AuthError, CacheError};
