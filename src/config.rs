//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default entry TTL in seconds
pub const DEFAULT_TTL: u64 = 3600;

/// Reads an environment variable and parses it, falling back to `default`.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Retry Policy ==
/// Bounded retry budget for the initial connect sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total handshake attempts before giving up
    pub max_attempts: u32,
    /// Delay added per failed attempt, in milliseconds
    pub step_ms: u64,
    /// Upper bound for a single delay, in milliseconds
    pub cap_ms: u64,
}

impl RetryPolicy {
    /// Delay to wait after the given number of failed attempts.
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let ms = (failed_attempts as u64)
            .saturating_mul(self.step_ms)
            .min(self.cap_ms);
        Duration::from_millis(ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 11,
            step_ms: 100,
            cap_ms: 3000,
        }
    }
}

// == Cache Config ==
/// Settings for the cache store and its backing store connection.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Backing store URL; `None` disables caching
    pub url: Option<String>,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Tenant namespace applied to every key
    pub key_prefix: Option<String>,
    /// Connect retry budget
    pub retry: RetryPolicy,
    /// Per-call timeout for store commands and handshake attempts
    pub command_timeout: Duration,
    /// Expiry sweep interval for the in-process backend
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Config pointing at the given URL with default settings.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Loads cache settings from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Backing store URL (default: unset, caching disabled)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_KEY_PREFIX` - Tenant key prefix (default: unset)
    /// - `CACHE_CONNECT_ATTEMPTS` - Connect retry budget (default: 11)
    /// - `CACHE_BACKOFF_STEP_MS` - Backoff step (default: 100)
    /// - `CACHE_BACKOFF_CAP_MS` - Backoff cap (default: 3000)
    /// - `CACHE_COMMAND_TIMEOUT_MS` - Per-call timeout (default: 5000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            default_ttl: env_or("CACHE_DEFAULT_TTL", DEFAULT_TTL),
            key_prefix: env::var("CACHE_KEY_PREFIX")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            retry: RetryPolicy {
                max_attempts: env_or("CACHE_CONNECT_ATTEMPTS", defaults.max_attempts).max(1),
                step_ms: env_or("CACHE_BACKOFF_STEP_MS", defaults.step_ms),
                cap_ms: env_or("CACHE_BACKOFF_CAP_MS", defaults.cap_ms),
            },
            command_timeout: Duration::from_millis(env_or("CACHE_COMMAND_TIMEOUT_MS", 5000)),
            cleanup_interval: Duration::from_secs(env_or("CLEANUP_INTERVAL", 1).max(1)),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            default_ttl: DEFAULT_TTL,
            key_prefix: None,
            retry: RetryPolicy::default(),
            command_timeout: Duration::from_millis(5000),
            cleanup_interval: Duration::from_secs(1),
        }
    }
}

// == Auth Config ==
/// Settings for session issuance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session record TTL in seconds
    pub session_ttl: u64,
    /// Sign-in challenge TTL in seconds
    pub challenge_ttl: u64,
    /// Memoized profile TTL in seconds
    pub profile_ttl: u64,
    /// Name shown in the sign-in message
    pub domain: String,
    /// Accept authentication without a wallet signature
    pub allow_unverified_identity: bool,
}

impl AuthConfig {
    /// Loads auth settings from environment variables.
    ///
    /// # Environment Variables
    /// - `SESSION_TTL` - Session TTL in seconds (default: 86400)
    /// - `CHALLENGE_TTL` - Challenge TTL in seconds (default: 300)
    /// - `PROFILE_TTL` - Profile memo TTL in seconds (default: 3600)
    /// - `AUTH_DOMAIN` - Sign-in message domain (default: wallet-session)
    /// - `ALLOW_UNVERIFIED_IDENTITY` - `true`/`1` to accept address-only login
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            session_ttl: env_or("SESSION_TTL", defaults.session_ttl),
            challenge_ttl: env_or("CHALLENGE_TTL", defaults.challenge_ttl),
            profile_ttl: env_or("PROFILE_TTL", defaults.profile_ttl),
            domain: env::var("AUTH_DOMAIN").unwrap_or(defaults.domain),
            allow_unverified_identity: env::var("ALLOW_UNVERIFIED_IDENTITY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: 86_400,
            challenge_ttl: 300,
            profile_ttl: DEFAULT_TTL,
            domain: "wallet-session".to_string(),
            allow_unverified_identity: false,
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache store settings
    pub cache: CacheConfig,
    /// Session settings
    pub auth: AuthConfig,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// See [`CacheConfig::from_env`] and [`AuthConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        Self {
            cache: CacheConfig::from_env(),
            auth: AuthConfig::from_env(),
            server_port: env_or("SERVER_PORT", 3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            auth: AuthConfig::default(),
            server_port: 3000,
        }
    }
}
