//! Stored Entry Module
//!
//! A single value held by the in-process backend, with its expiry deadline.

use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Entry ==
/// Serialized value plus expiry metadata.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored payload text
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(value: String, ttl_seconds: Option<u64>) -> Self {
        let mut entry = Self {
            value,
            expires_at: None,
        };
        if let Some(ttl) = ttl_seconds {
            entry.set_ttl(ttl);
        }
        entry
    }

    // == Set TTL ==
    /// Moves the deadline to `ttl_seconds` from now.
    pub fn set_ttl(&mut self, ttl_seconds: u64) {
        let ttl_ms = ttl_seconds.saturating_mul(1000);
        self.expires_at = Some(current_timestamp_ms().saturating_add(ttl_ms));
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches the deadline.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    /// Returns remaining TTL in whole seconds, rounded up like Redis `TTL`.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms.div_ceil(1000))
    }

    /// Approximate payload footprint in bytes.
    pub fn size(&self) -> usize {
        self.value.len()
    }
}

// == Utility Functions ==
/// Deadline `ttl_seconds` from now, or `None` when it does not fit the
/// signed millisecond clock Redis keeps expiries in.
pub fn deadline_after(ttl_seconds: u64) -> Option<u64> {
    ttl_seconds
        .checked_mul(1000)
        .and_then(|ms| current_timestamp_ms().checked_add(ms))
        .filter(|deadline| *deadline <= i64::MAX as u64)
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
