//! Session Record Module
//!
//! The stored form of an authenticated bearer token, plus the key layout the
//! authenticator uses in the cache.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::pattern::escape;
use crate::error::{AuthError, AuthResult};

/// Bytes of randomness in a session token
const TOKEN_BYTES: usize = 32;

/// Bytes of randomness in a challenge nonce
const NONCE_BYTES: usize = 16;

// == Session ==
/// Session record as stored under `session:<token>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// Lowercased wallet address
    pub identity: String,
    /// Issue time, Unix seconds
    pub issued_at: i64,
    /// Cached copy of the user's profile
    pub profile: Value,
}

// == Identity ==
/// Canonical form of a wallet identity: trimmed and lowercased.
///
/// Only ASCII letters and digits are accepted, so an identity can never
/// carry a key separator or glob syntax into the key layout.
pub fn normalize_identity(identity: &str) -> AuthResult<String> {
    let normalized = identity.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(AuthError::InvalidIdentity(
            "wallet address must not be empty".to_string(),
        ));
    }
    if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AuthError::InvalidIdentity(format!(
            "wallet address contains invalid characters: {}",
            identity.trim()
        )));
    }
    Ok(normalized)
}

// == Random Material ==
/// New session token: 32 bytes from the OS RNG, hex encoded.
pub fn generate_token() -> String {
    random_hex(TOKEN_BYTES)
}

/// New challenge nonce: 16 bytes from the OS RNG, hex encoded.
pub fn generate_nonce() -> String {
    random_hex(NONCE_BYTES)
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

// == Key Layout ==
pub(crate) fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

pub(crate) fn challenge_key(nonce: &str) -> String {
    format!("auth:challenge:{}", nonce)
}

/// Counter marking a challenge as consumed; INCR makes the claim atomic.
pub(crate) fn challenge_claim_key(nonce: &str) -> String {
    format!("auth:challenge:{}:claimed", nonce)
}

pub(crate) fn profile_key(identity: &str) -> String {
    format!("user:{}:profile", identity)
}

pub(crate) fn login_counter_key(identity: &str) -> String {
    format!("user:{}:logins", identity)
}

pub(crate) fn identity_pattern(identity: &str) -> String {
    format!("user:{}:*", escape(identity))
}
