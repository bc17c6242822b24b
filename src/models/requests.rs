//! Request DTOs for the session API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::auth::WalletProof;

/// Request body for POST /auth/challenge
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeRequest {
    /// Wallet address that will sign the challenge
    pub address: String,
}

/// Request body for POST /auth
///
/// `nonce` and `signature` come from a signed challenge and must be sent
/// together.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    pub address: String,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl AuthRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.address.trim().is_empty() {
            return Some("Address cannot be empty".to_string());
        }
        if self.nonce.is_some() != self.signature.is_some() {
            return Some("nonce and signature must be supplied together".to_string());
        }
        None
    }

    /// Wallet proof carried by the request, if any.
    pub fn proof(&self) -> Option<WalletProof> {
        match (&self.nonce, &self.signature) {
            (Some(nonce), Some(signature)) => Some(WalletProof::new(nonce, signature)),
            _ => None,
        }
    }
}

/// Request body for PUT /auth/profile
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdateRequest {
    /// New profile snapshot, stored as-is
    pub profile: Value,
}
