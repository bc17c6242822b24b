//! Profile Loading
//!
//! Seam between the authenticator and whatever user store owns profiles.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

/// Source of a user's profile snapshot, consulted on a cache miss.
#[async_trait]
pub trait ProfileLoader: Send + Sync {
    async fn load(&self, identity: &str) -> Value;
}

// == Address Profile ==
/// Minimal profile derived from the wallet address alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressProfile;

#[async_trait]
impl ProfileLoader for AddressProfile {
    async fn load(&self, identity: &str) -> Value {
        json!({
            "walletAddress": identity,
            "createdAt": Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_address_profile_shape() {
        let profile = AddressProfile.load("0xabc").await;

        assert_eq!(profile["walletAddress"], "0xabc");
        assert!(profile["createdAt"].is_string());
    }
}
