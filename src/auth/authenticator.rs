//! Session Authenticator Module
//!
//! Binds opaque bearer tokens to wallet identities. Session state lives only
//! in the cache store, so any process sharing the store can validate any
//! token.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::profile::{AddressProfile, ProfileLoader};
use super::session::{
    challenge_claim_key, challenge_key, generate_nonce, generate_token, identity_pattern,
    login_counter_key, normalize_identity, profile_key, session_key, Session,
};
use super::signature::{verify_personal_signature, WalletProof};
use crate::cache::CacheStore;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

// == Challenge ==
/// Sign-in challenge handed to a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub nonce: String,
    /// Exact text the wallet must `personal_sign`
    pub message: String,
    /// Seconds until the challenge lapses
    pub expires_in: u64,
}

/// Stored form of an outstanding challenge.
#[derive(Debug, Serialize, Deserialize)]
struct ChallengeRecord {
    identity: String,
    message: String,
}

fn challenge_message(domain: &str, identity: &str, nonce: &str, issued_at: DateTime<Utc>) -> String {
    format!(
        "Sign this message to authenticate with {}.\n\nWallet: {}\nNonce: {}\nIssued At: {}",
        domain,
        identity,
        nonce,
        issued_at.to_rfc3339()
    )
}

// == Session Authenticator ==
pub struct SessionAuthenticator {
    cache: Arc<CacheStore>,
    config: AuthConfig,
    profiles: Arc<dyn ProfileLoader>,
}

impl SessionAuthenticator {
    /// Creates an authenticator that derives profiles from the address.
    pub fn new(cache: Arc<CacheStore>, config: AuthConfig) -> Self {
        Self {
            cache,
            config,
            profiles: Arc::new(AddressProfile),
        }
    }

    /// Replaces the profile source.
    pub fn with_profile_loader(mut self, profiles: Arc<dyn ProfileLoader>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // == Issue Challenge ==
    /// Creates a single-use challenge for `identity` to sign.
    pub async fn issue_challenge(&self, identity: &str) -> AuthResult<Challenge> {
        let identity = normalize_identity(identity)?;
        let nonce = generate_nonce();
        let message = challenge_message(&self.config.domain, &identity, &nonce, Utc::now());

        let record = ChallengeRecord {
            identity,
            message: message.clone(),
        };
        let stored = self
            .cache
            .set(&challenge_key(&nonce), &record, Some(self.config.challenge_ttl))
            .await;
        if !stored {
            return Err(AuthError::StoreUnavailable);
        }

        debug!(nonce = %nonce, "Issued sign-in challenge");
        Ok(Challenge {
            nonce,
            message,
            expires_in: self.config.challenge_ttl,
        })
    }

    // == Authenticate ==
    /// Issues a session for `identity`.
    ///
    /// A signed challenge is required unless `allow_unverified_identity` is
    /// set. Fails with `Authentication` on a missing or invalid proof and
    /// `StoreUnavailable` when the session cannot be stored.
    pub async fn authenticate(
        &self,
        identity: &str,
        proof: Option<&WalletProof>,
    ) -> AuthResult<Session> {
        let identity = normalize_identity(identity)?;

        match proof {
            Some(proof) => self.verify_proof(&identity, proof).await?,
            None if self.config.allow_unverified_identity => {
                warn!(identity = %identity, "Issuing session without proof of wallet ownership");
            }
            None => {
                return Err(AuthError::Authentication(
                    "a signed challenge is required".to_string(),
                ))
            }
        }

        let session = Session {
            token: generate_token(),
            profile: self.load_profile(&identity).await,
            identity,
            issued_at: Utc::now().timestamp(),
        };

        let stored = self
            .cache
            .set(&session_key(&session.token), &session, Some(self.config.session_ttl))
            .await;
        if !stored {
            return Err(AuthError::StoreUnavailable);
        }

        // Best-effort; not atomic with the session write
        let logins = self.cache.increment(&login_counter_key(&session.identity)).await;
        info!(identity = %session.identity, logins, "Session issued");

        Ok(session)
    }

    /// Consumes the challenge named by `proof` and checks its signature.
    async fn verify_proof(&self, identity: &str, proof: &WalletProof) -> AuthResult<()> {
        let nonce = proof.nonce.trim();
        let key = challenge_key(nonce);

        let record: ChallengeRecord = self
            .cache
            .get(&key)
            .await
            .ok_or_else(|| AuthError::Authentication("challenge is unknown or expired".to_string()))?;

        let claim = challenge_claim_key(nonce);
        if self.cache.try_increment(&claim).await != Some(1) {
            return Err(AuthError::Authentication(
                "challenge has already been used".to_string(),
            ));
        }
        self.cache.expire(&claim, self.config.challenge_ttl).await;
        self.cache.delete(&key).await;

        if record.identity != identity {
            return Err(AuthError::Authentication(
                "challenge was issued to a different wallet".to_string(),
            ));
        }

        verify_personal_signature(identity, &record.message, &proof.signature)
    }

    /// Memoized profile, loaded on miss.
    async fn load_profile(&self, identity: &str) -> Value {
        let key = profile_key(identity);
        if let Some(profile) = self.cache.get::<Value>(&key).await {
            return profile;
        }

        let profile = self.profiles.load(identity).await;
        self.cache
            .set(&key, &profile, Some(self.config.profile_ttl))
            .await;
        profile
    }

    // == Validate ==
    /// Identity bound to `token`.
    pub async fn validate(&self, token: &str) -> AuthResult<String> {
        self.session(token).await.map(|session| session.identity)
    }

    /// Full session record bound to `token`.
    pub async fn session(&self, token: &str) -> AuthResult<Session> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::SessionNotFound);
        }
        self.cache
            .get::<Session>(&session_key(token))
            .await
            .ok_or(AuthError::SessionNotFound)
    }

    // == Refresh Profile ==
    /// Overwrites the session's profile snapshot.
    ///
    /// The token and remaining TTL are unchanged.
    pub async fn refresh_profile(&self, token: &str, profile: Value) -> AuthResult<()> {
        let mut session = self.session(token).await?;
        session.profile = profile;

        if !self.cache.replace(&session_key(&session.token), &session).await {
            return Err(if self.cache.is_ready().await {
                AuthError::SessionNotFound
            } else {
                AuthError::StoreUnavailable
            });
        }

        self.cache
            .set(
                &profile_key(&session.identity),
                &session.profile,
                Some(self.config.profile_ttl),
            )
            .await;
        debug!(identity = %session.identity, "Profile refreshed");
        Ok(())
    }

    // == Logout ==
    /// Revokes `token`. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }
        self.cache.delete(&session_key(token)).await;
        debug!("Session revoked");
    }

    // == Invalidate Identity ==
    /// Drops every memoized entry for `identity`; returns how many were removed.
    pub async fn invalidate_identity(&self, identity: &str) -> AuthResult<u64> {
        let identity = normalize_identity(identity)?;
        let removed = self.cache.delete_pattern(&identity_pattern(&identity)).await;
        info!(identity = %identity, removed, "Invalidated cached user data");
        Ok(removed)
    }
}
