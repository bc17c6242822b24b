//! API Handlers
//!
//! HTTP request handlers mapping one-to-one onto authenticator and cache
//! operations.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};

use crate::auth::{Challenge, Session, SessionAuthenticator};
use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    AuthRequest, AuthResponse, ChallengeRequest, HealthResponse, MessageResponse,
    ProfileUpdateRequest,
};

/// Application state shared across all handlers.
///
/// Both components are built once by the entry point and shared by
/// reference; the cache's connection lifecycle is owned there too.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheStore>,
    pub auth: Arc<SessionAuthenticator>,
}

impl AppState {
    /// Creates a new AppState from already-built components.
    pub fn new(cache: Arc<CacheStore>, auth: Arc<SessionAuthenticator>) -> Self {
        Self { cache, auth }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The cache starts Disconnected; call `connect` before serving.
    pub fn from_config(config: &Config) -> Self {
        let cache = Arc::new(CacheStore::new(config.cache.clone()));
        let auth = Arc::new(SessionAuthenticator::new(cache.clone(), config.auth.clone()));
        Self::new(cache, auth)
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized("missing bearer token, please reconnect your wallet".to_string())
        })
}

/// Handler for POST /auth/challenge
pub async fn challenge_handler(
    State(state): State<AppState>,
    Json(req): Json<ChallengeRequest>,
) -> Result<Json<Challenge>> {
    let challenge = state.auth.issue_challenge(&req.address).await?;
    Ok(Json(challenge))
}

/// Handler for POST /auth
///
/// Issues a bearer token for a wallet, verifying the signed challenge when
/// one is supplied.
pub async fn authenticate_handler(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<AuthResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let proof = req.proof();
    let session = state.auth.authenticate(&req.address, proof.as_ref()).await?;

    Ok(Json(AuthResponse::from(session)))
}

/// Handler for GET /auth/session
pub async fn session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Session>> {
    let token = bearer_token(&headers)?;
    let session = state.auth.session(token).await?;
    Ok(Json(session))
}

/// Handler for PUT /auth/profile
pub async fn profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<MessageResponse>> {
    let token = bearer_token(&headers)?;
    state.auth.refresh_profile(token, req.profile).await?;
    Ok(Json(MessageResponse::new("Profile updated")))
}

/// Handler for POST /auth/logout
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>> {
    let token = bearer_token(&headers)?;
    state.auth.validate(token).await?;
    state.auth.logout(token).await;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.get_stats().await)
}

/// Handler for GET /health
///
/// Always 200; a cache outage is reported as `degraded`.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::for_cache(state.cache.state().await))
}
