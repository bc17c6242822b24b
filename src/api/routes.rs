//! API Routes
//!
//! Configures the Axum router with all session service endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    authenticate_handler, challenge_handler, health_handler, logout_handler, profile_handler,
    session_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Liveness plus cache connection state
/// - `GET /stats` - Cache statistics
/// - `POST /auth/challenge` - Issue a sign-in challenge
/// - `POST /auth` - Exchange a wallet (and signed challenge) for a token
/// - `GET /auth/session` - Current session record (Bearer)
/// - `PUT /auth/profile` - Replace the session's profile snapshot (Bearer)
/// - `POST /auth/logout` - Revoke the token (Bearer)
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/auth", post(authenticate_handler))
        .route("/auth/challenge", post(challenge_handler))
        .route("/auth/session", get(session_handler))
        .route("/auth/profile", put(profile_handler))
        .route("/auth/logout", post(logout_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
