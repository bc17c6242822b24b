//! Error types for the session service
//!
//! Provides unified error handling using thiserror. Backend and cache errors
//! stay inside the cache layer; auth errors are surfaced to callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Backend Error Enum ==
/// Raw failure from a backing store.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Error reported by the Redis client
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The store has closed the connection
    #[error("backing store connection closed")]
    Closed,

    /// The store rejected the command
    #[error("command failed: {0}")]
    Command(String),

    /// URL scheme has no backend
    #[error("unsupported backing store scheme: {0}")]
    UnsupportedScheme(String),

    /// URL could not be parsed
    #[error("invalid backing store url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BackendError {
    /// Whether the error means the connection itself is gone.
    pub fn is_connection_lost(&self) -> bool {
        match self {
            BackendError::Closed => true,
            BackendError::Redis(err) => {
                err.is_connection_dropped() || err.is_io_error() || err.is_connection_refusal()
            }
            _ => false,
        }
    }
}

// == Cache Error Enum ==
/// Failure surfaced by `CacheStore::connect`.
///
/// Every other cache operation absorbs its errors.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// No backing store address configured
    #[error("cache not configured: {0}")]
    Configuration(String),

    /// Handshake failed after exhausting the retry budget
    #[error("cache connection failed after {attempts} attempts: {reason}")]
    Connection { attempts: u32, reason: String },
}

// == Auth Error Enum ==
/// Failure surfaced by the session authenticator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Proof missing or not matching the claimed identity
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Token unknown or expired
    #[error("session not found")]
    SessionNotFound,

    /// Identity is not usable as a wallet address
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// Session store refused the write
    #[error("session store unavailable")]
    StoreUnavailable,
}

// == Api Error Enum ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Caller must (re)authenticate
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Session store is down
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Authentication(_) | AuthError::SessionNotFound => {
                ApiError::Unauthorized(format!("{}, please reconnect your wallet", err))
            }
            AuthError::InvalidIdentity(_) => ApiError::InvalidRequest(err.to_string()),
            AuthError::StoreUnavailable => ApiError::Unavailable(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Result of a raw backend call.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Result of an authenticator operation.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
