//! Response DTOs for the session API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::auth::Session;
use crate::cache::ConnectionState;

/// Response body for POST /auth
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Normalized wallet address
    pub address: String,
    pub issued_at: i64,
    pub profile: Value,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            address: session.identity,
            issued_at: session.issued_at,
            profile: session.profile,
        }
    }
}

/// Plain acknowledgement, used by profile refresh and logout
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Creates a new MessageResponse
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
///
/// The service stays up while the cache is down, so `status` reports
/// `degraded` rather than failing the probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Cache connection state
    pub cache: ConnectionState,
}

impl HealthResponse {
    /// Creates a HealthResponse for the given cache state with current timestamp
    pub fn for_cache(cache: ConnectionState) -> Self {
        let status = if cache.is_ready() { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
