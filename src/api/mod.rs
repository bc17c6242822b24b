//! API Module
//!
//! HTTP handlers and routing for the wallet session REST API.
//!
//! # Endpoints
//! - `POST /auth/challenge`, `POST /auth` - Sign in
//! - `GET /auth/session`, `PUT /auth/profile`, `POST /auth/logout` - Bearer-gated
//! - `GET /stats`, `GET /health` - Operational

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
