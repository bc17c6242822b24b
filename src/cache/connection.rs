//! Connection State Module
//!
//! Lifecycle of the shared backing store connection.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::backend::Backend;

// == Connection State ==
/// Lifecycle state of the backing store connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection; initial state
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Commands are served
    Ready,
    /// Graceful close in progress
    Disconnecting,
    /// Retry budget exhausted
    Failed,
}

impl ConnectionState {
    /// Whether cache operations are served in this state.
    pub fn is_ready(self) -> bool {
        self == ConnectionState::Ready
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Ready => "ready",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

// == Connection ==
/// Process-wide connection record guarded by the cache store.
pub(crate) struct Connection {
    pub(crate) state: ConnectionState,
    pub(crate) retry_count: u32,
    /// Present only while Ready
    pub(crate) backend: Option<Arc<dyn Backend>>,
}

impl Connection {
    pub(crate) fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            retry_count: 0,
            backend: None,
        }
    }

    /// Backend handle if the connection is Ready.
    pub(crate) fn ready_backend(&self) -> Option<Arc<dyn Backend>> {
        if self.state.is_ready() {
            self.backend.clone()
        } else {
            None
        }
    }

    pub(crate) fn mark_ready(&mut self, backend: Arc<dyn Backend>) {
        self.state = ConnectionState::Ready;
        self.retry_count = 0;
        self.backend = Some(backend);
    }

    /// Drops the backend and moves to `state`, returning the old handle.
    pub(crate) fn release(&mut self, state: ConnectionState) -> Option<Arc<dyn Backend>> {
        self.state = state;
        self.backend.take()
    }
}
