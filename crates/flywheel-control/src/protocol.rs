//! Wire types for the control protocol.
//!
//! Mutating operations answer `202 Accepted` with a [`QueuedResponse`]; the
//! effect becomes visible on a later scheduler tick. Direct reads answer
//! `200` with the current value, which may be stale by up to one tick.

use serde::{Deserialize, Serialize};

/// Body for `POST /v1/control/log-level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLogLevelRequest {
    /// Level name: trace, debug, info, warn, or error.
    pub level: String,
}

/// Body for `POST /v1/control/delay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDelayRequest {
    /// Ticks to skip between iterations; 0 means run every tick.
    pub ticks: u64,
}

/// Acknowledgement for a queued mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedResponse {
    pub status: String,
    /// The event type that was enqueued.
    pub event: String,
}

impl QueuedResponse {
    pub fn queued(event: impl Into<String>) -> Self {
        Self {
            status: "queued".to_string(),
            event: event.into(),
        }
    }
}

/// Response for `GET /v1/control/log-level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLevelResponse {
    pub level: String,
}

/// Response for `GET /v1/control/paused`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PausedResponse {
    pub paused: bool,
}

/// Response for `GET /v1/control/debugger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebuggerStatusResponse {
    /// Whether the debug hook reports an attached session.
    pub active: bool,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}
