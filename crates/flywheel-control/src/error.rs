//! Control-plane errors.

use thiserror::Error;

/// Errors from the control server and the one-shot client.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Could not bind the control listener (port already in use, bad host).
    #[error("failed to bind control listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server was started twice; host/port cannot change after the
    /// transport is up.
    #[error("control server already started")]
    AlreadyStarted,

    /// The serve loop failed after startup.
    #[error("control server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The client could not reach the server or the transfer failed.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("control call failed with status {status}: {body}")]
    CallFailed { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The client was asked for an operation it does not know.
    #[error("unknown control operation: {0}")]
    UnknownOperation(String),

    /// Positional arguments did not match the operation.
    #[error("operation '{operation}' expects {expected}")]
    BadArguments {
        operation: String,
        expected: &'static str,
    },
}
