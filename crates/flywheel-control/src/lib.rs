//! # Flywheel Control
//!
//! The control surface of the Flywheel runtime: an HTTP server exposing the
//! named operations an operator can invoke against a running worker process,
//! and a one-shot client for invoking them.
//!
//! Mutating operations (`set_log_level`, `pause`, `resume`, `set_delay`,
//! `quit`, `start_debugger`, custom events) enqueue an event on the
//! scheduler's queue and return immediately; their effect is visible on a
//! later tick. Direct reads (`log_level`, `paused`, `stats`, debugger
//! status) return shared state without any ordering guarantee relative to
//! in-flight event application.

pub mod client;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod server;
pub mod state;

// Re-exports
pub use client::{ControlClient, ControlRequest};
pub use error::ControlError;
pub use protocol::{
    DebuggerStatusResponse, ErrorResponse, LogLevelResponse, PausedResponse, QueuedResponse,
    SetDelayRequest, SetLogLevelRequest,
};
pub use routes::control_router;
pub use server::{ControlConfig, ControlServer, DEFAULT_CONTROL_HOST, DEFAULT_CONTROL_PORT};
pub use state::ControlState;
