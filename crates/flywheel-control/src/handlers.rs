//! Control surface handlers.
//!
//! Two kinds of operation: mutations enqueue an event and return `202`
//! without waiting for the scheduler to apply it; direct reads return shared
//! state with no ordering guarantee relative to in-flight events; a caller
//! may observe a value that is stale by up to one tick.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{debug, info};

use flywheel_runloop::{Event, LogLevel, StatsSnapshot};

use crate::protocol::{
    DebuggerStatusResponse, ErrorResponse, LogLevelResponse, PausedResponse, QueuedResponse,
    SetDelayRequest, SetLogLevelRequest,
};
use crate::state::ControlState;

fn queued(event: Event) -> (StatusCode, Json<QueuedResponse>) {
    let response = QueuedResponse::queued(event.event_type.clone());
    (StatusCode::ACCEPTED, Json(response))
}

/// `GET /v1/control/log-level`: direct read.
pub async fn get_log_level(State(state): State<Arc<ControlState>>) -> Json<LogLevelResponse> {
    Json(LogLevelResponse {
        level: state.shared().log_level().to_string(),
    })
}

/// `POST /v1/control/log-level`: enqueue `set_log_level`.
pub async fn set_log_level(
    State(state): State<Arc<ControlState>>,
    Json(request): Json<SetLogLevelRequest>,
) -> Result<(StatusCode, Json<QueuedResponse>), (StatusCode, Json<ErrorResponse>)> {
    let level: LogLevel = request.level.parse().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("{}", e), "invalid_log_level")),
        )
    })?;

    let event = Event::set_log_level(level);
    let ack = queued(event.clone());
    state.queue().enqueue(event);
    Ok(ack)
}

/// `POST /v1/control/debugger`: enqueue `start_remote_debugger`.
pub async fn start_debugger(
    State(state): State<Arc<ControlState>>,
) -> (StatusCode, Json<QueuedResponse>) {
    info!("Debugger attach requested");
    let event = Event::start_debugger();
    let ack = queued(event.clone());
    state.queue().enqueue(event);
    ack
}

/// `GET /v1/control/debugger`: direct read of the attach flag, so a client
/// can poll until its front-end has something to connect to.
pub async fn debugger_status(
    State(state): State<Arc<ControlState>>,
) -> Json<DebuggerStatusResponse> {
    Json(DebuggerStatusResponse {
        active: state.shared().debug_active(),
    })
}

/// `POST /v1/control/quit`: enqueue `quit`. Takes effect at the next drain
/// phase; an in-flight iteration is never interrupted.
pub async fn quit(State(state): State<Arc<ControlState>>) -> (StatusCode, Json<QueuedResponse>) {
    info!("Remote quit requested");
    let event = Event::quit();
    let ack = queued(event.clone());
    state.queue().enqueue(event);
    ack
}

/// `POST /v1/control/delay`: enqueue `set_delay`.
pub async fn set_delay(
    State(state): State<Arc<ControlState>>,
    Json(request): Json<SetDelayRequest>,
) -> (StatusCode, Json<QueuedResponse>) {
    let event = Event::set_delay(request.ticks);
    let ack = queued(event.clone());
    state.queue().enqueue(event);
    ack
}

/// `POST /v1/control/pause`: enqueue `pause`.
pub async fn pause(State(state): State<Arc<ControlState>>) -> (StatusCode, Json<QueuedResponse>) {
    let event = Event::pause();
    let ack = queued(event.clone());
    state.queue().enqueue(event);
    ack
}

/// `POST /v1/control/resume`: enqueue `resume`.
pub async fn resume(State(state): State<Arc<ControlState>>) -> (StatusCode, Json<QueuedResponse>) {
    let event = Event::resume();
    let ack = queued(event.clone());
    state.queue().enqueue(event);
    ack
}

/// `GET /v1/control/paused`: direct read.
pub async fn get_paused(State(state): State<Arc<ControlState>>) -> Json<PausedResponse> {
    Json(PausedResponse {
        paused: state.shared().is_paused(),
    })
}

/// `GET /v1/control/stats`: snapshot under lock plus derived
/// `seconds_per_iteration` (`null` until the first iteration completes).
pub async fn get_stats(State(state): State<Arc<ControlState>>) -> Json<StatsSnapshot> {
    Json(state.shared().stats().snapshot())
}

/// `POST /v1/control/event/{event_type}`: enqueue a custom event for
/// generic dispatch. The body, when present, must be a JSON value and is
/// carried as the event payload.
pub async fn custom_event(
    State(state): State<Arc<ControlState>>,
    Path(event_type): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<QueuedResponse>), (StatusCode, Json<ErrorResponse>)> {
    let payload = if body.is_empty() {
        None
    } else {
        let value = serde_json::from_slice(&body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    format!("payload is not valid JSON: {}", e),
                    "invalid_payload",
                )),
            )
        })?;
        Some(value)
    };

    debug!("Custom event '{}' queued remotely", event_type);
    let event = match payload {
        Some(value) => Event::with_payload(event_type, value),
        None => Event::new(event_type),
    };
    // A custom event with a reserved name is fine: the scheduler applies
    // built-in semantics for it, same as the dedicated route.
    let ack = queued(event.clone());
    state.queue().enqueue(event);
    Ok(ack)
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "no such control operation",
            "unknown_operation",
        )),
    )
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
