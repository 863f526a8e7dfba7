//! Control surface router.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::ControlState;

/// Build the control router over the given state.
pub fn control_router(state: Arc<ControlState>) -> Router {
    Router::new()
        .route(
            "/v1/control/log-level",
            get(handlers::get_log_level).post(handlers::set_log_level),
        )
        .route(
            "/v1/control/debugger",
            get(handlers::debugger_status).post(handlers::start_debugger),
        )
        .route("/v1/control/quit", post(handlers::quit))
        .route("/v1/control/delay", post(handlers::set_delay))
        .route("/v1/control/pause", post(handlers::pause))
        .route("/v1/control/resume", post(handlers::resume))
        .route("/v1/control/paused", get(handlers::get_paused))
        .route("/v1/control/stats", get(handlers::get_stats))
        .route("/v1/control/event/{event_type}", post(handlers::custom_event))
        .fallback(handlers::not_found)
        .with_state(state)
}
