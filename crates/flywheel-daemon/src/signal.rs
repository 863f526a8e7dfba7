//! OS signal bridging.
//!
//! SIGTERM and SIGINT enqueue a `quit` event, so operating-system shutdown
//! requests take the same cooperative path as a remote quit: applied at the
//! next drain phase, never interrupting an in-flight iteration.

use std::sync::Arc;

use tracing::info;

use flywheel_runloop::{Event, EventQueue};

use crate::error::DaemonError;

/// Install signal handlers that translate termination signals into queued
/// `quit` events. Must be called from within the async runtime.
#[cfg(unix)]
pub fn bridge_signals(queue: Arc<EventQueue>) -> Result<(), DaemonError> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm =
        signal(SignalKind::terminate()).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;
    let term_queue = queue.clone();
    tokio::spawn(async move {
        while sigterm.recv().await.is_some() {
            info!("Received SIGTERM; queueing quit");
            term_queue.enqueue(Event::quit());
        }
    });

    let mut sigint =
        signal(SignalKind::interrupt()).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            info!("Received SIGINT; queueing quit");
            queue.enqueue(Event::quit());
        }
    });

    info!("OS signal handlers installed (SIGTERM, SIGINT)");
    Ok(())
}

/// Non-Unix fallback: only Ctrl+C is available.
#[cfg(not(unix))]
pub fn bridge_signals(queue: Arc<EventQueue>) -> Result<(), DaemonError> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C; queueing quit");
            queue.enqueue(Event::quit());
        }
    });

    info!("OS signal handlers installed (Ctrl+C only)");
    Ok(())
}
