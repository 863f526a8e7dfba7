//! The control channel transport.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use flywheel_runloop::{EventQueue, SharedState};

use crate::error::ControlError;
use crate::routes::control_router;
use crate::state::ControlState;

/// Default control host.
pub const DEFAULT_CONTROL_HOST: &str = "localhost";

/// Default control port.
pub const DEFAULT_CONTROL_PORT: u16 = 7249;

/// Control transport configuration. Read once at startup; the listener
/// address cannot change after the server has started.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    pub host: String,
    pub port: u16,
}

impl ControlConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The listen address as `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CONTROL_HOST.to_string(),
            port: DEFAULT_CONTROL_PORT,
        }
    }
}

/// HTTP server exposing the control surface.
///
/// Runs the listener on a background task so the scheduler context never
/// blocks on network I/O. Starting twice is an error: reconfiguring the
/// address of a live transport is rejected by contract.
pub struct ControlServer {
    config: ControlConfig,
    state: Arc<ControlState>,
    shutdown_tx: watch::Sender<bool>,
    serve_handle: Option<JoinHandle<Result<(), std::io::Error>>>,
    local_addr: Option<SocketAddr>,
}

impl ControlServer {
    /// Create a server over the scheduler's queue and shared state.
    pub fn new(config: ControlConfig, queue: Arc<EventQueue>, shared: Arc<SharedState>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            state: Arc::new(ControlState::new(queue, shared)),
            shutdown_tx,
            serve_handle: None,
            local_addr: None,
        }
    }

    /// The configured address.
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// The bound address, once started. Differs from the configured address
    /// when port 0 was requested.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the listener and start serving on a background task.
    ///
    /// Fails with [`ControlError::Bind`] when the port is taken (a startup
    /// failure: the process should not come up half-controllable) and with
    /// [`ControlError::AlreadyStarted`] on a second call.
    pub async fn start(&mut self) -> Result<(), ControlError> {
        if self.serve_handle.is_some() {
            return Err(ControlError::AlreadyStarted);
        }

        let addr = self.config.addr();
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| ControlError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(ControlError::Serve)?;
        self.local_addr = Some(local_addr);

        let router = control_router(self.state.clone());
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.wait_for(|stop| *stop).await;
                })
                .await
        });
        self.serve_handle = Some(handle);

        info!("Control server listening on {}", local_addr);
        Ok(())
    }

    /// Signal shutdown and wait for the serve task to finish.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(handle) = self.serve_handle.take() {
            match handle.await {
                Ok(Ok(())) => info!("Control server stopped"),
                Ok(Err(e)) => error!("Control server exited with error: {}", e),
                Err(e) => error!("Control server task failed: {}", e),
            }
        }
    }
}

impl std::fmt::Debug for ControlServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlServer")
            .field("config", &self.config)
            .field("started", &self.serve_handle.is_some())
            .field("local_addr", &self.local_addr)
            .finish()
    }
}
