//! Daemon-related errors.

use std::path::PathBuf;

use thiserror::Error;

use flywheel_control::ControlError;
use flywheel_runloop::RunLoopError;

/// Errors from process management and runtime composition.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// PID file exists and the recorded process is alive.
    #[error("already running (PID file: {path}, PID: {pid})")]
    AlreadyRunning { path: PathBuf, pid: u32 },

    /// Failed to create or update the PID file.
    #[error("failed to create PID file at {path}: {reason}")]
    PidFileCreation { path: PathBuf, reason: String },

    /// Failed to read the PID file.
    #[error("failed to read PID file at {path}: {reason}")]
    PidFileRead { path: PathBuf, reason: String },

    /// Failed to remove the PID file.
    #[error("failed to remove PID file at {path}: {reason}")]
    PidFileRemoval { path: PathBuf, reason: String },

    /// Fork/setsid/stdio redirection failed while detaching.
    #[error("failed to detach from terminal: {0}")]
    DetachFailed(String),

    /// Detach requested on a platform without fork.
    #[error("detaching is not supported on this platform")]
    DetachUnsupported,

    /// Failed to install OS signal handlers.
    #[error("failed to set up signal handlers: {0}")]
    SignalSetup(String),

    /// Control transport failure (startup or shutdown).
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Scheduler or worker failure.
    #[error(transparent)]
    RunLoop(#[from] RunLoopError),

    /// Invalid runner configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
