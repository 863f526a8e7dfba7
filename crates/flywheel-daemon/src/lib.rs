//! # Flywheel Daemon
//!
//! Process management and runtime composition for Flywheel workers.
//!
//! ## Features
//!
//! - [`Runner`]: wires the control server, OS signal bridge, and scheduler
//!   around a [`Worker`](flywheel_runloop::Worker), owning startup and
//!   shutdown ordering
//! - [`detach`]: Unix double-fork background transition, performed once
//!   before the async runtime starts
//! - [`PidFile`]: prevents duplicate daemonized instances
//! - signal bridging: SIGTERM/SIGINT become queued `quit` events
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flywheel_daemon::RunnerBuilder;
//!
//! let runner = RunnerBuilder::new().build()?;
//! let code = runner.run(&mut my_worker).await?;
//! std::process::exit(code);
//! ```

pub mod detach;
pub mod error;
pub mod pid;
pub mod runner;
pub mod signal;

// Re-exports
pub use detach::{Detach, DetachOptions, detach};
pub use error::DaemonError;
pub use pid::PidFile;
pub use runner::{Runner, RunnerBuilder, RunnerConfig};
pub use signal::bridge_signals;
