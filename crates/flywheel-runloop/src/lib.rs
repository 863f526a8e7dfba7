//! # Flywheel Runloop
//!
//! The core of the Flywheel runtime: a single cooperative scheduling loop
//! that repeats user work while applying control events from other contexts.
//!
//! ## Pieces
//!
//! - [`EventQueue`]: thread-safe FIFO written by any context, drained only by
//!   the scheduler
//! - [`Scheduler`]: the tick state machine (drain → pause → throttle → work)
//! - [`Worker`]: the user-work contract (`setup` / `tick` / `teardown`)
//! - [`HandlerRegistry`]: explicit table for custom control events
//! - [`SharedState`]: log level, pause flag, statistics, and exit status
//!   shared with the control context
//! - [`DebugHook`]: pluggable debug-session attach point
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flywheel_runloop::{Scheduler, SchedulerConfig, EventQueue, SharedState};
//!
//! let queue = Arc::new(EventQueue::new());
//! let shared = Arc::new(SharedState::default());
//! let mut scheduler = Scheduler::new(SchedulerConfig::default(), queue, shared)?;
//! let code = scheduler.run(&mut my_worker).await?;
//! ```

pub mod config;
pub mod debug;
pub mod error;
pub mod event;
pub mod handler;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod worker;

// Re-exports
pub use config::SchedulerConfig;
pub use debug::{DebugHook, DebugHookError, NoopDebugHook};
pub use error::{RunLoopError, WorkError};
pub use event::{Event, EventQueue, builtin};
pub use handler::{EventHandler, FnHandler, HandlerRegistry};
pub use scheduler::{LevelReloadFn, Scheduler, SchedulerState};
pub use state::{ExitStatus, LogLevel, LoopOutcome, ParseLogLevelError, SharedState};
pub use stats::{STAT_ITERATIONS, STAT_RUN_START, StatValue, Stats, StatsSnapshot};
pub use worker::{TickOutcome, Worker};
