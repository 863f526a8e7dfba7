//! State shared between the scheduler and the control context.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::stats::Stats;

/// Log verbosity levels understood by the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// The level's lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<u8> for LogLevel {
    fn from(v: u8) -> Self {
        match v {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Error parsing a log level name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown log level: {0} (expected trace, debug, info, warn, or error)")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ParseLogLevelError(other.to_string())),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal result of the scheduler loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopOutcome {
    /// Clean termination; the process exits with this code.
    Code(i32),
    /// Fatal termination carrying a failure message.
    Fatal(String),
}

/// Set-once cell for the loop's terminal result.
///
/// The result transitions from unset to set exactly once across the life of
/// the loop; later attempts are ignored.
#[derive(Debug, Default)]
pub struct ExitStatus {
    inner: RwLock<Option<LoopOutcome>>,
}

impl ExitStatus {
    /// Record the terminal result. Returns `false`, leaving the stored value
    /// untouched, if a result was already recorded.
    pub fn try_set(&self, outcome: LoopOutcome) -> bool {
        let mut guard = self.inner.write();
        if guard.is_some() {
            return false;
        }
        *guard = Some(outcome);
        true
    }

    /// The recorded result, if the loop has terminated.
    pub fn get(&self) -> Option<LoopOutcome> {
        self.inner.read().clone()
    }

    /// Whether a result has been recorded.
    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }
}

/// Mutable runtime state shared by the scheduler and the control context.
///
/// Scalar fields are atomics read with relaxed ordering by the control
/// context: a remote caller may observe a value that is stale by up to one
/// tick. Mutation happens only on the scheduler, as a consequence of applying
/// a dequeued event; the setters are crate-private to keep it that way.
#[derive(Debug)]
pub struct SharedState {
    log_level: AtomicU8,
    paused: AtomicBool,
    debug_active: AtomicBool,
    stats: Stats,
    exit_status: ExitStatus,
}

impl SharedState {
    /// Create shared state with the given initial log level.
    pub fn new(log_level: LogLevel) -> Self {
        Self {
            log_level: AtomicU8::new(log_level as u8),
            paused: AtomicBool::new(false),
            debug_active: AtomicBool::new(false),
            stats: Stats::new(),
            exit_status: ExitStatus::default(),
        }
    }

    /// Current log level.
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from(self.log_level.load(Ordering::Relaxed))
    }

    pub(crate) fn set_log_level(&self, level: LogLevel) {
        self.log_level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether the scheduler is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    /// Whether the debug hook reports an attached session.
    pub fn debug_active(&self) -> bool {
        self.debug_active.load(Ordering::Relaxed)
    }

    pub(crate) fn set_debug_active(&self, active: bool) {
        self.debug_active.store(active, Ordering::Relaxed);
    }

    /// Runtime statistics. Workers may record their own stats here; the
    /// reserved keys `run_start` and `iterations` belong to the scheduler.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The loop's terminal result cell.
    pub fn exit_status(&self) -> &ExitStatus {
        &self.exit_status
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}
