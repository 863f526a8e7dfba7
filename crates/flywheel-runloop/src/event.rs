//! Control events and the queue that carries them to the scheduler.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::LogLevel;

/// Built-in event type identifiers.
pub mod builtin {
    pub const SET_LOG_LEVEL: &str = "set_log_level";
    pub const START_REMOTE_DEBUGGER: &str = "start_remote_debugger";
    pub const SET_DELAY: &str = "set_delay";
    pub const PAUSE: &str = "pause";
    pub const RESUME: &str = "resume";
    pub const QUIT: &str = "quit";
    pub const STOP: &str = "stop";

    /// All identifiers the scheduler claims for itself.
    pub const ALL: &[&str] = &[
        SET_LOG_LEVEL,
        START_REMOTE_DEBUGGER,
        SET_DELAY,
        PAUSE,
        RESUME,
        QUIT,
        STOP,
    ];
}

/// A control event.
///
/// Produced by any context, consumed exclusively by the scheduler in FIFO
/// order. Created on enqueue, dropped on dequeue, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event type identifier (e.g. `"set_log_level"`, `"pause"`).
    pub event_type: String,

    /// Optional payload.
    pub payload: Option<serde_json::Value>,

    /// When the event was enqueued.
    pub enqueued_at: DateTime<Utc>,
}

impl Event {
    /// Create an event with no payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: None,
            enqueued_at: Utc::now(),
        }
    }

    /// Create an event carrying a payload.
    pub fn with_payload(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload: Some(payload),
            enqueued_at: Utc::now(),
        }
    }

    /// A `set_log_level` event.
    pub fn set_log_level(level: LogLevel) -> Self {
        Self::with_payload(builtin::SET_LOG_LEVEL, serde_json::json!(level.as_str()))
    }

    /// A `set_delay` event. Zero ticks means "run every tick" and is carried
    /// as an absent payload.
    pub fn set_delay(ticks: u64) -> Self {
        if ticks == 0 {
            Self::new(builtin::SET_DELAY)
        } else {
            Self::with_payload(builtin::SET_DELAY, serde_json::json!(ticks))
        }
    }

    /// A `pause` event.
    pub fn pause() -> Self {
        Self::new(builtin::PAUSE)
    }

    /// A `resume` event.
    pub fn resume() -> Self {
        Self::new(builtin::RESUME)
    }

    /// A `quit` event.
    pub fn quit() -> Self {
        Self::new(builtin::QUIT)
    }

    /// A `start_remote_debugger` event.
    pub fn start_debugger() -> Self {
        Self::new(builtin::START_REMOTE_DEBUGGER)
    }

    /// Whether this event terminates the loop.
    pub fn is_quit(&self) -> bool {
        self.event_type == builtin::QUIT || self.event_type == builtin::STOP
    }
}

/// Thread-safe FIFO of control events.
///
/// Any number of producer contexts may [`enqueue`](EventQueue::enqueue)
/// concurrently; only the scheduler drains. The critical section is a single
/// push or a single detach, and is never held across user work or I/O.
///
/// Capacity is unbounded: if the scheduler stalls, the queue grows without
/// limit rather than dropping commands.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: Mutex<VecDeque<Event>>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at the tail. Safe from any context.
    pub fn enqueue(&self, event: Event) {
        debug!("Event enqueued: {}", event.event_type);
        self.inner.lock().push_back(event);
    }

    /// Atomically detach and return the entire queue contents, oldest first,
    /// leaving the queue empty. Returns an empty sequence when nothing is
    /// pending; never blocks waiting for events.
    ///
    /// Only the scheduler may call this.
    pub fn drain_all(&self) -> VecDeque<Event> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
