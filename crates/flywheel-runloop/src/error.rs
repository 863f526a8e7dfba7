//! Runloop error types.

use thiserror::Error;

/// Failure produced by user work or a custom event handler.
///
/// Carries the failure text that ends up in the process's terminal output
/// when the loop dies. The runtime makes no attempt to retry or recover from
/// one of these; user work fails loud.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct WorkError(String);

impl WorkError {
    /// Create a work error from a failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for WorkError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Errors raised by the scheduler and its collaborators.
#[derive(Debug, Error)]
pub enum RunLoopError {
    /// An event type reached generic dispatch with no registered handler.
    #[error("unknown control operation: {0}")]
    UnknownEvent(String),

    /// A handler registration collided with a built-in event type.
    #[error("cannot register handler for reserved event type: {0}")]
    ReservedEvent(String),

    /// Two handlers were registered for the same event type.
    #[error("handler already registered for event type: {0}")]
    DuplicateHandler(String),

    /// A registered handler failed while applying an event.
    #[error("handler for event '{event_type}' failed: {source}")]
    HandlerFailed {
        event_type: String,
        #[source]
        source: WorkError,
    },

    /// User work failed; the loop terminates without retry.
    #[error("user work failed: {0}")]
    WorkFailed(#[source] WorkError),

    /// Worker setup failed before the first tick.
    #[error("worker setup failed: {0}")]
    SetupFailed(#[source] WorkError),

    /// Invalid scheduler configuration.
    #[error("invalid scheduler configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_error_message() {
        let err = WorkError::new("disk on fire");
        assert_eq!(err.message(), "disk on fire");
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_work_error_from_str() {
        let err: WorkError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_unknown_event_display() {
        let err = RunLoopError::UnknownEvent("frobnicate".to_string());
        let msg = err.to_string();
        assert!(msg.contains("unknown control operation"));
        assert!(msg.contains("frobnicate"));
    }

    #[test]
    fn test_handler_failed_display() {
        let err = RunLoopError::HandlerFailed {
            event_type: "reindex".to_string(),
            source: WorkError::new("index corrupt"),
        };
        let msg = err.to_string();
        assert!(msg.contains("reindex"));
        assert!(msg.contains("index corrupt"));
    }
}
