//! Explicit registration table for user-defined control events.
//!
//! Any event type that is not one of the scheduler's built-ins is dispatched
//! through this table. Handlers are declared up front, at startup; an event
//! type nothing claims produces a deterministic unknown-operation error
//! instead of a reflective lookup.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{RunLoopError, WorkError};
use crate::event::builtin;

/// Callback invoked by the scheduler for a registered custom event type.
///
/// The payload is whatever the control caller attached to the event. A
/// handler error is fatal to the loop, same as a user-work failure.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: Option<serde_json::Value>) -> Result<(), WorkError>;
}

/// Adapter turning a plain function into an [`EventHandler`].
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(Option<serde_json::Value>) -> Result<(), WorkError> + Send + Sync,
{
    async fn handle(&self, payload: Option<serde_json::Value>) -> Result<(), WorkError> {
        (self.0)(payload)
    }
}

/// Event-type → handler table, populated at startup by the worker.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn EventHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `event_type`.
    ///
    /// Built-in identifiers and duplicates are rejected, so a wiring mistake
    /// surfaces at startup rather than as a runtime dispatch surprise.
    pub fn register(
        &mut self,
        event_type: impl Into<String>,
        handler: Box<dyn EventHandler>,
    ) -> Result<(), RunLoopError> {
        let event_type = event_type.into();
        if builtin::ALL.contains(&event_type.as_str()) {
            return Err(RunLoopError::ReservedEvent(event_type));
        }
        if self.handlers.contains_key(&event_type) {
            return Err(RunLoopError::DuplicateHandler(event_type));
        }
        self.handlers.insert(event_type, handler);
        Ok(())
    }

    /// Register a plain function as a handler.
    pub fn register_fn<F>(
        &mut self,
        event_type: impl Into<String>,
        handler: F,
    ) -> Result<(), RunLoopError>
    where
        F: Fn(Option<serde_json::Value>) -> Result<(), WorkError> + Send + Sync + 'static,
    {
        self.register(event_type, Box::new(FnHandler(handler)))
    }

    /// Whether a handler is registered for `event_type`.
    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Registered event types, in no particular order.
    pub fn registered_types(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch an event to its registered handler.
    pub(crate) async fn dispatch(
        &self,
        event_type: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<(), RunLoopError> {
        match self.handlers.get(event_type) {
            Some(handler) => {
                handler
                    .handle(payload)
                    .await
                    .map_err(|source| RunLoopError::HandlerFailed {
                        event_type: event_type.to_string(),
                        source,
                    })
            }
            None => Err(RunLoopError::UnknownEvent(event_type.to_string())),
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registered", &self.registered_types())
            .finish()
    }
}
