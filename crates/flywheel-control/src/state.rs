//! Shared handle given to every control handler.

use std::sync::Arc;

use flywheel_runloop::{EventQueue, SharedState};

/// What the control surface can touch: the event queue for mutations and the
/// shared state for direct reads. Handlers never mutate state directly.
#[derive(Debug, Clone)]
pub struct ControlState {
    queue: Arc<EventQueue>,
    shared: Arc<SharedState>,
}

impl ControlState {
    /// Create a control state over the scheduler's queue and shared state.
    pub fn new(queue: Arc<EventQueue>, shared: Arc<SharedState>) -> Self {
        Self { queue, shared }
    }

    /// The event queue.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// The shared runtime state.
    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }
}
