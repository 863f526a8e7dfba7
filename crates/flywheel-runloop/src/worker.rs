//! The user-work contract.

use async_trait::async_trait;

use crate::error::WorkError;
use crate::handler::HandlerRegistry;

/// Result of one iteration of user work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep looping.
    Continue,
    /// Terminate the loop; the process exits with this code.
    Exit(i32),
}

/// A unit of repeatable work driven by the scheduler.
///
/// `setup` runs once after the control transport is up and before the first
/// tick; `tick` runs once per eligible tick (not while paused or throttled);
/// `teardown` runs after the loop stops. A `tick` error terminates the
/// process; the runtime provides no retry or recovery for user work.
///
/// Custom control events are declared up front in
/// [`register_handlers`](Worker::register_handlers); an event type no handler
/// claims crashes the loop with an unknown-operation error.
#[async_trait]
pub trait Worker: Send {
    /// Pre-loop hook. A failure here is a startup failure: the loop never
    /// begins and `teardown` does not run.
    async fn setup(&mut self) -> Result<(), WorkError> {
        Ok(())
    }

    /// The iteration.
    async fn tick(&mut self) -> Result<TickOutcome, WorkError>;

    /// Post-loop hook, run after the loop stops (cleanly or fatally).
    async fn teardown(&mut self) -> Result<(), WorkError> {
        Ok(())
    }

    /// Declare handlers for custom control events.
    fn register_handlers(&self, _registry: &mut HandlerRegistry) -> Result<(), crate::RunLoopError> {
        Ok(())
    }
}
