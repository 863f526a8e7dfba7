//! Built-in demo worker.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use flywheel_runloop::{HandlerRegistry, RunLoopError, TickOutcome, WorkError, Worker};

/// Demo worker: logs a heartbeat once per iteration, pacing itself at one
/// beat per second.
///
/// Registers one custom control event, `say`, which logs its payload: a
/// live probe for the generic dispatch path:
/// `flywheel control event say '"hello"'`.
pub(crate) struct HeartbeatWorker {
    beats: u64,
}

impl HeartbeatWorker {
    pub(crate) fn new() -> Self {
        Self { beats: 0 }
    }
}

#[async_trait]
impl Worker for HeartbeatWorker {
    async fn setup(&mut self) -> Result<(), WorkError> {
        info!("Heartbeat worker starting");
        Ok(())
    }

    async fn tick(&mut self) -> Result<TickOutcome, WorkError> {
        self.beats += 1;
        info!("Heartbeat {}", self.beats);
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(TickOutcome::Continue)
    }

    async fn teardown(&mut self) -> Result<(), WorkError> {
        info!("Heartbeat worker stopping after {} beats", self.beats);
        Ok(())
    }

    fn register_handlers(&self, registry: &mut HandlerRegistry) -> Result<(), RunLoopError> {
        registry.register_fn("say", |payload| {
            match payload {
                Some(value) => info!("say: {}", value),
                None => info!("say: (no payload)"),
            }
            Ok(())
        })
    }
}
