//! The cooperative scheduling loop.
//!
//! Exactly one scheduler drives a worker. Each tick drains and applies every
//! pending control event, then, subject to pause and throttle policy,
//! invokes user work and records statistics, until a quit event or a terminal
//! user-work result stops the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::debug::{DebugHook, NoopDebugHook};
use crate::error::RunLoopError;
use crate::event::{Event, EventQueue, builtin};
use crate::handler::HandlerRegistry;
use crate::state::{LogLevel, LoopOutcome, SharedState};
use crate::stats::{STAT_ITERATIONS, STAT_RUN_START, StatValue};
use crate::worker::{TickOutcome, Worker};

/// Scheduler lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    Initializing = 0,
    Running = 1,
    Stopped = 2,
}

impl From<u8> for SchedulerState {
    fn from(v: u8) -> Self {
        match v {
            0 => SchedulerState::Initializing,
            1 => SchedulerState::Running,
            _ => SchedulerState::Stopped,
        }
    }
}

/// Callback applying a log-level change to the logging backend.
///
/// The scheduler owns the level as state; the embedder owns the subscriber.
/// This is the seam between the two, so a `set_log_level` event reconfigures
/// logging through the same event-driven path as every other mutation.
pub type LevelReloadFn = dyn Fn(LogLevel) + Send + Sync;

/// The scheduler: a single cooperative loop applying control events and
/// driving user work.
pub struct Scheduler {
    config: SchedulerConfig,
    queue: Arc<EventQueue>,
    shared: Arc<SharedState>,
    handlers: HandlerRegistry,
    debug_hook: Box<dyn DebugHook>,
    level_reload: Option<Box<LevelReloadFn>>,
    state: AtomicU8,
    /// Throttle interval in ticks; `None` runs user work every tick.
    throttle: Option<u64>,
    /// Ticks skipped since user work last ran.
    throttle_count: u64,
    /// Total ticks taken.
    ticks: u64,
}

impl Scheduler {
    /// Create a scheduler over the given queue and shared state.
    pub fn new(
        config: SchedulerConfig,
        queue: Arc<EventQueue>,
        shared: Arc<SharedState>,
    ) -> Result<Self, RunLoopError> {
        config.validate().map_err(RunLoopError::Config)?;
        let throttle = config.initial_delay.filter(|delay| *delay > 0);

        Ok(Self {
            config,
            queue,
            shared,
            handlers: HandlerRegistry::new(),
            debug_hook: Box::new(NoopDebugHook),
            level_reload: None,
            state: AtomicU8::new(SchedulerState::Initializing as u8),
            throttle,
            throttle_count: 0,
            ticks: 0,
        })
    }

    /// Install the custom-event handler table.
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Install a debug hook.
    pub fn with_debug_hook(mut self, hook: Box<dyn DebugHook>) -> Self {
        self.debug_hook = hook;
        self
    }

    /// Install the logging reload callback.
    pub fn with_level_reload(mut self, reload: Box<LevelReloadFn>) -> Self {
        self.level_reload = Some(reload);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        SchedulerState::from(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: SchedulerState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Current throttle interval.
    pub fn throttle(&self) -> Option<u64> {
        self.throttle
    }

    /// Ticks skipped since user work last ran.
    pub fn throttle_count(&self) -> u64 {
        self.throttle_count
    }

    /// Total ticks taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drive `worker` until a quit event, a terminal user-work result, or a
    /// fatal error.
    ///
    /// The terminal result is recorded in the shared
    /// [`ExitStatus`](crate::state::ExitStatus) exactly once; the first
    /// recording wins.
    pub async fn run(&mut self, worker: &mut dyn Worker) -> Result<i32, RunLoopError> {
        let result = self.run_loop(worker).await;

        let outcome = match &result {
            Ok(code) => LoopOutcome::Code(*code),
            Err(e) => LoopOutcome::Fatal(e.to_string()),
        };
        if !self.shared.exit_status().try_set(outcome) {
            warn!("Exit status already recorded; keeping the first value");
        }
        self.set_state(SchedulerState::Stopped);

        result
    }

    async fn run_loop(&mut self, worker: &mut dyn Worker) -> Result<i32, RunLoopError> {
        self.set_state(SchedulerState::Running);
        self.shared
            .stats()
            .set(STAT_RUN_START, StatValue::Time(Utc::now()));
        info!(
            "Scheduler running (tick interval: {:?}, throttle: {:?})",
            self.config.tick_interval(),
            self.throttle
        );

        loop {
            if let Some(max) = self.config.max_ticks {
                if self.ticks >= max {
                    info!("Configured limit of {} ticks reached; stopping", max);
                    return Ok(0);
                }
            }
            self.ticks += 1;

            // 1. Drain and apply every pending event.
            if let Some(code) = self.drain_events().await? {
                return Ok(code);
            }

            // 2. Paused: idle one scheduling unit. User work is not invoked
            //    and the throttle counter does not advance.
            if self.shared.is_paused() {
                sleep(self.config.tick_interval()).await;
                continue;
            }

            // 3. Throttled: skip this tick unless the counter has caught up.
            if let Some(delay) = self.throttle {
                if self.throttle_count != delay {
                    sleep(self.config.tick_interval()).await;
                    self.throttle_count += 1;
                    continue;
                }
            }

            // 4. Invoke user work.
            match worker.tick().await {
                Ok(outcome) => {
                    self.shared.stats().bump(STAT_ITERATIONS, 1);
                    self.throttle_count = 0;
                    if let TickOutcome::Exit(code) = outcome {
                        info!("User work requested exit with code {}", code);
                        return Ok(code);
                    }
                }
                Err(e) => {
                    error!("User work failed: {}", e);
                    return Err(RunLoopError::WorkFailed(e));
                }
            }
        }
    }

    /// Repeatedly drain and apply queued events until a drain observes the
    /// queue empty. Returns an exit code when a quit event is applied.
    async fn drain_events(&mut self) -> Result<Option<i32>, RunLoopError> {
        loop {
            let mut batch = self.queue.drain_all();
            if batch.is_empty() {
                return Ok(None);
            }

            while let Some(event) = batch.pop_front() {
                if event.is_quit() {
                    // Shutdown wins: events drained into the same batch are
                    // discarded, not applied.
                    if batch.is_empty() {
                        info!("Quit event received; stopping");
                    } else {
                        info!(
                            "Quit event received; stopping and discarding {} pending events",
                            batch.len()
                        );
                    }
                    return Ok(Some(0));
                }
                self.apply_event(event).await?;
            }
        }
    }

    async fn apply_event(&mut self, event: Event) -> Result<(), RunLoopError> {
        debug!("Applying event: {}", event.event_type);

        match event.event_type.as_str() {
            builtin::SET_LOG_LEVEL => {
                let level = event
                    .payload
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse::<LogLevel>().ok());
                match level {
                    Some(level) => {
                        self.shared.set_log_level(level);
                        if let Some(reload) = &self.level_reload {
                            reload(level);
                        }
                        warn!("Log level changed to {}", level);
                    }
                    None => {
                        warn!(
                            "Ignoring set_log_level event with invalid payload: {:?}",
                            event.payload
                        );
                    }
                }
            }
            builtin::START_REMOTE_DEBUGGER => match self.debug_hook.attach().await {
                Ok(()) => {
                    self.shared.set_debug_active(true);
                    info!("Debug hook attached");
                }
                Err(e) => {
                    warn!("Debugger attach failed, continuing: {}", e);
                }
            },
            builtin::SET_DELAY => {
                self.throttle = event
                    .payload
                    .as_ref()
                    .and_then(|v| v.as_u64())
                    .filter(|ticks| *ticks > 0);
                // Restart the skip count so a shrunk interval cannot leave
                // the counter past the new target.
                self.throttle_count = 0;
                info!("Throttle interval set to {:?}", self.throttle);
            }
            builtin::PAUSE => {
                self.shared.set_paused(true);
                info!("Scheduler paused");
            }
            builtin::RESUME => {
                self.shared.set_paused(false);
                info!("Scheduler resumed");
            }
            _ => {
                self.handlers
                    .dispatch(&event.event_type, event.payload)
                    .await?;
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state())
            .field("throttle", &self.throttle)
            .field("ticks", &self.ticks)
            .finish()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
