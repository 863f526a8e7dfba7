//! Runtime composition: control transport + scheduler + process plumbing.
//!
//! The [`Runner`] owns startup and shutdown ordering: claim the PID file,
//! start the control server, bridge OS signals, run the worker's setup hook,
//! drive the scheduler, then stop the transport and run teardown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use flywheel_control::{ControlConfig, ControlServer};
use flywheel_runloop::{
    DebugHook, EventQueue, HandlerRegistry, LevelReloadFn, LogLevel, RunLoopError, Scheduler,
    SchedulerConfig, SharedState, Worker,
};

use crate::error::DaemonError;
use crate::pid::PidFile;
use crate::signal::bridge_signals;

/// Runner configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Control transport address.
    pub control: ControlConfig,

    /// Scheduler behavior.
    pub scheduler: SchedulerConfig,

    /// Initial log level.
    pub log_level: LogLevel,

    /// PID file to claim for the life of the process, if any.
    pub pid_file: Option<PathBuf>,

    /// Whether to translate SIGTERM/SIGINT into quit events.
    pub handle_signals: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            scheduler: SchedulerConfig::default(),
            log_level: LogLevel::Info,
            pid_file: None,
            handle_signals: true,
        }
    }
}

/// Builder for a [`Runner`].
#[derive(Default)]
pub struct RunnerBuilder {
    config: RunnerConfig,
    debug_hook: Option<Box<dyn DebugHook>>,
    level_reload: Option<Box<LevelReloadFn>>,
}

impl RunnerBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the control transport address.
    pub fn control(mut self, control: ControlConfig) -> Self {
        self.config.control = control;
        self
    }

    /// Set the scheduler configuration.
    pub fn scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.config.scheduler = scheduler;
        self
    }

    /// Set the initial log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    /// Claim a PID file for the life of the process.
    pub fn pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pid_file = Some(path.into());
        self
    }

    /// Enable or disable OS signal bridging.
    pub fn handle_signals(mut self, enabled: bool) -> Self {
        self.config.handle_signals = enabled;
        self
    }

    /// Install a debug hook.
    pub fn debug_hook(mut self, hook: Box<dyn DebugHook>) -> Self {
        self.debug_hook = Some(hook);
        self
    }

    /// Install the logging reload callback driven by `set_log_level` events.
    pub fn level_reload(mut self, reload: Box<LevelReloadFn>) -> Self {
        self.level_reload = Some(reload);
        self
    }

    /// Validate the configuration and build the runner.
    pub fn build(self) -> Result<Runner, DaemonError> {
        self.config
            .scheduler
            .validate()
            .map_err(DaemonError::Config)?;

        let shared = Arc::new(SharedState::new(self.config.log_level));
        Ok(Runner {
            config: self.config,
            queue: Arc::new(EventQueue::new()),
            shared,
            control_addr: Arc::new(OnceLock::new()),
            debug_hook: self.debug_hook,
            level_reload: self.level_reload,
        })
    }
}

/// A fully wired runtime instance, ready to drive one worker.
pub struct Runner {
    config: RunnerConfig,
    queue: Arc<EventQueue>,
    shared: Arc<SharedState>,
    control_addr: Arc<OnceLock<SocketAddr>>,
    debug_hook: Option<Box<dyn DebugHook>>,
    level_reload: Option<Box<LevelReloadFn>>,
}

impl Runner {
    /// The event queue. Embedders may enqueue events from their own contexts
    /// (timers, other listeners); the control server shares this queue.
    pub fn queue(&self) -> Arc<EventQueue> {
        self.queue.clone()
    }

    /// The shared runtime state.
    pub fn shared(&self) -> Arc<SharedState> {
        self.shared.clone()
    }

    /// Handle resolving to the bound control address once the transport is
    /// up. Useful when port 0 was configured.
    pub fn control_addr(&self) -> Arc<OnceLock<SocketAddr>> {
        self.control_addr.clone()
    }

    /// Drive `worker` to completion and return the process exit code.
    ///
    /// Startup order: PID file, handler registration, control server, signal
    /// bridge, worker setup, scheduler. Shutdown order: control server,
    /// worker teardown, PID file. A fatal loop error is returned after the
    /// transport has been stopped and the PID file released.
    pub async fn run(mut self, worker: &mut dyn Worker) -> Result<i32, DaemonError> {
        let mut pid_file = match self.config.pid_file.take() {
            Some(path) => {
                let mut pid_file = PidFile::new(path);
                pid_file.try_acquire()?;
                Some(pid_file)
            }
            None => None,
        };

        // Fail fast on wiring mistakes before anything is listening.
        let mut handlers = HandlerRegistry::new();
        worker.register_handlers(&mut handlers)?;

        let mut server = ControlServer::new(
            self.config.control.clone(),
            self.queue.clone(),
            self.shared.clone(),
        );
        let start_result = server.start().await;
        if let Err(e) = start_result {
            if let Some(pid_file) = &mut pid_file {
                let _ = pid_file.remove();
            }
            return Err(e.into());
        }
        if let Some(addr) = server.local_addr() {
            let _ = self.control_addr.set(addr);
        }

        if self.config.handle_signals {
            bridge_signals(self.queue.clone())?;
        }

        let mut scheduler = Scheduler::new(
            self.config.scheduler.clone(),
            self.queue.clone(),
            self.shared.clone(),
        )?
        .with_handlers(handlers);
        if let Some(hook) = self.debug_hook.take() {
            scheduler = scheduler.with_debug_hook(hook);
        }
        if let Some(reload) = self.level_reload.take() {
            scheduler = scheduler.with_level_reload(reload);
        }

        let result = match worker.setup().await {
            Ok(()) => {
                let result = scheduler.run(worker).await;

                server.shutdown().await;
                if let Err(e) = worker.teardown().await {
                    warn!("Worker teardown failed: {}", e);
                }

                result.map_err(DaemonError::from)
            }
            Err(e) => {
                // Startup failure: the loop never began, teardown is skipped.
                server.shutdown().await;
                Err(DaemonError::RunLoop(RunLoopError::SetupFailed(e)))
            }
        };

        if let Some(pid_file) = &mut pid_file {
            let _ = pid_file.remove();
        }

        match &result {
            Ok(code) => info!("Runner finished with exit code {}", code),
            Err(e) => warn!("Runner finished with error: {}", e),
        }
        result
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
