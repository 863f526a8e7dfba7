//! `flywheel run` subcommand.

use std::error::Error;
use std::path::PathBuf;

use flywheel_control::ControlConfig;
use flywheel_daemon::RunnerBuilder;
use flywheel_runloop::{LevelReloadFn, LogLevel, SchedulerConfig};

use crate::heartbeat::HeartbeatWorker;

/// Run the built-in heartbeat worker under the runtime.
pub(crate) async fn run(
    level: LogLevel,
    control_host: String,
    control_port: u16,
    delay: Option<u64>,
    pid_file: Option<PathBuf>,
    reload: Box<LevelReloadFn>,
) -> Result<i32, Box<dyn Error>> {
    let mut builder = RunnerBuilder::new()
        .control(ControlConfig::new(control_host, control_port))
        .scheduler(SchedulerConfig {
            initial_delay: delay,
            ..Default::default()
        })
        .log_level(level)
        .level_reload(reload);
    if let Some(path) = pid_file {
        builder = builder.pid_file(path);
    }
    let runner = builder.build()?;

    let mut worker = HeartbeatWorker::new();
    let code = runner.run(&mut worker).await?;
    Ok(code)
}
