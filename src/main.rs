//! Flywheel - runtime skeleton for long-running, remotely controllable
//! worker processes.
//!
//! Main entry point for the Flywheel CLI: `run` drives the built-in
//! heartbeat worker under the runtime, `control` is the one-shot client.

mod cli;
mod cmd_control;
mod cmd_run;
mod heartbeat;

use std::error::Error;
use std::path::Path;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use flywheel_daemon::{Detach, DetachOptions, detach};
use flywheel_runloop::{LevelReloadFn, LogLevel};

use crate::cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            daemon,
            log_level,
            log_file,
            control_host,
            control_port,
            delay,
            pid_file,
        } => {
            let level: LogLevel = log_level.parse()?;

            // Fork before any runtime or subscriber exists; tokio worker
            // threads do not survive into a forked child.
            if daemon {
                match detach(&DetachOptions::default())? {
                    Detach::Parent { child } => {
                        println!("flywheel running in background (PID {})", child);
                        return Ok(());
                    }
                    Detach::Child => {}
                }
            }

            let reload = init_tracing(level, log_file.as_deref())?;

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let code = runtime.block_on(cmd_run::run(
                level,
                control_host,
                control_port,
                delay,
                pid_file,
                reload,
            ))?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }

        Commands::Control {
            host,
            port,
            operation,
            args,
        } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(cmd_control::control(host, port, operation, args))
        }
    }
}

/// Initialize tracing and return the reload callback the scheduler drives
/// when a `set_log_level` event is applied.
///
/// Logs go to stdout by default. With `--log-file` they go to a
/// daily-rolling file instead: the given file name becomes the rotation
/// prefix inside its parent directory.
fn init_tracing(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Box<LevelReloadFn>, Box<dyn Error>> {
    // RUST_LOG wins over --log-level for the initial filter, same as any
    // other tracing-subscriber binary.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let (filter, handle) = reload::Layer::new(filter);

    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let prefix = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "flywheel.log".to_string());

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(prefix)
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            // Keep the writer guard alive for the life of the process.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            registry
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
        }
        None => {
            registry
                .with(fmt::layer().with_target(true).with_ansi(true))
                .init();
        }
    }

    Ok(Box::new(move |level: LogLevel| {
        let _ = handle.reload(EnvFilter::new(level.as_str()));
    }))
}
