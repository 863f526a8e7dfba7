//! CLI definitions for Flywheel.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flywheel CLI.
#[derive(Parser)]
#[command(name = "flywheel")]
#[command(about = "Runtime skeleton for long-running, remotely controllable workers")]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the built-in heartbeat worker under the runtime
    Run {
        /// Fork and run in the background
        #[arg(short, long)]
        daemon: bool,

        /// Log level: trace, debug, info, warn, or error
        #[arg(long, default_value = "info")]
        log_level: String,

        /// File to log to; logs to stdout by default (daily rotation)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Host for the control listener
        #[arg(long, default_value = "localhost")]
        control_host: String,

        /// Port for the control listener
        #[arg(long, default_value_t = 7249)]
        control_port: u16,

        /// Initial throttle: ticks to skip between iterations
        #[arg(long)]
        delay: Option<u64>,

        /// PID file path (prevents duplicate instances)
        #[arg(long)]
        pid_file: Option<PathBuf>,
    },

    /// Send one operation to a running instance
    Control {
        /// Host of the control listener to connect to
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Port of the control listener to connect to
        #[arg(short, long, default_value_t = 7249)]
        port: u16,

        /// Operation name (stats, pause, resume, paused, log-level,
        /// set-log-level, set-delay, start-debugger, event, quit)
        operation: String,

        /// Positional operation arguments
        args: Vec<String>,
    },
}
