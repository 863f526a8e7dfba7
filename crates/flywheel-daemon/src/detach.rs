//! Background detach.
//!
//! Modeled as a single explicit operation performed once, before the async
//! runtime starts: fork must never happen inside a live tokio runtime, whose
//! worker threads would not survive into the child.

use std::path::PathBuf;

/// Which side of the detach the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detach {
    /// The supervising parent. It should exit immediately; the worker runs
    /// on without it.
    Parent { child: u32 },
    /// The detached worker. It proceeds to run the scheduler.
    Child,
}

/// Options for [`detach`].
#[derive(Debug, Clone, Default)]
pub struct DetachOptions {
    /// Directory to change into after detaching. Stays put when `None`.
    pub work_dir: Option<PathBuf>,
}

/// Detach the process from its controlling terminal (Unix double fork).
///
/// Returns [`Detach::Parent`] in the original process, which should exit,
/// and [`Detach::Child`] in the detached worker, which runs with a new
/// session and its standard streams redirected to `/dev/null`.
#[cfg(unix)]
pub fn detach(options: &DetachOptions) -> Result<Detach, crate::error::DaemonError> {
    use std::os::unix::io::AsRawFd;

    use nix::unistd::{ForkResult, chdir, dup2, fork, setsid};

    use crate::error::DaemonError;

    // First fork: the caller keeps the parent side and exits on its own
    // terms, per the bootstrap contract.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            return Ok(Detach::Parent {
                child: child.as_raw() as u32,
            });
        }
        Ok(ForkResult::Child) => {}
        Err(e) => return Err(DaemonError::DetachFailed(format!("fork failed: {}", e))),
    }

    // New session, away from the controlling terminal.
    setsid().map_err(|e| DaemonError::DetachFailed(format!("setsid failed: {}", e)))?;

    // Second fork so the worker can never reacquire a terminal. The
    // intermediate process is plumbing and exits here.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { .. }) => std::process::exit(0),
        Ok(ForkResult::Child) => {}
        Err(e) => return Err(DaemonError::DetachFailed(format!("fork failed: {}", e))),
    }

    if let Some(ref work_dir) = options.work_dir {
        chdir(work_dir.as_path())
            .map_err(|e| DaemonError::DetachFailed(format!("chdir failed: {}", e)))?;
    }

    // Standard streams point at /dev/null from here on.
    let dev_null = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")
        .map_err(|e| DaemonError::DetachFailed(format!("failed to open /dev/null: {}", e)))?;
    let fd = dev_null.as_raw_fd();
    dup2(fd, 0).map_err(|e| DaemonError::DetachFailed(format!("dup2 stdin failed: {}", e)))?;
    dup2(fd, 1).map_err(|e| DaemonError::DetachFailed(format!("dup2 stdout failed: {}", e)))?;
    dup2(fd, 2).map_err(|e| DaemonError::DetachFailed(format!("dup2 stderr failed: {}", e)))?;

    Ok(Detach::Child)
}

/// Detach is Unix-only; other platforms run in the foreground.
#[cfg(not(unix))]
pub fn detach(_options: &DetachOptions) -> Result<Detach, crate::error::DaemonError> {
    Err(crate::error::DaemonError::DetachUnsupported)
}
