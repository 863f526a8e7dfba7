//! PID file management, preventing duplicate daemonized instances.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::DaemonError;

/// PID file manager.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Create a PID file manager for the given path. Nothing is written
    /// until [`try_acquire`](PidFile::try_acquire).
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The PID file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the PID file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the PID recorded in the file, if any.
    pub fn read_pid(&self) -> Result<Option<u32>, DaemonError> {
        if !self.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path).map_err(|e| DaemonError::PidFileRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| DaemonError::PidFileRead {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let pid = contents
            .trim()
            .parse::<u32>()
            .map_err(|e| DaemonError::PidFileRead {
                path: self.path.clone(),
                reason: format!("invalid PID format: {}", e),
            })?;

        Ok(Some(pid))
    }

    /// Claim the PID file for the current process.
    ///
    /// Fails with [`DaemonError::AlreadyRunning`] if the file records a live
    /// process; a stale file (dead PID) is overwritten with a warning.
    pub fn try_acquire(&mut self) -> Result<(), DaemonError> {
        if let Some(pid) = self.read_pid()? {
            if Self::is_process_running(pid) {
                return Err(DaemonError::AlreadyRunning {
                    path: self.path.clone(),
                    pid,
                });
            }
            warn!(
                "Overwriting stale PID file {} (PID {} is not running)",
                self.path.display(),
                pid
            );
        }

        self.write_pid(std::process::id())
    }

    /// Write a PID value to the file.
    pub fn write_pid(&mut self, pid: u32) -> Result<(), DaemonError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DaemonError::PidFileCreation {
                path: self.path.clone(),
                reason: format!("failed to create parent directory: {}", e),
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| DaemonError::PidFileCreation {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        write!(file, "{}", pid).map_err(|e| DaemonError::PidFileCreation {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        info!("PID file created: {} (PID: {})", self.path.display(), pid);
        Ok(())
    }

    /// Remove the PID file. Removing an absent file is not an error.
    pub fn remove(&mut self) -> Result<(), DaemonError> {
        if !self.exists() {
            return Ok(());
        }

        fs::remove_file(&self.path).map_err(|e| DaemonError::PidFileRemoval {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        info!("PID file removed: {}", self.path.display());
        Ok(())
    }

    /// Check whether a process with the given PID is running.
    #[cfg(unix)]
    pub fn is_process_running(pid: u32) -> bool {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        // Signal 0 probes for existence without delivering anything.
        kill(Pid::from_raw(pid as i32), None).is_ok()
    }

    #[cfg(not(unix))]
    pub fn is_process_running(_pid: u32) -> bool {
        // No cheap probe available; assume alive and let the operator decide.
        true
    }
}

#[cfg(test)]
#[path = "pid_tests.rs"]
mod tests;
