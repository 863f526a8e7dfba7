//! Pluggable debug-session hook.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Error raised by a failed debug attach. Always recovered by the scheduler:
/// logged, swallowed, loop continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("debug hook attach failed: {0}")]
pub struct DebugHookError(pub String);

/// Capability invoked when a `start_remote_debugger` event is applied.
///
/// There is no built-in remote REPL to attach; embedders that have one (a
/// gdbstub, a scripting console, a diagnostics dump) plug it in here. The
/// default hook is a no-op.
#[async_trait]
pub trait DebugHook: Send + Sync {
    /// Attach a debug session. Best effort: the scheduler ignores failures.
    async fn attach(&self) -> Result<(), DebugHookError>;
}

/// Default hook: nothing to attach. Reports success so control clients
/// polling for an attached session terminate instead of retrying forever.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDebugHook;

#[async_trait]
impl DebugHook for NoopDebugHook {
    async fn attach(&self) -> Result<(), DebugHookError> {
        info!("No debug hook installed; debugger request is a no-op");
        Ok(())
    }
}
