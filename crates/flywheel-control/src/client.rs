//! One-shot control client.
//!
//! Connects to a running instance, issues a single named operation with
//! positional arguments, and returns the JSON response. The `start_debugger`
//! operation gets special treatment at the call site: after the remote call
//! succeeds, the caller polls [`ControlClient::wait_for_debugger`] until the
//! hook reports an attached session.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::error::ControlError;
use crate::protocol::DebuggerStatusResponse;

/// A parsed control operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlRequest {
    GetLogLevel,
    SetLogLevel(String),
    StartDebugger,
    Quit,
    SetDelay(u64),
    Pause,
    Resume,
    GetPaused,
    GetStats,
    Custom {
        event_type: String,
        payload: Option<serde_json::Value>,
    },
}

impl ControlRequest {
    /// Map a CLI operation name plus positional arguments to a request.
    /// Accepts kebab-case and snake_case names.
    pub fn parse(operation: &str, args: &[String]) -> Result<Self, ControlError> {
        let no_args = |request: ControlRequest| {
            if args.is_empty() {
                Ok(request)
            } else {
                Err(ControlError::BadArguments {
                    operation: operation.to_string(),
                    expected: "no arguments",
                })
            }
        };

        match operation.replace('-', "_").as_str() {
            "log_level" | "get_log_level" => no_args(ControlRequest::GetLogLevel),
            "set_log_level" => match args {
                [level] => Ok(ControlRequest::SetLogLevel(level.clone())),
                _ => Err(ControlError::BadArguments {
                    operation: operation.to_string(),
                    expected: "one level argument (trace, debug, info, warn, or error)",
                }),
            },
            "start_debugger" => no_args(ControlRequest::StartDebugger),
            "stop" | "quit" => no_args(ControlRequest::Quit),
            "set_delay" => match args {
                [ticks] => {
                    let ticks = ticks.parse().map_err(|_| ControlError::BadArguments {
                        operation: operation.to_string(),
                        expected: "one non-negative integer argument",
                    })?;
                    Ok(ControlRequest::SetDelay(ticks))
                }
                _ => Err(ControlError::BadArguments {
                    operation: operation.to_string(),
                    expected: "one non-negative integer argument",
                }),
            },
            "pause" => no_args(ControlRequest::Pause),
            "resume" => no_args(ControlRequest::Resume),
            "paused" | "is_paused" => no_args(ControlRequest::GetPaused),
            "stats" => no_args(ControlRequest::GetStats),
            "event" => match args {
                [event_type] => Ok(ControlRequest::Custom {
                    event_type: event_type.clone(),
                    payload: None,
                }),
                [event_type, payload] => {
                    let payload =
                        serde_json::from_str(payload).map_err(|_| ControlError::BadArguments {
                            operation: operation.to_string(),
                            expected: "an event type and an optional JSON payload",
                        })?;
                    Ok(ControlRequest::Custom {
                        event_type: event_type.clone(),
                        payload: Some(payload),
                    })
                }
                _ => Err(ControlError::BadArguments {
                    operation: operation.to_string(),
                    expected: "an event type and an optional JSON payload",
                }),
            },
            _ => Err(ControlError::UnknownOperation(operation.to_string())),
        }
    }
}

/// HTTP client issuing single control operations against a running instance.
#[derive(Debug, Clone)]
pub struct ControlClient {
    base_url: String,
    http: reqwest::Client,
}

impl ControlClient {
    /// Create a client for the control listener at `host:port`.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{}:{}", host, port),
            http: reqwest::Client::new(),
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue one operation and return the response body.
    pub async fn call(&self, request: &ControlRequest) -> Result<serde_json::Value, ControlError> {
        let (url, response) = match request {
            ControlRequest::GetLogLevel => self.get("/v1/control/log-level").await?,
            ControlRequest::SetLogLevel(level) => {
                self.post("/v1/control/log-level", Some(json!({ "level": level })))
                    .await?
            }
            ControlRequest::StartDebugger => self.post("/v1/control/debugger", None).await?,
            ControlRequest::Quit => self.post("/v1/control/quit", None).await?,
            ControlRequest::SetDelay(ticks) => {
                self.post("/v1/control/delay", Some(json!({ "ticks": ticks })))
                    .await?
            }
            ControlRequest::Pause => self.post("/v1/control/pause", None).await?,
            ControlRequest::Resume => self.post("/v1/control/resume", None).await?,
            ControlRequest::GetPaused => self.get("/v1/control/paused").await?,
            ControlRequest::GetStats => self.get("/v1/control/stats").await?,
            ControlRequest::Custom {
                event_type,
                payload,
            } => {
                let path = format!("/v1/control/event/{}", event_type);
                self.post(&path, payload.clone()).await?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ControlError::CallFailed {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| ControlError::InvalidResponse { url, source })
    }

    /// Direct read of the debugger attach flag.
    pub async fn debugger_active(&self) -> Result<bool, ControlError> {
        let (url, response) = self.get("/v1/control/debugger").await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ControlError::CallFailed {
                status: status.as_u16(),
                body,
            });
        }

        let body: DebuggerStatusResponse = response
            .json()
            .await
            .map_err(|source| ControlError::InvalidResponse { url, source })?;
        Ok(body.active)
    }

    /// Poll the debugger status until the hook reports an attached session.
    /// Retries indefinitely; the caller decides how long to wait.
    pub async fn wait_for_debugger(&self, poll_interval: Duration) -> Result<(), ControlError> {
        loop {
            if self.debugger_active().await? {
                return Ok(());
            }
            debug!("Debug hook not attached yet; retrying");
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn get(&self, path: &str) -> Result<(String, reqwest::Response), ControlError> {
        let url = self.url(path);
        let response =
            self.http
                .get(&url)
                .send()
                .await
                .map_err(|source| ControlError::Request {
                    url: url.clone(),
                    source,
                })?;
        Ok((url, response))
    }

    async fn post(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(String, reqwest::Response), ControlError> {
        let url = self.url(path);
        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .await
            .map_err(|source| ControlError::Request {
                url: url.clone(),
                source,
            })?;
        Ok((url, response))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
