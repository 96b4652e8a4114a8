//! BrowserStack Local relay, driven in daemon mode.
//!
//! `start` runs `<binary> --key K --daemon start --log-file F` and expects a
//! single JSON object on stdout, e.g. `{"state":"connected","pid":1234}`.
//! `stop` runs the same command with `--daemon stop`. A failed `start` is
//! followed by a best-effort `stop` so a half-started relay is not left behind.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::{CommandRunner, TunnelHandle, TunnelLauncher};
use crate::domain::TunnelError;

/// Options for one BrowserStack Local instance.
#[derive(Clone)]
pub struct LocalOptions {
    pub binary: String,
    pub key: String,
    pub identifier: Option<String>,
    pub log_file: PathBuf,
    pub start_timeout: Duration,
}

impl LocalOptions {
    /// Log file in the system temp dir, unique per process.
    #[must_use]
    pub fn default_log_file() -> PathBuf {
        std::env::temp_dir().join(format!("xcui-runner-local-{}.log", std::process::id()))
    }
}

impl std::fmt::Debug for LocalOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalOptions")
            .field("binary", &self.binary)
            .field("key", &"***")
            .field("identifier", &self.identifier)
            .field("log_file", &self.log_file)
            .field("start_timeout", &self.start_timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct DaemonReply {
    state: Option<String>,
    pid: Option<u32>,
    message: Option<Value>,
}

impl DaemonReply {
    /// Vendor message, which is either a plain string or `{"message": "..."}`.
    fn message(&self) -> String {
        match &self.message {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| Value::Object(obj.clone()).to_string(), str::to_owned),
            Some(other) => other.to_string(),
            None => "no message".to_string(),
        }
    }
}

/// Parse the daemon `start` reply.
///
/// # Errors
///
/// Returns [`TunnelError::BadOutput`] for non-JSON output and
/// [`TunnelError::NotConnected`] for any state other than `connected`.
pub fn parse_start_reply(stdout: &str) -> Result<TunnelHandle, TunnelError> {
    let reply: DaemonReply = serde_json::from_str(stdout.trim())
        .map_err(|e| TunnelError::BadOutput(format!("{e}: {}", stdout.trim())))?;
    if reply.state.as_deref() == Some("connected") {
        Ok(TunnelHandle { pid: reply.pid })
    } else {
        Err(TunnelError::NotConnected(reply.message()))
    }
}

pub struct BrowserStackLocal<R: CommandRunner> {
    runner: R,
    options: LocalOptions,
}

impl<R: CommandRunner> BrowserStackLocal<R> {
    #[must_use]
    pub fn new(runner: R, options: LocalOptions) -> Self {
        Self { runner, options }
    }

    /// Arguments for a daemon `action` (`start` or `stop`).
    #[must_use]
    pub fn daemon_args(&self, action: &str) -> Vec<String> {
        let mut args = vec![
            "--key".to_string(),
            self.options.key.clone(),
            "--daemon".to_string(),
            action.to_string(),
        ];
        if action == "start" {
            args.push("--log-file".to_string());
            args.push(self.options.log_file.display().to_string());
        }
        if let Some(id) = &self.options.identifier {
            args.push("--local-identifier".to_string());
            args.push(id.clone());
        }
        args
    }

    fn run_daemon(&self, action: &'static str, timeout: Option<Duration>) -> Result<String> {
        let args = self.daemon_args(action);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = match timeout {
            Some(t) => self.runner.run_with_timeout(&self.options.binary, &argv, t)?,
            None => self.runner.run(&self.options.binary, &argv)?,
        };
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(action, stdout = %stdout.trim(), "BrowserStack Local replied");
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(TunnelError::CommandFailed {
                action,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(stdout)
    }
}

impl<R: CommandRunner> TunnelLauncher for BrowserStackLocal<R> {
    fn start(&self) -> Result<TunnelHandle> {
        let started = self
            .run_daemon("start", Some(self.options.start_timeout))
            .and_then(|stdout| Ok(parse_start_reply(&stdout)?));
        match started {
            Ok(handle) => {
                tracing::info!(pid = ?handle.pid, log_file = %self.options.log_file.display(), "BrowserStack Local connected");
                Ok(handle)
            }
            Err(e) => {
                // A start that timed out or never connected may still have forked the relay.
                if let Err(stop_err) = self.run_daemon("stop", None) {
                    tracing::debug!(error = %stop_err, "cleanup stop after failed start");
                }
                Err(e)
            }
        }
    }

    fn stop(&self, handle: &TunnelHandle) -> Result<()> {
        self.run_daemon("stop", None)?;
        tracing::info!(pid = ?handle.pid, "BrowserStack Local stopped");
        Ok(())
    }
}
