//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::Value;

use crate::domain::RunnerConfig;

// ── Value Types ───────────────────────────────────────────────────────────────

/// HTTP status and parsed body of a vendor API call.
///
/// Bodies that are not valid JSON are kept as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// String value of a top-level body field, if present.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.body.get(field).and_then(Value::as_str)
    }
}

/// Whether a non-2xx status is turned into an error by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOnError {
    Yes,
    /// Return the raw status and body for the caller to inspect.
    No,
}

/// A running BrowserStack Local daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelHandle {
    pub pid: Option<u32>,
}

// ── Vendor API Port ───────────────────────────────────────────────────────────

/// Authenticated transport to the vendor REST API.
///
/// Implementations retry connection-level failures and never retry on an
/// HTTP status.
pub trait VendorApi {
    /// Upload a local file as multipart form field `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, the request fails, or
    /// the status is non-2xx while `fail` is [`FailOnError::Yes`].
    fn post_file(&self, url: &str, path: &Path, fail: FailOnError) -> Result<ApiResponse>;
    /// POST a JSON body.
    fn post_json(&self, url: &str, body: &Value, fail: FailOnError) -> Result<ApiResponse>;
    /// GET a resource.
    fn get(&self, url: &str, fail: FailOnError) -> Result<ApiResponse>;
}

// ── Clock Port ────────────────────────────────────────────────────────────────

/// Abstracts wall-clock time so polling can be tested without sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    fn run_with_timeout(&self, program: &str, args: &[&str], timeout: Duration) -> Result<Output>;
}

// ── Tunnel Port ───────────────────────────────────────────────────────────────

/// Starts and stops the local network relay used by `browserstack.local`.
pub trait TunnelLauncher {
    /// Start the relay and wait until it reports connected.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be started or does not connect.
    fn start(&self) -> Result<TunnelHandle>;
    /// Stop a relay previously returned by `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stop command fails.
    fn stop(&self, handle: &TunnelHandle) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a transient status line, e.g. each poll result.
    fn status(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading runner configuration.
pub trait ConfigStore {
    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    fn load(&self) -> Result<RunnerConfig>;
    /// Path of the file that `load` reads, if one can be determined.
    fn path(&self) -> Option<PathBuf>;
}
