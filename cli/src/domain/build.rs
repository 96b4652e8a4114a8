//! Build domain types: artifacts, build requests, statuses, and run summaries.
//!
//! Pure functions only — no I/O, no filesystem access.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::domain::error::InputError;

// ── Artifacts ────────────────────────────────────────────────────────────────

/// The two binaries uploaded before a build can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The application package (`.ipa`).
    App,
    /// The XCUITest runner bundle (`.zip`).
    TestSuite,
}

impl ArtifactKind {
    /// Path suffix of the upload endpoint, relative to the API base URL.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::App => "xcuitest/v2/app",
            Self::TestSuite => "xcuitest/v2/test-suite",
        }
    }

    /// Response field holding the vendor-issued artifact URL.
    #[must_use]
    pub fn url_field(self) -> &'static str {
        match self {
            Self::App => "app_url",
            Self::TestSuite => "test_suite_url",
        }
    }
}

/// Artifact URL returned by the vendor for a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub kind: ArtifactKind,
    pub local_path: PathBuf,
    pub url: String,
}

// ── Devices ──────────────────────────────────────────────────────────────────

/// Parse the `--device` value into a device list.
///
/// Entries are separated by commas and trimmed. Spaces inside a name are
/// kept, so `"iPhone 12-14, iPad Air 4-14"` yields two devices.
///
/// # Errors
///
/// Returns [`InputError::NoDevices`] if no non-empty entry remains.
pub fn parse_devices(raw: &str) -> Result<Vec<String>, InputError> {
    let devices: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
        .collect();
    if devices.is_empty() {
        return Err(InputError::NoDevices);
    }
    Ok(devices)
}

// ── Build request ────────────────────────────────────────────────────────────

/// Everything the vendor needs to start one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub devices: Vec<String>,
    pub app_url: String,
    pub test_suite_url: String,
    pub device_logs: bool,
    pub coverage: bool,
    /// Set when a BrowserStack Local tunnel is running for this build.
    pub local: bool,
    pub local_identifier: Option<String>,
}

impl BuildRequest {
    /// Request with the default capability flags (device logs and coverage on).
    #[must_use]
    pub fn new(devices: Vec<String>, app_url: String, test_suite_url: String) -> Self {
        Self {
            devices,
            app_url,
            test_suite_url,
            device_logs: true,
            coverage: true,
            local: false,
            local_identifier: None,
        }
    }

    /// Mark the request as routed through a local tunnel.
    #[must_use]
    pub fn with_local(mut self, identifier: Option<String>) -> Self {
        self.local = true;
        self.local_identifier = identifier;
        self
    }

    /// JSON body for `POST xcuitest/v2/build`.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut payload = json!({
            "devices": self.devices,
            "app": self.app_url,
            "deviceLogs": self.device_logs,
            "testSuite": self.test_suite_url,
            "coverage": self.coverage,
        });
        if self.local {
            payload["browserstack.local"] = json!("true");
            if let Some(id) = &self.local_identifier {
                payload["browserstack.localIdentifier"] = json!(id);
            }
        }
        payload
    }
}

// ── Build status ─────────────────────────────────────────────────────────────

/// Status of a remote build as reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Queued,
    Running,
    Passed,
    Failed,
    Error,
    /// Any value outside the known vocabulary. Never terminal.
    Other(String),
}

impl BuildStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => Self::Queued,
            "running" => Self::Running,
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "error" => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed)
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_failure()
    }

    /// Position on the path to a terminal state. Unknown values have none.
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Queued => Some(0),
            Self::Running => Some(1),
            Self::Passed | Self::Failed | Self::Error => Some(2),
            Self::Other(_) => None,
        }
    }

    /// Returns `true` if moving from `previous` to `self` goes backwards.
    #[must_use]
    pub fn regresses_from(&self, previous: &Self) -> bool {
        match (previous.rank(), self.rank()) {
            (Some(prev), Some(next)) => next < prev || (previous.is_terminal() && previous != self),
            _ => false,
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BuildStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── Build job ────────────────────────────────────────────────────────────────

/// One remote test execution, created by the trigger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    pub id: String,
    pub status: BuildStatus,
    pub dashboard_url: String,
}

impl BuildJob {
    /// New job in the `queued` state; `dashboard_base` has no trailing slash.
    #[must_use]
    pub fn new(id: String, dashboard_base: &str) -> Self {
        let dashboard_url = format!("{}/{id}", dashboard_base.trim_end_matches('/'));
        Self {
            id,
            status: BuildStatus::Queued,
            dashboard_url,
        }
    }

    /// Record a freshly polled status.
    ///
    /// Returns `true` when the new status regresses from the previous one.
    pub fn observe(&mut self, status: BuildStatus) -> bool {
        let regressed = status.regresses_from(&self.status);
        self.status = status;
        regressed
    }
}

// ── Run summary ──────────────────────────────────────────────────────────────

/// Final outcome of a successful run, rendered by the output layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub build_id: String,
    pub dashboard_url: String,
    pub status: BuildStatus,
    pub polls: u32,
    pub elapsed_secs: u64,
    pub devices: Vec<String>,
    pub local: bool,
}
