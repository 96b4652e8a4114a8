//! Domain types and validators for runner configuration.
//!
//! Pure functions only — no I/O, no filesystem access.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::{ConfigError, InputError};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "https://api-cloud.browserstack.com/app-automate";
pub const DEFAULT_DASHBOARD_URL: &str = "https://app-automate.browserstack.com/dashboard/v2/builds";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60 * 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_LOCAL_BINARY: &str = "BrowserStackLocal";
pub const DEFAULT_LOCAL_START_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_FACTOR_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

// ── Config schema ────────────────────────────────────────────────────────────

/// Runner configuration, optionally loaded from `~/.xcui-runner/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Base URL of the App Automate REST API.
    pub api_url: String,
    /// Base URL of the build dashboard; the build id is appended.
    pub dashboard_url: String,
    /// Wall-clock ceiling for polling a build.
    pub timeout_secs: u64,
    /// Fixed sleep between status polls.
    pub poll_interval_secs: u64,
    /// BrowserStack Local binary name or path.
    pub local_binary: String,
    /// How long to wait for the local tunnel to report `connected`.
    pub local_start_timeout_secs: u64,
    /// HTTP client policy.
    pub http: HttpConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            local_binary: DEFAULT_LOCAL_BINARY.to_string(),
            local_start_timeout_secs: DEFAULT_LOCAL_START_TIMEOUT_SECS,
            http: HttpConfig::default(),
        }
    }
}

/// HTTP retry and timeout policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Retries after a connection-level failure. HTTP statuses are never retried.
    pub connect_retries: u32,
    /// Backoff factor; the n-th retry waits `factor * 2^(n-1)`.
    pub backoff_factor_ms: u64,
    /// Total timeout for a single request, uploads included.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_retries: DEFAULT_CONNECT_RETRIES,
            backoff_factor_ms: DEFAULT_BACKOFF_FACTOR_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_factor_ms.saturating_mul(1_u64 << exp))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub local_binary: Option<String>,
}

impl RunnerConfig {
    /// Apply command-line overrides on top of file/default values.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(t) = overrides.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(p) = overrides.poll_interval_secs {
            self.poll_interval_secs = p;
        }
        if let Some(b) = overrides.local_binary {
            self.local_binary = b;
        }
        self
    }

    /// Validates all values.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("api_url", &self.api_url)?;
        validate_url("dashboard_url", &self.dashboard_url)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroValue { key: "timeout_secs" });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroValue {
                key: "poll_interval_secs",
            });
        }
        if self.local_start_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue {
                key: "local_start_timeout_secs",
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue {
                key: "http.request_timeout_secs",
            });
        }
        if self.local_binary.trim().is_empty() {
            return Err(ConfigError::Empty { key: "local_binary" });
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn local_start_timeout(&self) -> Duration {
        Duration::from_secs(self.local_start_timeout_secs)
    }

    /// Join a path suffix onto the API base URL.
    #[must_use]
    pub fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.api_url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn build_url(&self) -> String {
        self.endpoint("xcuitest/v2/build")
    }

    #[must_use]
    pub fn build_status_url(&self, build_id: &str) -> String {
        self.endpoint(&format!("xcuitest/v2/builds/{build_id}"))
    }
}

fn validate_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
        })
    }
}

// ── Credentials ──────────────────────────────────────────────────────────────

/// Basic-auth credential pair for the vendor API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub access_key: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns an error if either half is blank.
    pub fn new(user: &str, access_key: &str) -> Result<Self, InputError> {
        if user.trim().is_empty() {
            return Err(InputError::EmptyCredential("BrowserStack user"));
        }
        if access_key.trim().is_empty() {
            return Err(InputError::EmptyCredential("BrowserStack access key"));
        }
        Ok(Self {
            user: user.to_string(),
            access_key: access_key.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("access_key", &"***")
            .finish()
    }
}
