//! JSON output helpers.
//!
//! Provides the summary renderer and the error-object formatter used by all
//! `--json` code paths when a run fails.

use anyhow::{Context, Result};

use crate::domain::{ConfigError, InputError, RunError, RunSummary, TunnelError};

/// Renders domain types as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Render the final run summary.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_summary(&self, summary: &RunSummary) -> Result<()> {
        println!("{}", format_summary(summary)?);
        Ok(())
    }
}

/// Serialize a run summary.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_summary(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Machine-readable code for the first typed error in the chain.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.is::<InputError>() || cause.is::<ConfigError>() {
            return "invalid_input";
        }
        if cause.is::<TunnelError>() {
            return "tunnel";
        }
        if let Some(run) = cause.downcast_ref::<RunError>() {
            return match run {
                RunError::Transport { .. }
                | RunError::HttpStatus { .. }
                | RunError::MissingField { .. } => "http",
                RunError::BuildFailed { .. } => "build_failed",
                RunError::Timeout { .. } => "timeout",
            };
        }
    }
    "other"
}
