//! Application service — build trigger and status polling.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Time is read through the [`Clock`] port so the poll loop is testable.

use anyhow::Result;
use serde_json::Value;

use crate::application::ports::{Clock, FailOnError, ProgressReporter, VendorApi};
use crate::domain::{BuildJob, BuildRequest, BuildStatus, RunError, RunnerConfig};

/// Outcome of a poll loop that reached `passed`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// Body of the final status response.
    pub body: Value,
    /// Number of status reads performed.
    pub polls: u32,
    /// Wall-clock seconds spent polling.
    pub elapsed_secs: u64,
}

/// Start a build and return the job created by the vendor.
///
/// # Errors
///
/// Returns an error if the request fails or the response has no `build_id`.
pub fn trigger_build(
    api: &impl VendorApi,
    config: &RunnerConfig,
    request: &BuildRequest,
) -> Result<BuildJob> {
    let url = config.build_url();
    let response = api.post_json(&url, &request.payload(), FailOnError::Yes)?;
    let build_id = response
        .str_field("build_id")
        .ok_or(RunError::MissingField {
            url,
            field: "build_id",
        })?;
    Ok(BuildJob::new(build_id.to_owned(), &config.dashboard_url))
}

/// Poll a build until it passes, fails, or the configured ceiling elapses.
///
/// Each iteration reads the status, checks terminal states, then checks the
/// timeout, then sleeps the fixed poll interval.
///
/// # Errors
///
/// Returns [`RunError::BuildFailed`] on `failed`/`error`,
/// [`RunError::Timeout`] when the ceiling is exceeded, or any request error.
pub fn wait_for_build(
    api: &impl VendorApi,
    clock: &impl Clock,
    reporter: &impl ProgressReporter,
    config: &RunnerConfig,
    job: &mut BuildJob,
) -> Result<PollOutcome> {
    let url = config.build_status_url(&job.id);
    let start = clock.now();
    let mut polls = 0u32;

    loop {
        let response = api.get(&url, FailOnError::Yes)?;
        polls += 1;
        let raw = response.str_field("status").ok_or_else(|| RunError::MissingField {
            url: url.clone(),
            field: "status",
        })?;
        let status = BuildStatus::parse(raw);
        reporter.status(&format!("XCUI build: {} status: {status}", job.id));

        let previous = job.status.clone();
        if job.observe(status) {
            tracing::warn!(
                build_id = %job.id,
                from = %previous,
                to = %job.status,
                "build status went backwards"
            );
            reporter.warn(&format!(
                "XCUI build: {} status went from {previous} back to {}",
                job.id, job.status
            ));
        }

        let elapsed = clock.now().saturating_duration_since(start);
        if job.status.is_failure() {
            return Err(RunError::BuildFailed {
                build_id: job.id.clone(),
                status: job.status.to_string(),
            }
            .into());
        }
        if job.status.is_success() {
            return Ok(PollOutcome {
                body: response.body,
                polls,
                elapsed_secs: elapsed.as_secs(),
            });
        }

        if elapsed > config.timeout() {
            return Err(RunError::Timeout {
                build_id: job.id.clone(),
                seconds: config.timeout_secs,
            }
            .into());
        }

        clock.sleep(config.poll_interval());
    }
}
