//! Application service — the end-to-end build run.
//!
//! Upload → (tunnel start) → trigger → poll → (tunnel stop) → summary.
//! The tunnel, when requested, is owned by a [`TunnelSession`] so it is
//! stopped on every exit path.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::{Clock, ProgressReporter, TunnelLauncher, VendorApi};
use crate::application::services::artifacts::upload_artifacts;
use crate::application::services::build::{trigger_build, wait_for_build};
use crate::application::services::tunnel::TunnelSession;
use crate::domain::{BuildRequest, RunSummary, RunnerConfig};

/// Validated inputs for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub devices: Vec<String>,
    pub app_file: PathBuf,
    pub tests_file: PathBuf,
    /// Identifier forwarded as `browserstack.localIdentifier` when tunnelling.
    pub local_identifier: Option<String>,
}

/// Injected collaborators for [`run_build`].
pub struct RunPorts<'a, A: VendorApi, C: Clock, R: ProgressReporter> {
    pub api: &'a A,
    pub clock: &'a C,
    pub reporter: &'a R,
    /// `Some` when a tunnel credential was supplied.
    pub tunnel: Option<&'a dyn TunnelLauncher>,
}

/// Run one XCUI build from upload to terminal status.
///
/// # Errors
///
/// Returns the first failure: upload, tunnel start, trigger, build failure,
/// or timeout. A tunnel stop failure is returned only when the build itself
/// succeeded; otherwise it is logged and the build error wins.
pub fn run_build<A: VendorApi, C: Clock, R: ProgressReporter>(
    ports: &RunPorts<'_, A, C, R>,
    config: &RunnerConfig,
    opts: &RunOptions,
) -> Result<RunSummary> {
    let RunPorts {
        api,
        clock,
        reporter,
        tunnel,
    } = *ports;

    let (app, tests) = upload_artifacts(api, config, reporter, &opts.app_file, &opts.tests_file)?;

    let mut request = BuildRequest::new(opts.devices.clone(), app.url, tests.url);
    let session = match tunnel {
        Some(launcher) => {
            request = request.with_local(opts.local_identifier.clone());
            Some(TunnelSession::open(launcher, reporter)?)
        }
        None => None,
    };

    reporter.step(&format!(
        "triggering build on {}...",
        request.devices.join(", ")
    ));
    let outcome = trigger_build(api, config, &request).and_then(|mut job| {
        reporter.step(&format!("waiting for xcui build: {} to finish...", job.dashboard_url));
        let polled = wait_for_build(api, clock, reporter, config, &mut job)?;
        Ok((job, polled))
    });

    let stopped = match session {
        Some(session) => {
            reporter.step("stopping BrowserStack Local...");
            session.close()
        }
        None => Ok(()),
    };

    let (job, polled) = match (outcome, stopped) {
        (Ok(done), Ok(())) => done,
        (Ok(_), Err(stop_err)) => return Err(stop_err.context("stopping BrowserStack Local")),
        (Err(run_err), Ok(())) => return Err(run_err),
        (Err(run_err), Err(stop_err)) => {
            tracing::warn!(error = %stop_err, "failed to stop BrowserStack Local");
            reporter.warn(&format!("failed to stop BrowserStack Local: {stop_err:#}"));
            return Err(run_err);
        }
    };

    reporter.success(&format!(
        "xcui build: {} finished successfully",
        job.dashboard_url
    ));

    Ok(RunSummary {
        build_id: job.id,
        dashboard_url: job.dashboard_url,
        status: job.status,
        polls: polled.polls,
        elapsed_secs: polled.elapsed_secs,
        devices: request.devices,
        local: request.local,
    })
}
