//! Scoped ownership of a running local tunnel.
//!
//! A [`TunnelSession`] stops its tunnel exactly once: through [`TunnelSession::close`]
//! on the normal path, or from `Drop` when the session is abandoned by an
//! early return or a panic.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, TunnelHandle, TunnelLauncher};

pub struct TunnelSession<'a> {
    launcher: &'a dyn TunnelLauncher,
    handle: Option<TunnelHandle>,
}

impl<'a> TunnelSession<'a> {
    /// Start the tunnel and take ownership of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the tunnel does not start.
    pub fn open(launcher: &'a dyn TunnelLauncher, reporter: &impl ProgressReporter) -> Result<Self> {
        reporter.step("starting BrowserStack Local...");
        let handle = launcher.start()?;
        match handle.pid {
            Some(pid) => reporter.success(&format!("BrowserStack Local running (pid {pid})")),
            None => reporter.success("BrowserStack Local running"),
        }
        Ok(Self {
            launcher,
            handle: Some(handle),
        })
    }

    /// Stop the tunnel and report any failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the stop command fails.
    pub fn close(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.launcher.stop(&handle),
            None => Ok(()),
        }
    }
}

impl Drop for TunnelSession<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!(pid = ?handle.pid, "stopping BrowserStack Local on early exit");
            if let Err(e) = self.launcher.stop(&handle) {
                tracing::warn!(error = %e, "failed to stop BrowserStack Local");
            }
        }
    }
}
