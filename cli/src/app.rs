//! Application context — unified state passed to the command handler.
//!
//! `AppContext` bundles the output context, the rendering mode, and the
//! fully-resolved runner configuration (defaults → YAML file → CLI flags).

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::{ConfigOverrides, RunnerConfig};
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, OutputMode, Renderer};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Values that override the config file.
    pub overrides: ConfigOverrides,
}

/// Unified application context passed to the command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Validated runner configuration.
    pub config: RunnerConfig,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// JSON mode implies quiet human output so stdout carries only JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or a value is invalid.
    pub fn new(flags: AppFlags, store: &impl ConfigStore) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let quiet = flags.output.quiet || mode == OutputMode::Json;

        if let Some(path) = store.path() {
            tracing::debug!(path = %path.display(), "config file location");
        }
        let config = store.load()?.with_overrides(flags.overrides);
        config.validate()?;

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            config,
        })
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }
}
