//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::RunSummary;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the outcome of a passed build.
    ///
    /// The dashboard URL is printed even in quiet mode so CI logs always
    /// link to the run.
    pub fn render_summary(&self, summary: &RunSummary) {
        if !self.ctx.quiet {
            println!();
            self.ctx.header("Build passed");
            self.ctx.kv("Build:   ", &summary.build_id);
            self.ctx.kv("Devices: ", &summary.devices.join(", "));
            self.ctx.kv("Polls:   ", &summary.polls.to_string());
            self.ctx.kv("Elapsed: ", &format_elapsed(summary.elapsed_secs));
            if summary.local {
                self.ctx.kv("Tunnel:  ", "BrowserStack Local");
            }
        }
        println!(
            "Browserstack xcui build: {} finished successfully",
            summary.dashboard_url.style(self.ctx.styles.link)
        );
    }
}

/// Format seconds as `1h 02m 03s`, `4m 05s` or `6s`.
#[must_use]
pub fn format_elapsed(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
