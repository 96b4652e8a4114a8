//! Diagnostic logging via `tracing`.
//!
//! User-facing progress goes through `output`; this subscriber only carries
//! warnings and, with `--verbose`, request/response traces. Logs go to stderr.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "xcui_runner_cli=debug"
    } else {
        "xcui_runner_cli=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
