//! Run command — upload artifacts, start the XCUI build, and wait for it.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::TunnelLauncher;
use crate::application::services::run::{RunOptions, RunPorts, run_build};
use crate::domain::{ConfigOverrides, Credentials, InputError, RunnerConfig, parse_devices};
use crate::infra::clock::SystemClock;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::http::BrowserStackClient;
use crate::infra::tunnel::{BrowserStackLocal, LocalOptions};
use crate::output::TerminalReporter;

/// Arguments for a build run.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Devices to run on, comma separated (e.g. "iPhone 12-14, iPad Air 4-14")
    #[arg(long, value_name = "DEVICES")]
    pub device: String,

    /// BrowserStack user name
    #[arg(long, env = "BROWSERSTACK_USERNAME", hide_env_values = true)]
    pub user: String,

    /// BrowserStack access key
    #[arg(long, env = "BROWSERSTACK_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,

    /// Application package to test (.ipa)
    #[arg(long, value_name = "PATH")]
    pub app_file: PathBuf,

    /// XCUITest runner bundle (.zip)
    #[arg(long, value_name = "PATH")]
    pub tests_file: PathBuf,

    /// BrowserStack Local key; starts a tunnel for the duration of the build
    #[arg(long, env = "BROWSERSTACK_LOCAL_KEY", hide_env_values = true)]
    pub local_key: Option<String>,

    /// Identifier for the BrowserStack Local tunnel
    #[arg(long, requires = "local_key")]
    pub local_identifier: Option<String>,

    /// Path to the BrowserStack Local binary
    #[arg(long, env = "BROWSERSTACK_LOCAL_BINARY", value_name = "PATH")]
    pub local_binary: Option<String>,

    /// Give up polling after this many seconds [default: 3600]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seconds between status polls [default: 15]
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,
}

impl RunArgs {
    /// Config values given on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            timeout_secs: self.timeout,
            poll_interval_secs: self.poll_interval,
            local_binary: self.local_binary.clone(),
        }
    }
}

/// Inputs checked before any request is sent.
#[derive(Debug)]
pub struct ValidatedRun {
    pub credentials: Credentials,
    pub options: RunOptions,
    pub local_key: Option<String>,
}

fn check_file(what: &'static str, path: &Path) -> Result<(), InputError> {
    if path.as_os_str().is_empty() {
        return Err(InputError::EmptyPath { what });
    }
    if !path.is_file() {
        return Err(InputError::FileNotFound {
            what,
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Validate parameters: devices, credentials, and both artifact files.
///
/// # Errors
///
/// Returns the first [`InputError`] found.
pub fn validate(args: &RunArgs) -> Result<ValidatedRun, InputError> {
    let devices = parse_devices(&args.device)?;
    let credentials = Credentials::new(&args.user, &args.access_key)?;
    check_file("APP", &args.app_file)?;
    check_file("Tests", &args.tests_file)?;
    let local_key = match args.local_key.as_deref() {
        Some(key) if key.trim().is_empty() => {
            return Err(InputError::EmptyCredential("BrowserStack Local key"));
        }
        key => key.map(str::to_owned),
    };
    Ok(ValidatedRun {
        credentials,
        options: RunOptions {
            devices,
            app_file: args.app_file.clone(),
            tests_file: args.tests_file.clone(),
            local_identifier: args.local_identifier.clone(),
        },
        local_key,
    })
}

fn local_tunnel(config: &RunnerConfig, key: String, identifier: Option<String>) -> BrowserStackLocal<TokioCommandRunner> {
    BrowserStackLocal::new(
        TokioCommandRunner::default(),
        LocalOptions {
            binary: config.local_binary.clone(),
            key,
            identifier,
            log_file: LocalOptions::default_log_file(),
            start_timeout: config.local_start_timeout(),
        },
    )
}

/// Entry point for a build run.
///
/// # Errors
///
/// Returns an error if validation, upload, tunnel, trigger, or polling fails.
pub fn run(app: &AppContext, args: &RunArgs) -> Result<()> {
    let ctx = &app.output;
    ctx.header("Browserstack XCUI build");
    ctx.kv("browserstack-device:", &args.device);
    ctx.kv("app-file:           ", &args.app_file.display().to_string());
    ctx.kv("tests-file:         ", &args.tests_file.display().to_string());

    let ValidatedRun {
        credentials,
        options,
        local_key,
    } = validate(args)?;

    let client = BrowserStackClient::new(credentials, app.config.http.clone())?;
    let tunnel =
        local_key.map(|key| local_tunnel(&app.config, key, options.local_identifier.clone()));
    let reporter = TerminalReporter::new(ctx);

    let ports = RunPorts {
        api: &client,
        clock: &SystemClock,
        reporter: &reporter,
        tunnel: tunnel.as_ref().map(|t| t as &dyn TunnelLauncher),
    };
    let summary = run_build(&ports, &app.config, &options)?;
    drop(reporter);

    app.renderer().render_summary(&summary)
}
