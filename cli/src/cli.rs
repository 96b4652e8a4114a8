//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap::builder::FalseyValueParser;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::infra::config::{CONFIG_ENV, YamlConfigStore};

/// Run XCUITest suites on BrowserStack App Automate devices
#[derive(Parser, Debug)]
#[command(name = "xcui-runner", version)]
pub struct Cli {
    #[command(flatten)]
    pub run: commands::run::RunArgs,

    /// Print the run summary (or error) as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Log requests and responses to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// YAML config file [default: ~/.xcui-runner/config.yaml]
    #[arg(long, env = CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Execute the build run.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the run fails.
    pub fn run(self) -> Result<()> {
        let Cli {
            run,
            json,
            quiet,
            no_color,
            config,
            ..
        } = self;
        let store = YamlConfigStore::new(config);
        let app = AppContext::new(
            AppFlags {
                output: OutputFlags {
                    no_color,
                    quiet,
                    json,
                },
                overrides: run.overrides(),
            },
            &store,
        )?;
        commands::run::run(&app, &run)
    }
}
