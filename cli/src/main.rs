//! xcui-runner - run XCUITest suites on BrowserStack App Automate from CI

use clap::Parser;

use xcui_runner_cli::cli::Cli;
use xcui_runner_cli::output::json::{error_code, format_error};

fn main() {
    let cli = Cli::parse();
    xcui_runner_cli::logging::init(cli.verbose);
    let json = cli.json;

    if let Err(e) = cli.run() {
        let message = format!("{e:#}");
        match json.then(|| format_error(&message, error_code(&e))) {
            Some(Ok(obj)) => println!("{obj}"),
            _ => eprintln!("Error: {message}"),
        }
        std::process::exit(1);
    }
}
