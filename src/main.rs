//! Application entry point.
//!
//! Parses command-line arguments, resolves the layered configuration and
//! delegates execution to [`runner::run`].

use depinfo::{cli, config, runner};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let (cli, matches) = match cli::parse_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    };
    let merged = config::merge_with_config(&cli, &matches);
    let verbose = merged.as_ref().map_or(cli.verbose, |m| m.verbose);
    let max_level = if verbose { Level::DEBUG } else { Level::ERROR };
    fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
    let result = merged
        .map_err(anyhow::Error::from)
        .and_then(|merged| runner::run(&merged));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "runner failed");
            ExitCode::FAILURE
        }
    }
}
