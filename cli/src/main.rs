//! depthbook - replay a CSV depth feed and query the resulting order book
//!
//! Run with: cargo run -p depth-cli -- --file orderbooks.csv --symbol BTC/USD \
//!     --until 1700000000 --out-prefix results/run1 --notional-ahead bid 112300

mod args;
mod run;

use anyhow::Error;
use args::Cli;
use clap::Parser;
use depth_feed::{ExportError, FeedError};
use depth_types::BookError;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = match log_filter(cli.log_level.as_deref()) {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(err.exit_code());
        }
    };
    init_logging(filter);

    match run::run(&cli) {
        Ok(report) => {
            for line in report.lines() {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// An explicit `--log-level` must parse; RUST_LOG falls back to `info`
fn log_filter(level: Option<&str>) -> Result<EnvFilter, BookError> {
    match level {
        Some(level) => EnvFilter::try_new(level).map_err(|err| {
            BookError::InvalidArgument(format!("invalid --log-level '{level}': {err}"))
        }),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Logs go to stderr so stdout carries only the report
fn init_logging(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &Error) -> u8 {
    if let Some(err) = err.downcast_ref::<BookError>() {
        err.exit_code()
    } else if let Some(err) = err.downcast_ref::<FeedError>() {
        err.exit_code()
    } else if let Some(err) = err.downcast_ref::<ExportError>() {
        err.exit_code()
    } else {
        1
    }
}
