//! # linkml-validator entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and runs
//! the validation.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lmv_cli::validate::{run_validate, ValidateArgs};

/// Validate data files against a LinkML schema.
///
/// Runs the selected plugins over every object in every input file and
/// prints one JSON report per object.
#[derive(Parser, Debug)]
#[command(name = "linkml-validator", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    args: ValidateArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr; stdout carries the JSON reports.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "linkml-validator starting");

    match run_validate(&cli.args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
