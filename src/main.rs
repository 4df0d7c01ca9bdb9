use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use transmark::cli::{Arguments, ExitStatus};

/// Environment variable holding a `tracing` filter, e.g. `transmark=debug`.
const LOG_ENV: &str = "TRANSMARK_LOG";

fn main() -> ExitCode {
    let args = Arguments::parse();

    let default_level = if args.verbose() { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match transmark::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
