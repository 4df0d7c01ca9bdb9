//! Command-line interface layer.
//!
//! Kept apart from `core` so transmark can be used as a library.

use std::process::ExitCode;

use anyhow::Result;

pub mod args;
mod commands;
mod exit_status;
mod report;

pub use args::{Arguments, Command, CommonArgs, ExtractCommand};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let status = match args.command {
        Some(Command::Extract(cmd)) => commands::extract::extract(cmd)?,
        Some(Command::Init) => commands::init::init()?,
        None => ExitStatus::Success,
    };
    Ok(status.into())
}
