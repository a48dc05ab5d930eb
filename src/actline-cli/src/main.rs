//! actline - main entry point.
//!
//! Completes, validates and runs input lines against a command tree loaded
//! from a TOML file.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use actline_cli::cli::args::LOG_LEVEL_ENV;
use actline_cli::cli::{Cli, dispatch_command};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let log_level = cli.effective_log_level(env_level.as_deref());

    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_filter_str())
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    let outcome = dispatch_command(cli.command, &mut stdout)?;
    Ok(outcome.into())
}
