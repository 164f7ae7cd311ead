//! # Driveline CLI
//!
//! Offline inspection of WebDriver command resolution.
//!
//! ## Usage
//!
//! ```bash
//! # Which dialect and vendor extensions does a session get?
//! driveline flags --capabilities caps.json --requested requested.json
//!
//! # List the commands it resolves to
//! driveline commands --capabilities caps.json --filter Window
//!
//! # Render the request for a call
//! driveline prepare navigateTo --capabilities caps.json \
//!   --args '["https://example.com"]' --session-id 6d9e
//!
//! # Classify a response
//! driveline classify --status 404 --body '{"value":{"error":"no such element"}}'
//! ```

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

use clap::Parser;
use driveline::ClientConfig;

pub use cli::{Cli, Command, SessionArgs};
pub use commands::{Classification, CommandDetail, CommandRow, Report};
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Parse the command line, run the command and print its report.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    cli.init_tracing(&config.log_level)?;

    let format = cli.format;
    let report = commands::execute(cli.command, &config)?;
    println!("{}", output::render(&report, format)?);
    Ok(())
}
