//! CLI argument parsing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;

/// driveline - inspect WebDriver command resolution offline
///
/// Classify sessions from their capabilities, list the commands a session
/// resolves to and render requests without talking to a server.
#[derive(Parser, Debug)]
#[command(
    name = "driveline",
    version,
    about = "Inspect WebDriver session classification, command tables and responses",
    long_about = "Works entirely offline on capability records and response bodies stored as JSON.\n\
                  Use it to see which protocol dialect and vendor extensions a session would get,\n\
                  how a command call renders on the wire and how a response would be classified.",
    author
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (-v, -vv, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Client configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "DRIVELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a session from its capabilities
    Flags(SessionArgs),

    /// List the commands a session resolves to
    Commands {
        /// Capability records
        #[command(flatten)]
        session: SessionArgs,

        /// Only show commands whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show endpoint and parameters of one command
    Describe {
        /// Command name, e.g. navigateTo
        name: String,

        /// Capability records
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Validate a call and render the request it would send
    Prepare {
        /// Command name, e.g. navigateTo
        name: String,

        /// Capability records
        #[command(flatten)]
        session: SessionArgs,

        /// Call arguments as a JSON array
        #[arg(long, short = 'a', default_value = "[]")]
        args: String,

        /// Session id substituted for :sessionId
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Classify a response status and body
    Classify {
        /// HTTP status code
        #[arg(long)]
        status: u16,

        /// Response body as JSON (omit for an empty body)
        #[arg(long)]
        body: Option<String>,
    },
}

/// Capability records describing a session
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// JSON file with the capabilities the server returned
    #[arg(long)]
    pub capabilities: PathBuf,

    /// JSON file with the capabilities the client requested
    #[arg(long)]
    pub requested: Option<PathBuf>,

    /// Server host name (defaults to the configured one)
    #[arg(long)]
    pub hostname: Option<String>,
}

impl Cli {
    /// Log filter for this invocation.
    ///
    /// `-v` flags win over the configured level; `RUST_LOG` wins over both.
    pub fn log_filter(&self, configured: &str) -> String {
        match self.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    /// Initialize the stderr tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Logging`] if a global subscriber is already set.
    pub fn init_tracing(&self, configured: &str) -> CliResult<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_filter(configured)));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| CliError::Logging(e.to_string()))
    }
}
