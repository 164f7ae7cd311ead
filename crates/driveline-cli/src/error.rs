//! CLI error types

use std::path::PathBuf;

use driveline::{ConfigError, DriverError};
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Command resolution or response handling failed
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// An input file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The resolved table has no such command
    #[error("Unknown command '{0}' for this session")]
    UnknownCommand(String),

    /// Logging could not be initialized
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl CliError {
    /// User-facing hints for resolving the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::UnknownCommand(_) => vec![
                "Run `driveline commands` with the same capabilities to list what is available",
                "Vendor commands only appear when their capabilities are present",
            ],
            Self::Json(_) | Self::InvalidArguments(_) => vec![
                "Check argument format (must be valid JSON)",
                "Use --help to see expected format",
            ],
            Self::Config(_) => vec![
                "Use a .toml, .yaml, .yml or .json configuration file",
                "DRIVELINE_* environment variables override file settings",
            ],
            Self::Driver(DriverError::WrongParameters { .. }) => {
                vec!["Run `driveline describe <NAME>` to see the expected parameters"]
            }
            Self::Driver(DriverError::MissingSession(_)) => {
                vec!["Pass --session-id for commands scoped to a session"]
            }
            _ => vec![],
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
