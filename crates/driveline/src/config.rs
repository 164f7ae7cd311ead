//! Client configuration.
//!
//! Describes where the automation server lives. Loaded from TOML, YAML or JSON
//! with environment overrides, or built in code.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable prefix for overrides, e.g. `DRIVELINE_PORT=9515`.
pub const ENV_PREFIX: &str = "DRIVELINE";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported file format
    #[error("Unsupported configuration file format. Use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Configuration parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// The configured server address is not a valid URL
    #[error("Invalid server address {address}: {source}")]
    InvalidAddress {
        /// The address that was assembled from the configuration.
        address: String,
        /// Why it did not parse.
        source: url::ParseError,
    },
}

/// Where the automation server lives and how chatty the client is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `http` or `https`.
    pub protocol: String,
    /// Server host name.
    pub hostname: String,
    /// Server port.
    pub port: u16,
    /// Path prefix of the server, e.g. `/wd/hub`.
    pub path: String,
    /// Default log filter when none is given on the command line.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            hostname: "localhost".to_string(),
            port: 4444,
            path: "/".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a file (TOML, YAML, or JSON)
    ///
    /// Environment variables with the `DRIVELINE_` prefix override file
    /// settings, e.g. `DRIVELINE_PORT=9515`.
    ///
    /// ```rust,no_run
    /// use driveline::ClientConfig;
    ///
    /// let config = ClientConfig::from_file("driveline.toml")?;
    /// println!("{}", config.base_url()?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration from a file with a custom environment prefix.
    pub fn from_file_with_prefix(
        path: impl AsRef<Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => return Err(ConfigError::UnsupportedFormat),
        };

        let config = Config::builder()
            .add_source(File::new(
                path.to_str().ok_or(ConfigError::UnsupportedFormat)?,
                format,
            ))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Base URL every endpoint is appended to.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        let address = format!("{}://{}:{}{}", self.protocol, self.hostname, self.port, path);
        Url::parse(&address).map_err(|source| ConfigError::InvalidAddress { address, source })
    }
}
