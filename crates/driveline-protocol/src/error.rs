//! Error types for definition set loading.

use thiserror::Error;

/// Result type for definition set operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while loading or validating a protocol definition set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The document is not valid JSON.
    #[error("failed to parse definition set: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document is JSON but not shaped like a definition set.
    #[error("malformed definition set: {0}")]
    Shape(String),

    /// An endpoint declares a method outside GET/POST/PUT/DELETE.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// Command metadata could not be decoded.
    #[error("invalid command metadata for {method} {endpoint}: {reason}")]
    Command {
        /// Endpoint template the metadata belongs to.
        endpoint: String,
        /// HTTP method the metadata belongs to.
        method: String,
        /// Decoder message.
        reason: String,
    },

    /// Command metadata decoded but is inconsistent with its endpoint.
    #[error("invalid command {command} at {endpoint}: {reason}")]
    Invalid {
        /// Declared command name.
        command: String,
        /// Endpoint template.
        endpoint: String,
        /// What is wrong with it.
        reason: String,
    },
}
