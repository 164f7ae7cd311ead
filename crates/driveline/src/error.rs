//! Error types for command resolution and invocation.

use std::fmt;

use driveline_protocol::ProtocolError;
use serde_json::Value;
use thiserror::Error;

use crate::config::ConfigError;
use crate::json::{display_text, is_truthy, truthy};

/// Result type for driver operations.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Error name inferred from the message when the server omits one.
pub const STALE_ELEMENT_REFERENCE: &str = "stale element reference";

/// Failure reported by the server inside an otherwise well-formed response.
///
/// `name` carries the protocol error code (`no such element`, `stale element
/// reference`, ...) so callers can branch on it without parsing `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolFault {
    /// Protocol error code, when known.
    pub name: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl ProtocolFault {
    /// Build a fault from a response body whose `value` is an object.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| truthy(value.get(key)).map(display_text);

        let message = text("message")
            .or_else(|| text("class"))
            .unwrap_or_else(|| "unknown error".to_string());

        let name = match text("error") {
            Some(code) => Some(code),
            None if text("message").is_some_and(|m| m.contains(STALE_ELEMENT_REFERENCE)) => {
                Some(STALE_ELEMENT_REFERENCE.to_string())
            }
            None => None,
        };

        Self { name, message }
    }
}

impl fmt::Display for ProtocolFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProtocolFault {}

/// Why an override was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationIssue {
    /// The replacement is not a function.
    NotAFunction,
    /// No member of that name exists.
    NoSuchCommand,
    /// The member exists but is a property, not a command.
    NotInvocable,
}

impl ConfigurationIssue {
    fn render(self, command: &str) -> String {
        match self {
            Self::NotAFunction => {
                format!("commands be overwritten only with functions, command: {command}")
            }
            Self::NoSuchCommand => format!("no command to be overwritten: {command}"),
            Self::NotInvocable => {
                format!("only functions can be overwritten, command: {command}")
            }
        }
    }
}

/// Errors raised while building, overriding or invoking commands.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    /// Override misuse.
    #[error("overwriteCommand: {}", .issue.render(.command))]
    Configuration {
        /// Command the override targeted.
        command: String,
        /// What was wrong with it.
        issue: ConfigurationIssue,
    },

    /// Structured failure reported by the server.
    #[error("{0}")]
    Protocol(ProtocolFault),

    /// Empty, malformed or unstructured failure response.
    #[error("{0}")]
    Generic(String),

    /// Argument count outside the accepted range.
    #[error("Wrong parameters applied for {command}\nUsage: {usage}")]
    WrongParameters {
        /// Command name.
        command: String,
        /// Usage line listing the expected parameters.
        usage: String,
    },

    /// An argument does not match its declared type.
    #[error(
        "Malformed type for \"{parameter}\" parameter of command {command}\nExpected: {expected}\nActual: {actual}"
    )]
    MalformedParameter {
        /// Command name.
        command: String,
        /// Parameter name.
        parameter: String,
        /// Declared type descriptor.
        expected: String,
        /// Runtime category of the supplied argument.
        actual: String,
    },

    /// No member of that name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The member is a property and cannot be called.
    #[error("{0} is not a command")]
    NotInvocable(String),

    /// The endpoint requires a session id but none was supplied.
    #[error("command {0} requires a session id")]
    MissingSession(String),

    /// Reported by a [`Transport`](crate::transport::Transport)
    /// implementation.
    #[error("transport error: {0}")]
    Transport(String),

    /// A definition set is structurally invalid.
    #[error("invalid protocol definition: {0}")]
    Definition(#[from] ProtocolError),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A request body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DriverError {
    /// Override misuse.
    pub fn configuration(command: impl Into<String>, issue: ConfigurationIssue) -> Self {
        Self::Configuration {
            command: command.into(),
            issue,
        }
    }

    /// The error is override misuse.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// The structured server fault, if this is one.
    pub fn fault(&self) -> Option<&ProtocolFault> {
        match self {
            Self::Protocol(fault) => Some(fault),
            _ => None,
        }
    }

    /// Protocol error code of a server fault.
    pub fn name(&self) -> Option<&str> {
        self.fault().and_then(|fault| fault.name.as_deref())
    }

    /// The error came back from the server in a response body.
    pub fn is_response_error(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::Generic(_))
    }
}

/// Turn a failed response body into an error.
pub fn error_from_response_body(body: Option<&Value>) -> DriverError {
    let Some(body) = body.filter(|b| is_truthy(b)) else {
        return DriverError::Generic("Response has empty body".to_string());
    };

    if let Value::String(text) = body {
        return DriverError::Generic(text.clone());
    }

    match body.get("value") {
        Some(value) if body.is_object() && is_truthy(value) => {
            DriverError::Protocol(ProtocolFault::from_value(value))
        }
        _ => DriverError::Generic("unknown error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body() {
        for body in [None, Some(json!(null)), Some(json!("")), Some(json!(false))] {
            let err = error_from_response_body(body.as_ref());
            assert_eq!(err.to_string(), "Response has empty body");
            assert!(err.fault().is_none());
        }
    }

    #[test]
    fn test_string_body() {
        let err = error_from_response_body(Some(&json!("boom")));
        assert!(matches!(&err, DriverError::Generic(m) if m == "boom"));
    }

    #[test]
    fn test_unknown_error_shapes() {
        for body in [json!(42), json!([1]), json!({}), json!({ "value": null }), json!({ "value": "" })] {
            let err = error_from_response_body(Some(&body));
            assert_eq!(err.to_string(), "unknown error", "body {body}");
        }
    }

    #[test]
    fn test_stale_element_is_inferred() {
        let err = error_from_response_body(Some(&json!({
            "value": { "message": "stale element reference: x" }
        })));
        assert_eq!(err.name(), Some("stale element reference"));
        assert_eq!(err.fault().unwrap().message, "stale element reference: x");
    }

    #[test]
    fn test_explicit_error_code_wins() {
        let err = error_from_response_body(Some(&json!({
            "value": { "error": "no such window", "message": "stale element reference" }
        })));
        assert_eq!(err.name(), Some("no such window"));
        assert_eq!(err.to_string(), "no such window: stale element reference");
    }

    #[test]
    fn test_message_falls_back_to_class() {
        let fault = ProtocolFault::from_value(&json!({ "class": "org.openqa.NoSuchElement" }));
        assert_eq!(fault.message, "org.openqa.NoSuchElement");
        assert_eq!(fault.name, None);

        let fault = ProtocolFault::from_value(&json!({ "foo": 1 }));
        assert_eq!(fault.message, "unknown error");
    }

    #[test]
    fn test_configuration_messages() {
        let err = DriverError::configuration("click", ConfigurationIssue::NoSuchCommand);
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "overwriteCommand: no command to be overwritten: click");

        let err = DriverError::configuration("click", ConfigurationIssue::NotAFunction);
        assert_eq!(
            err.to_string(),
            "overwriteCommand: commands be overwritten only with functions, command: click"
        );

        let err = DriverError::configuration("isW3C", ConfigurationIssue::NotInvocable);
        assert_eq!(
            err.to_string(),
            "overwriteCommand: only functions can be overwritten, command: isW3C"
        );
    }
}
