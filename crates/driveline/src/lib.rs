//! # Driveline
//!
//! Command resolution for WebDriver-family automation clients.
//!
//! Given the capabilities a server negotiated for a session, this crate
//! decides which protocol dialect and extensions apply, binds every command of
//! the matching definition sets to an invocable function, and classifies the
//! responses those functions get back:
//!
//! - [`EnvironmentFlags`] classifies a session from its capabilities
//! - [`CommandTable`] holds the commands valid for that session
//! - [`is_successful_response`] and [`error_from_response_body`] turn a status
//!   and body into a value or a typed error
//! - [`OverrideRecord`] replaces individual commands while keeping the
//!   original reachable
//!
//! Sending requests is left to a [`Transport`] implementation.
//!
//! # Truthiness
//!
//! Capabilities and response bodies are loosely typed. Wherever a field is
//! checked for being "set", `null`, `false`, `0`, `NaN` and `""` count as
//! unset, and every other value (including empty arrays and objects) counts
//! as set. Checks for the mere presence of a key are called out explicitly.
//!
//! # Example
//!
//! ```rust
//! use driveline::prelude::*;
//! use serde_json::json;
//!
//! let flags = EnvironmentFlags::from_values(
//!     "localhost",
//!     &json!({ "platformName": "linux", "browserVersion": "120", "setWindowRect": true }),
//!     &json!({}),
//! );
//! assert!(flags.is_w3c);
//!
//! let table = CommandTable::build(&flags, &DefinitionSets::bundled()?)?;
//! let navigate = table.command("navigateTo").expect("W3C sessions can navigate");
//! assert_eq!(navigate.endpoint(), "/session/:sessionId/url");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod command;
pub mod config;
pub mod environment;
pub mod error;
mod json;
pub mod overrides;
pub mod response;
pub mod session;
pub mod table;
pub mod transport;

pub use capabilities::{Capabilities, RequestedCapabilities, Slot, W3cCapabilities};
pub use command::{
    Argument, CallContext, CommandFn, ParameterType, PreparedRequest, ProtocolCommand,
    argument_type, command_call_structure, command_fn, is_valid_parameter,
};
pub use config::{ClientConfig, ConfigError};
pub use environment::EnvironmentFlags;
pub use error::{
    ConfigurationIssue, DriverError, DriverResult, ProtocolFault, error_from_response_body,
};
pub use overrides::{
    OriginalCommand, OverrideEntry, OverrideFn, OverrideRecord, apply_overrides, override_fn,
};
pub use response::is_successful_response;
pub use session::{Session, SessionParts};
pub use table::{BoundCommand, CommandTable, Member, select_definitions, selected_kinds};
pub use transport::{Transport, WireRequest, WireResponse};

pub use driveline_protocol::{
    CommandSpec, DefinitionSets, HttpMethod, Parameter, ProtocolDefinition, SetKind, Variable,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Argument, CallContext, CommandTable, DefinitionSets, DriverError, DriverResult,
        EnvironmentFlags, HttpMethod, OverrideEntry, Session, SessionParts, Transport,
        WireRequest, WireResponse,
    };
}
