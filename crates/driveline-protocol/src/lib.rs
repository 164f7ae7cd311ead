//! # Driveline Protocol
//!
//! Static protocol definition sets for WebDriver-family automation servers.
//!
//! A definition set maps endpoint templates to HTTP methods and each method to
//! the command it implements:
//!
//! - W3C WebDriver (`webdriver`) and the legacy JSON Wire Protocol (`jsonwp`)
//! - Mobile extensions (`mjsonwp`, `appium`)
//! - Vendor extensions (`chromium`, `saucelabs`, `selenium`)
//!
//! The crate only loads, merges and structurally validates the sets. Choosing
//! which of them apply to a session, and binding them to invocable commands,
//! happens in the `driveline` crate.
//!
//! ```rust
//! use driveline_protocol::{DefinitionSets, HttpMethod};
//!
//! let sets = DefinitionSets::bundled()?;
//! let navigate = sets.webdriver.get("/session/:sessionId/url", HttpMethod::Post);
//! assert_eq!(navigate.map(|c| c.command.as_str()), Some("navigateTo"));
//! # Ok::<(), driveline_protocol::ProtocolError>(())
//! ```

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod definition;
mod error;
mod sets;

pub use definition::{
    CommandSpec, EndpointDefinition, HttpMethod, Parameter, ProtocolDefinition, Variable,
};
pub use error::{ProtocolError, ProtocolResult};
pub use sets::{DefinitionSets, SetKind};
