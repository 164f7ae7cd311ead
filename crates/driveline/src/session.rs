//! Session-level holder for a negotiated session.
//!
//! A [`Session`] classifies the capabilities it is given, builds the command
//! table once and exposes the flags as read-only accessors so collaborators
//! can branch on dialect without recomputing anything.

use std::sync::Arc;

use driveline_protocol::DefinitionSets;
use serde_json::Value;
use url::Url;

use crate::command::{Argument, CallContext};
use crate::environment::EnvironmentFlags;
use crate::error::DriverResult;
use crate::overrides::OverrideEntry;
use crate::table::CommandTable;
use crate::transport::Transport;

/// What session bootstrap hands over once a session exists.
#[derive(Debug, Clone)]
pub struct SessionParts {
    /// Sends requests to the server.
    pub transport: Arc<dyn Transport>,
    /// Base URL of the server.
    pub base_url: Url,
    /// Negotiated session id, if any.
    pub session_id: Option<String>,
    /// Capabilities the server returned.
    pub capabilities: Value,
    /// Capabilities the client requested (`{ "w3cCaps": { "alwaysMatch": .. } }`).
    pub requested_capabilities: Value,
    /// Definition sets the table is built from.
    pub definitions: DefinitionSets,
}

impl SessionParts {
    /// Parts with empty capabilities and no definition sets.
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
            session_id: None,
            capabilities: Value::Null,
            requested_capabilities: Value::Null,
            definitions: DefinitionSets::empty(),
        }
    }

    /// Set the negotiated session id.
    #[must_use]
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the negotiated capabilities.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Value) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the requested capabilities.
    #[must_use]
    pub fn requested_capabilities(mut self, requested: Value) -> Self {
        self.requested_capabilities = requested;
        self
    }

    /// Set the definition sets.
    #[must_use]
    pub fn definitions(mut self, definitions: DefinitionSets) -> Self {
        self.definitions = definitions;
        self
    }

    /// Build the session.
    pub fn build(self) -> DriverResult<Session> {
        Session::new(self)
    }
}

/// A classified session with its command table.
#[derive(Debug)]
pub struct Session {
    transport: Arc<dyn Transport>,
    base_url: Url,
    session_id: Option<String>,
    capabilities: Value,
    flags: EnvironmentFlags,
    table: CommandTable,
}

impl Session {
    /// Classify the session and build its command table.
    pub fn new(parts: SessionParts) -> DriverResult<Self> {
        let hostname = parts.base_url.host_str().unwrap_or_default().to_string();
        let flags = EnvironmentFlags::from_values(
            &hostname,
            &parts.capabilities,
            &parts.requested_capabilities,
        );
        let table = CommandTable::build(&flags, &parts.definitions)?;

        Ok(Self {
            transport: parts.transport,
            base_url: parts.base_url,
            session_id: parts.session_id,
            capabilities: parts.capabilities,
            flags,
            table,
        })
    }

    /// Environment flags.
    pub fn flags(&self) -> EnvironmentFlags {
        self.flags
    }

    /// Speaks the W3C dialect.
    pub fn is_w3c(&self) -> bool {
        self.flags.is_w3c
    }

    /// Driven by chromedriver.
    pub fn is_chrome(&self) -> bool {
        self.flags.is_chrome
    }

    /// Mobile device or emulator.
    pub fn is_mobile(&self) -> bool {
        self.flags.is_mobile
    }

    /// iOS device.
    pub fn is_ios(&self) -> bool {
        self.flags.is_ios
    }

    /// Android device.
    pub fn is_android(&self) -> bool {
        self.flags.is_android
    }

    /// Sauce Labs session with extended debugging.
    pub fn is_sauce(&self) -> bool {
        self.flags.is_sauce
    }

    /// Legacy Selenium standalone server.
    pub fn is_selenium_standalone(&self) -> bool {
        self.flags.is_selenium_standalone
    }

    /// Negotiated session id.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Negotiated capabilities as received.
    pub fn capabilities(&self) -> &Value {
        &self.capabilities
    }

    /// Server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The command table.
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Mutable access for overrides.
    pub fn table_mut(&mut self) -> &mut CommandTable {
        &mut self.table
    }

    /// Context commands of this session run in.
    pub fn context(&self) -> CallContext<'_> {
        let ctx = CallContext::new(self.transport.as_ref(), &self.base_url);
        match &self.session_id {
            Some(id) => ctx.with_session(id),
            None => ctx,
        }
    }

    /// Run a command by name.
    pub fn call(&self, name: &str, args: &[Argument]) -> DriverResult<Value> {
        self.table.invoke(name, &self.context(), args)
    }

    /// Register a command override.
    pub fn overwrite_command(&mut self, name: impl Into<String>, entry: impl Into<OverrideEntry>) {
        self.table.overwrite_command(name, entry);
    }

    /// Apply registered overrides.
    pub fn apply_overrides(&mut self) -> DriverResult<usize> {
        self.table.apply_overrides()
    }
}
