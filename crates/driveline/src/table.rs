//! Command table assembly.
//!
//! The definition sets that apply to a session are chosen from its
//! [`EnvironmentFlags`], layered in a fixed order and bound into a
//! [`CommandTable`] keyed by command name. The table is built once per session
//! and only changes when overrides are applied.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use driveline_protocol::{CommandSpec, DefinitionSets, HttpMethod, ProtocolDefinition, SetKind};
use serde_json::Value;
use tracing::{debug, info};

use crate::command::{Argument, CallContext, CommandFn, ProtocolCommand, command_fn};
use crate::environment::EnvironmentFlags;
use crate::error::{DriverError, DriverResult};
use crate::overrides::{self, OriginalCommand, OverrideEntry, OverrideFn, OverrideRecord};

/// Definition sets that apply to a session, in merge order.
///
/// Mobile sessions get both base dialects, then the mobile extensions.
/// Otherwise W3C sessions get the W3C set and everything else the legacy set.
/// Vendor sets are layered last.
pub fn selected_kinds(flags: &EnvironmentFlags) -> Vec<SetKind> {
    let mut kinds = Vec::with_capacity(SetKind::ALL.len());

    if flags.is_mobile {
        kinds.extend([SetKind::JsonWireProtocol, SetKind::WebDriver]);
        kinds.extend([SetKind::MobileJsonWireProtocol, SetKind::Appium]);
    } else if flags.is_w3c {
        kinds.push(SetKind::WebDriver);
    } else {
        kinds.push(SetKind::JsonWireProtocol);
    }

    if flags.is_chrome {
        kinds.push(SetKind::Chromium);
    }
    if flags.is_sauce {
        kinds.push(SetKind::SauceLabs);
    }
    if flags.is_selenium_standalone {
        kinds.push(SetKind::Selenium);
    }

    kinds
}

/// Merge the definition sets that apply to a session. Later sets win for the
/// same endpoint/method pair.
pub fn select_definitions(flags: &EnvironmentFlags, sets: &DefinitionSets) -> ProtocolDefinition {
    ProtocolDefinition::merged(selected_kinds(flags).into_iter().map(|kind| sets.get(kind)))
}

/// A table command: its binding plus the function that currently runs it.
#[derive(Clone)]
pub struct BoundCommand {
    binding: Arc<ProtocolCommand>,
    func: CommandFn,
    overrides: usize,
}

impl BoundCommand {
    /// Bind a command to the function that runs it.
    pub fn new(binding: ProtocolCommand) -> Self {
        let binding = Arc::new(binding);
        let func = binding.invocation();
        Self {
            binding,
            func,
            overrides: 0,
        }
    }

    /// Command name.
    pub fn name(&self) -> &str {
        self.binding.name()
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.binding.method()
    }

    /// Endpoint template.
    pub fn endpoint(&self) -> &str {
        self.binding.endpoint()
    }

    /// Declared metadata.
    pub fn spec(&self) -> &CommandSpec {
        self.binding.spec()
    }

    /// The protocol binding, independent of any override.
    pub fn binding(&self) -> &ProtocolCommand {
        &self.binding
    }

    /// How many overrides wrap the protocol binding.
    pub fn override_depth(&self) -> usize {
        self.overrides
    }

    /// Run the command.
    pub fn call(&self, ctx: &CallContext<'_>, args: &[Argument]) -> DriverResult<Value> {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for BoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCommand")
            .field("name", &self.name())
            .field("method", &self.method())
            .field("endpoint", &self.endpoint())
            .field("overrides", &self.overrides)
            .finish()
    }
}

/// One entry of a [`CommandTable`].
#[derive(Debug, Clone)]
pub enum Member {
    /// Invocable command.
    Command(BoundCommand),
    /// Read-only value, such as an environment flag.
    Property(Value),
}

impl Member {
    /// The command, if this is one.
    pub fn as_command(&self) -> Option<&BoundCommand> {
        match self {
            Self::Command(command) => Some(command),
            Self::Property(_) => None,
        }
    }

    /// The value, if this is a property.
    pub fn as_property(&self) -> Option<&Value> {
        match self {
            Self::Property(value) => Some(value),
            Self::Command(_) => None,
        }
    }
}

/// Every member available to one session, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    members: BTreeMap<String, Member>,
    pending: OverrideRecord,
}

impl CommandTable {
    /// Build the table for a session and publish its environment flags as
    /// properties.
    pub fn build(flags: &EnvironmentFlags, sets: &DefinitionSets) -> DriverResult<Self> {
        let kinds = selected_kinds(flags);
        let layers: Vec<&ProtocolDefinition> = kinds.iter().map(|kind| sets.get(*kind)).collect();
        let table = Self::from_layers(&layers)?.with_environment(flags);

        let names: Vec<&str> = kinds.into_iter().map(SetKind::name).collect();
        info!(
            sets = %names.join(","),
            commands = table.commands().count(),
            "built command table"
        );
        Ok(table)
    }

    /// Bind every endpoint/method pair of `definition`. When two pairs declare
    /// the same command name the later one wins.
    pub fn from_definition(definition: &ProtocolDefinition) -> DriverResult<Self> {
        Self::from_layers(&[definition])
    }

    /// Bind definition sets layered in order.
    ///
    /// A command from a later set shadows any earlier command of the same
    /// name, wherever the earlier set declared it. A name whose
    /// endpoint/method pair is redeclared by a later set under another name
    /// is dropped.
    pub fn from_layers(layers: &[&ProtocolDefinition]) -> DriverResult<Self> {
        let mut members = BTreeMap::new();
        let mut owners: HashMap<(HttpMethod, String), String> = HashMap::new();

        for layer in layers {
            for (endpoint, method, spec) in layer.commands() {
                let command = BoundCommand::new(ProtocolCommand::bind(method, endpoint, spec)?);
                let name = command.name().to_string();

                let pair = (method, endpoint.to_string());
                if let Some(owner) = owners.insert(pair, name.clone()) {
                    let stale = matches!(
                        members.get(&owner),
                        Some(Member::Command(previous))
                            if previous.method() == method && previous.endpoint() == endpoint
                    );
                    if stale && owner != name {
                        members.remove(&owner);
                        debug!(command = %owner, by = %name, "endpoint redeclared by later definition");
                    }
                }

                if let Some(Member::Command(previous)) =
                    members.insert(name.clone(), Member::Command(command))
                {
                    debug!(
                        command = %name,
                        shadowed = %format!("{} {}", previous.method(), previous.endpoint()),
                        by = %format!("{method} {endpoint}"),
                        "command shadowed by later definition"
                    );
                }
            }
        }

        Ok(Self {
            members,
            pending: OverrideRecord::new(),
        })
    }

    /// Publish environment flags as read-only properties.
    #[must_use]
    pub fn with_environment(mut self, flags: &EnvironmentFlags) -> Self {
        for (name, value) in flags.properties() {
            self.members
                .insert(name.to_string(), Member::Property(Value::Bool(value)));
        }
        self
    }

    /// Add or replace a read-only property.
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.members.insert(name.into(), Member::Property(value));
    }

    /// Look up a member.
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Look up a command.
    pub fn command(&self, name: &str) -> Option<&BoundCommand> {
        self.get(name).and_then(Member::as_command)
    }

    /// Look up a property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Member::as_property)
    }

    /// `true` when a member of that name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Member names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Commands in name order.
    pub fn commands(&self) -> impl Iterator<Item = &BoundCommand> {
        self.members.values().filter_map(Member::as_command)
    }

    /// Number of members, properties included.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// No members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Run a command by name.
    pub fn invoke(&self, name: &str, ctx: &CallContext<'_>, args: &[Argument]) -> DriverResult<Value> {
        match self.get(name) {
            Some(Member::Command(command)) => command.call(ctx, args),
            Some(Member::Property(_)) => Err(DriverError::NotInvocable(name.to_string())),
            None => Err(DriverError::UnknownCommand(name.to_string())),
        }
    }

    /// Register an override to be applied by
    /// [`apply_overrides`](Self::apply_overrides).
    pub fn overwrite_command(&mut self, name: impl Into<String>, entry: impl Into<OverrideEntry>) {
        self.pending.insert(name, entry);
    }

    /// Overrides registered but not yet applied.
    pub fn pending_overrides(&self) -> &OverrideRecord {
        &self.pending
    }

    /// Apply the registered overrides. On error nothing is applied and the
    /// registrations stay pending.
    pub fn apply_overrides(&mut self) -> DriverResult<usize> {
        let mut record = std::mem::take(&mut self.pending);
        let result = overrides::apply_overrides(self, &mut record);
        if result.is_err() {
            self.pending = record;
        }
        result
    }

    /// Replace a command's function with `replacement` wrapping it.
    pub(crate) fn wrap(&mut self, name: &str, replacement: OverrideFn) -> DriverResult<()> {
        let Some(Member::Command(command)) = self.members.get_mut(name) else {
            return Err(DriverError::UnknownCommand(name.to_string()));
        };
        let original = OriginalCommand::new(name, Arc::clone(&command.func));
        command.func = command_fn(move |ctx, args| replacement(&original, ctx, args));
        command.overrides += 1;
        Ok(())
    }
}
