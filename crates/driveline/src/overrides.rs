//! User replacements for table commands.
//!
//! Overrides are collected in an [`OverrideRecord`] and applied in one pass.
//! Each replacement receives the command it replaces as an
//! [`OriginalCommand`], captured by value when the override is applied, so a
//! replacement can call through without the table referring to itself.
//! Overriding an already-overridden command wraps the previous wrapper.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::command::{Argument, CallContext, CommandFn};
use crate::error::{ConfigurationIssue, DriverError, DriverResult};
use crate::table::{CommandTable, Member};

/// A replacement for a table command.
pub type OverrideFn = Arc<
    dyn Fn(&OriginalCommand, &CallContext<'_>, &[Argument]) -> DriverResult<Value> + Send + Sync,
>;

/// Wrap a closure as an [`OverrideFn`].
pub fn override_fn<F>(f: F) -> OverrideFn
where
    F: Fn(&OriginalCommand, &CallContext<'_>, &[Argument]) -> DriverResult<Value>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// The invocation a replacement wraps.
#[derive(Clone)]
pub struct OriginalCommand {
    name: String,
    func: CommandFn,
}

impl OriginalCommand {
    pub(crate) fn new(name: impl Into<String>, func: CommandFn) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// Name of the overridden command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the original behaviour. Pass the context the replacement was given
    /// to stay on the same session.
    pub fn call(&self, ctx: &CallContext<'_>, args: &[Argument]) -> DriverResult<Value> {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for OriginalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginalCommand")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What a command is to be replaced with.
///
/// Only functions are accepted when overrides are applied; a plain value is
/// representable so that mistakes surface as configuration errors instead of
/// being unrepresentable at the call site of dynamic configuration.
#[derive(Clone)]
pub enum OverrideEntry {
    /// A replacement function.
    Function(OverrideFn),
    /// A non-callable value.
    Value(Value),
}

impl OverrideEntry {
    /// Replacement function entry.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&OriginalCommand, &CallContext<'_>, &[Argument]) -> DriverResult<Value>
            + Send
            + Sync
            + 'static,
    {
        Self::Function(override_fn(f))
    }
}

impl From<Value> for OverrideEntry {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<OverrideFn> for OverrideEntry {
    fn from(f: OverrideFn) -> Self {
        Self::Function(f)
    }
}

impl fmt::Debug for OverrideEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function(<fn>)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Pending overrides by command name, in registration order. Registering a
/// name twice keeps the later entry.
#[derive(Debug, Clone, Default)]
pub struct OverrideRecord {
    entries: Vec<(String, OverrideEntry)>,
}

impl OverrideRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an override.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<OverrideEntry>) {
        let name = name.into();
        let entry = entry.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((name, entry)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, entry: impl Into<OverrideEntry>) -> Self {
        self.insert(name, entry);
        self
    }

    /// Registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of registered overrides.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nothing registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Apply every entry of `record` to `table`, then clear the record.
///
/// All entries are checked before the table is touched; if any is rejected
/// the table and the record are returned unchanged. Returns the number of
/// commands that were wrapped.
pub fn apply_overrides(table: &mut CommandTable, record: &mut OverrideRecord) -> DriverResult<usize> {
    for (name, entry) in &record.entries {
        if !matches!(entry, OverrideEntry::Function(_)) {
            return Err(DriverError::configuration(name, ConfigurationIssue::NotAFunction));
        }
        match table.get(name) {
            None => {
                return Err(DriverError::configuration(name, ConfigurationIssue::NoSuchCommand));
            }
            Some(Member::Property(_)) => {
                return Err(DriverError::configuration(name, ConfigurationIssue::NotInvocable));
            }
            Some(Member::Command(_)) => {}
        }
    }

    let entries = std::mem::take(&mut record.entries);
    let mut applied = 0;
    for (name, entry) in entries {
        if let OverrideEntry::Function(replacement) = entry {
            table.wrap(&name, replacement)?;
            debug!(command = %name, "command overridden");
            applied += 1;
        }
    }

    if applied > 0 {
        info!(applied, "applied command overrides");
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_last_registration() {
        let record = OverrideRecord::new()
            .with("getTitle", json!(1))
            .with("getUrl", json!(2))
            .with("getTitle", OverrideEntry::function(|_, _, _| Ok(Value::Null)));

        assert_eq!(record.names().collect::<Vec<_>>(), vec!["getTitle", "getUrl"]);
        assert!(matches!(record.entries[0].1, OverrideEntry::Function(_)));
    }

    #[test]
    fn test_rejections_leave_record_intact() {
        let mut table = CommandTable::default();
        let mut record = OverrideRecord::new()
            .with("missing", OverrideEntry::function(|_, _, _| Ok(Value::Null)));

        let err = apply_overrides(&mut table, &mut record).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_non_function_is_rejected_first() {
        let mut table = CommandTable::default();
        let mut record = OverrideRecord::new().with("missing", json!("not a function"));
        let err = apply_overrides(&mut table, &mut record).unwrap_err();
        assert!(matches!(
            err,
            DriverError::Configuration {
                issue: ConfigurationIssue::NotAFunction,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_record_is_a_no_op() {
        let mut table = CommandTable::default();
        let mut record = OverrideRecord::new();
        assert_eq!(apply_overrides(&mut table, &mut record).unwrap(), 0);
    }
}
