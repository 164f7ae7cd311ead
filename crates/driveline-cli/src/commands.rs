//! Command implementations
//!
//! Every command produces a [`Report`]; rendering is left to [`crate::output`].

use std::fs;
use std::path::Path;

use driveline::{
    Argument, ClientConfig, CommandTable, DefinitionSets, EnvironmentFlags, HttpMethod,
    WireRequest, WireResponse,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cli::{Command, SessionArgs};
use crate::error::{CliError, CliResult};

/// Result of one command, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Session classification
    Flags(EnvironmentFlags),
    /// Resolved command table
    Commands(Vec<CommandRow>),
    /// One command in detail
    Describe(CommandDetail),
    /// A rendered request
    Prepare(WireRequest),
    /// A classified response
    Classify(Classification),
}

/// One line of a command listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRow {
    /// Command name
    pub name: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Endpoint template
    pub endpoint: String,
}

/// A command with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDetail {
    /// Command name
    pub name: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Endpoint template
    pub endpoint: String,
    /// Call signature with parameter types
    pub usage: String,
    /// Description from the definition set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Upstream documentation link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Arguments a caller must pass
    pub required_arguments: usize,
    /// Arguments a caller may pass
    pub max_arguments: usize,
    /// Routed to the grid hub
    pub is_hub_command: bool,
}

/// How a response would be treated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Whether the response counts as a success
    pub successful: bool,
    /// Value handed to the caller on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Error name on failure, when one could be determined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Run a parsed command.
pub fn execute(command: Command, config: &ClientConfig) -> CliResult<Report> {
    match command {
        Command::Flags(session) => flags(&session, config).map(Report::Flags),
        Command::Commands { session, filter } => {
            list_commands(&session, config, filter.as_deref()).map(Report::Commands)
        }
        Command::Describe { name, session } => {
            describe(&session, config, &name).map(Report::Describe)
        }
        Command::Prepare {
            name,
            session,
            args,
            session_id,
        } => prepare(&session, config, &name, &args, session_id.as_deref()).map(Report::Prepare),
        Command::Classify { status, body } => classify(status, body.as_deref()).map(Report::Classify),
    }
}

/// Classify the session described by `session`.
pub fn flags(session: &SessionArgs, config: &ClientConfig) -> CliResult<EnvironmentFlags> {
    let capabilities = read_json(&session.capabilities)?;
    let requested = match &session.requested {
        Some(path) => read_json(path)?,
        None => Value::Null,
    };
    let hostname = session.hostname.as_deref().unwrap_or(&config.hostname);
    Ok(EnvironmentFlags::from_values(
        hostname,
        &capabilities,
        &requested,
    ))
}

/// Build the command table for the session described by `session`.
pub fn resolve_table(session: &SessionArgs, config: &ClientConfig) -> CliResult<CommandTable> {
    let flags = flags(session, config)?;
    let sets = DefinitionSets::bundled().map_err(driveline::DriverError::from)?;
    Ok(CommandTable::build(&flags, &sets)?)
}

/// Commands of the resolved table, optionally filtered by name.
pub fn list_commands(
    session: &SessionArgs,
    config: &ClientConfig,
    filter: Option<&str>,
) -> CliResult<Vec<CommandRow>> {
    let table = resolve_table(session, config)?;
    let rows = table
        .commands()
        .filter(|command| filter.is_none_or(|needle| command.name().contains(needle)))
        .map(|command| CommandRow {
            name: command.name().to_string(),
            method: command.method(),
            endpoint: command.endpoint().to_string(),
        })
        .collect();
    Ok(rows)
}

/// Details of one command in the resolved table.
pub fn describe(session: &SessionArgs, config: &ClientConfig, name: &str) -> CliResult<CommandDetail> {
    let table = resolve_table(session, config)?;
    let command = table
        .command(name)
        .ok_or_else(|| CliError::UnknownCommand(name.to_string()))?;
    let binding = command.binding();
    let spec = command.spec();

    Ok(CommandDetail {
        name: binding.name().to_string(),
        method: binding.method(),
        endpoint: binding.endpoint().to_string(),
        usage: binding.usage(),
        description: spec.description.clone(),
        reference: spec.reference.clone(),
        required_arguments: binding.required_arguments(),
        max_arguments: binding.max_arguments(),
        is_hub_command: spec.is_hub_command,
    })
}

/// Validate `args` for `name` and render the request against the configured
/// server.
pub fn prepare(
    session: &SessionArgs,
    config: &ClientConfig,
    name: &str,
    args: &str,
    session_id: Option<&str>,
) -> CliResult<WireRequest> {
    let table = resolve_table(session, config)?;
    let command = table
        .command(name)
        .ok_or_else(|| CliError::UnknownCommand(name.to_string()))?;

    let arguments = parse_arguments(args)?;
    let prepared = command.binding().prepare(&arguments)?;
    let base = config.base_url()?;
    debug!(command = name, base = %base, "rendering request");
    Ok(prepared.to_wire(&base, session_id)?)
}

/// Classify a status code and optional JSON body.
pub fn classify(status: u16, body: Option<&str>) -> CliResult<Classification> {
    let response = match body {
        Some(text) => WireResponse::new(status, serde_json::from_str(text)?),
        None => WireResponse::empty(status),
    };

    Ok(match response.into_result() {
        Ok(value) => Classification {
            successful: true,
            value: Some(value),
            error: None,
            message: None,
        },
        Err(err) => Classification {
            successful: false,
            value: None,
            error: err.name().map(str::to_string),
            message: Some(
                err.fault()
                    .map_or_else(|| err.to_string(), |fault| fault.message.clone()),
            ),
        },
    })
}

/// Parse a JSON array of call arguments.
fn parse_arguments(args: &str) -> CliResult<Vec<Argument>> {
    match serde_json::from_str(args)? {
        Value::Array(values) => Ok(Argument::list(values)),
        other => Err(CliError::InvalidArguments(format!(
            "expected a JSON array of arguments, got {other}"
        ))),
    }
}

fn read_json(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
