//! Binding of declared commands to invocable functions.
//!
//! A [`ProtocolCommand`] is built once per endpoint/method pair when the
//! command table is assembled. Type descriptors are compiled at that point, so
//! a call only has to check arity, match arguments against precompiled
//! patterns and render the request.

use std::fmt;
use std::sync::Arc;

use driveline_protocol::{CommandSpec, HttpMethod, ProtocolError};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, trace};
use url::Url;

use crate::error::{DriverError, DriverResult};
use crate::json::{display_text, summarize};
use crate::transport::{Transport, WireRequest};

/// Placeholder segment resolved from the session rather than from arguments.
pub const SESSION_ID_PLACEHOLDER: &str = ":sessionId";

/// Characters left unescaped in path variables, matching what browsers leave
/// alone when encoding a URI component.
const PATH_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const ARRAY_MARKER: &str = "[]";

const RESULT_PREVIEW_LEN: usize = 61;
const RESULT_LOG_LIMIT: usize = 256;

/// A positional call-time argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Argument {
    /// No value supplied for an optional parameter.
    #[default]
    Undefined,
    /// A script function, carried as its source text.
    Function(String),
    /// Any JSON value.
    Value(Value),
}

impl Argument {
    /// A function argument with the given source.
    pub fn function(source: impl Into<String>) -> Self {
        Self::Function(source.into())
    }

    /// `true` for [`Argument::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The JSON sent for this argument; `None` when it is undefined.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Undefined => None,
            Self::Function(source) => Some(Value::String(source.clone())),
            Self::Value(value) => Some(value.clone()),
        }
    }

    /// Convert a JSON array into positional arguments.
    pub fn list(values: impl IntoIterator<Item = Value>) -> Vec<Self> {
        values.into_iter().map(Self::Value).collect()
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

/// Runtime category of an argument: `null`, `undefined`, `boolean`, `number`,
/// `string`, `object` (arrays and maps) or `function`.
pub fn argument_type(arg: &Argument) -> &'static str {
    match arg {
        Argument::Undefined => "undefined",
        Argument::Function(_) => "function",
        Argument::Value(value) => value_type(value),
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) | Value::Object(_) => "object",
    }
}

/// Check an argument against a type descriptor.
///
/// A trailing `[]` requires an array whose elements all match the base
/// descriptor. Descriptors are unanchored patterns over the argument's
/// category, so `(string|number)` accepts either. A descriptor that is not a
/// valid pattern accepts nothing.
pub fn is_valid_parameter(arg: &Argument, expected: &str) -> bool {
    ParameterType::parse(expected).is_ok_and(|ty| ty.accepts(arg))
}

/// Loggable call signature, e.g. `elementClick("abc", 1, null, <object>)`.
pub fn command_call_structure(name: &str, args: &[Argument]) -> String {
    let rendered: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            Argument::Undefined => "undefined".to_string(),
            Argument::Function(_) => "<fn>".to_string(),
            Argument::Value(Value::String(s)) => format!("\"{s}\""),
            Argument::Value(Value::Null) => "null".to_string(),
            Argument::Value(Value::Array(_) | Value::Object(_)) => "<object>".to_string(),
            Argument::Value(other) => other.to_string(),
        })
        .collect();
    format!("{name}({})", rendered.join(", "))
}

/// A compiled type descriptor.
#[derive(Debug, Clone)]
pub struct ParameterType {
    descriptor: String,
    pattern: Regex,
    array: bool,
}

impl ParameterType {
    /// Compile a descriptor such as `string`, `object[]` or
    /// `(number|object|null)`.
    pub fn parse(descriptor: &str) -> Result<Self, regex::Error> {
        let (base, array) = match descriptor.strip_suffix(ARRAY_MARKER) {
            Some(base) => (base, true),
            None => (descriptor, false),
        };
        Ok(Self {
            descriptor: descriptor.to_string(),
            pattern: Regex::new(base)?,
            array,
        })
    }

    /// The descriptor as declared.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Whether `arg` satisfies the descriptor.
    pub fn accepts(&self, arg: &Argument) -> bool {
        if !self.array {
            return self.pattern.is_match(argument_type(arg));
        }
        match arg {
            Argument::Value(Value::Array(items)) => items
                .iter()
                .all(|item| self.pattern.is_match(value_type(item))),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Path,
    Body,
}

#[derive(Debug, Clone)]
struct BoundParameter {
    name: String,
    location: Location,
    required: bool,
    ty: ParameterType,
}

/// One endpoint/method pair bound to its command metadata.
#[derive(Debug, Clone)]
pub struct ProtocolCommand {
    method: HttpMethod,
    endpoint: String,
    spec: CommandSpec,
    parameters: Vec<BoundParameter>,
}

impl ProtocolCommand {
    /// Bind `spec` to `method` and `endpoint`.
    ///
    /// Path variables become required `string` parameters placed before the
    /// declared body parameters. Fails when the metadata does not fit the
    /// endpoint or a type descriptor does not compile.
    pub fn bind(method: HttpMethod, endpoint: &str, spec: &CommandSpec) -> DriverResult<Self> {
        spec.validate(endpoint)?;

        let compile = |name: &str, descriptor: &str| {
            ParameterType::parse(descriptor).map_err(|e| ProtocolError::Invalid {
                command: spec.command.clone(),
                endpoint: endpoint.to_string(),
                reason: format!("invalid type {descriptor:?} for parameter {name}: {e}"),
            })
        };

        let mut parameters = Vec::with_capacity(spec.variables.len() + spec.parameters.len());
        for variable in &spec.variables {
            parameters.push(BoundParameter {
                name: variable.name.clone(),
                location: Location::Path,
                required: true,
                ty: compile(&variable.name, "string")?,
            });
        }
        for parameter in &spec.parameters {
            parameters.push(BoundParameter {
                name: parameter.name.clone(),
                location: Location::Body,
                required: parameter.required,
                ty: compile(&parameter.name, &parameter.type_name)?,
            });
        }

        trace!(command = %spec.command, %method, endpoint, "bound command");

        Ok(Self {
            method,
            endpoint: endpoint.to_string(),
            spec: spec.clone(),
            parameters,
        })
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.spec.command
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Endpoint template.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The metadata the command was bound from.
    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Usage line listing variables then parameters.
    pub fn usage(&self) -> String {
        self.spec.usage()
    }

    /// Number of arguments a call must supply at least.
    pub fn required_arguments(&self) -> usize {
        self.parameters.iter().filter(|p| p.required).count()
    }

    /// Number of arguments a call may supply at most.
    pub fn max_arguments(&self) -> usize {
        self.parameters.len()
    }

    /// Validate `args` and render the request they describe.
    pub fn prepare(&self, args: &[Argument]) -> DriverResult<PreparedRequest> {
        if args.len() < self.required_arguments() || args.len() > self.max_arguments() {
            return Err(DriverError::WrongParameters {
                command: self.name().to_string(),
                usage: self.usage(),
            });
        }

        let mut endpoint = self.endpoint.clone();
        let mut body = Map::new();

        for (parameter, arg) in self.parameters.iter().zip(args) {
            if !parameter.ty.accepts(arg) {
                if arg.is_undefined() && !parameter.required {
                    continue;
                }
                return Err(DriverError::MalformedParameter {
                    command: self.name().to_string(),
                    parameter: parameter.name.clone(),
                    expected: parameter.ty.descriptor().to_string(),
                    actual: argument_type(arg).to_string(),
                });
            }

            let Some(value) = arg.to_json() else {
                continue;
            };
            match parameter.location {
                Location::Path => {
                    let text = display_text(&value);
                    let encoded = utf8_percent_encode(&text, PATH_COMPONENT).to_string();
                    let placeholder = format!(":{}", parameter.name);
                    endpoint = replace_segment(&endpoint, &placeholder, &encoded);
                }
                Location::Body => {
                    body.insert(parameter.name.clone(), value);
                }
            }
        }

        Ok(PreparedRequest {
            command: self.name().to_string(),
            method: self.method,
            endpoint,
            body,
            is_hub_command: self.spec.is_hub_command,
        })
    }

    /// Prepare, send and classify one call.
    pub fn invoke(&self, ctx: &CallContext<'_>, args: &[Argument]) -> DriverResult<Value> {
        let prepared = self.prepare(args)?;
        info!("COMMAND {}", command_call_structure(self.name(), args));

        let request = prepared.to_wire(ctx.base_url, ctx.session_id)?;
        if let Some(body) = &request.body {
            debug!("DATA {body}");
        }

        let value = ctx.transport.send(&request)?.into_result()?;
        if !value.is_null() {
            info!("RESULT {}", result_for_log(self.name(), &value));
        }
        Ok(value)
    }

    /// Shareable invocation function calling [`invoke`](Self::invoke).
    pub fn invocation(self: &Arc<Self>) -> CommandFn {
        let command = Arc::clone(self);
        command_fn(move |ctx, args| command.invoke(ctx, args))
    }
}

fn result_for_log(command: &str, value: &Value) -> String {
    let lowered = command.to_lowercase();
    let is_media = lowered.contains("screenshot") || lowered.contains("recording");
    match value {
        Value::String(s) if is_media && s.chars().count() > 64 => {
            let head: String = s.chars().take(RESULT_PREVIEW_LEN).collect();
            format!("{head}...")
        }
        other => summarize(other, RESULT_LOG_LIMIT),
    }
}

/// Replace every path segment equal to `placeholder`.
fn replace_segment(template: &str, placeholder: &str, value: &str) -> String {
    template
        .split('/')
        .map(|segment| if segment == placeholder { value } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

/// A validated call, not yet tied to a server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedRequest {
    /// Command name.
    pub command: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Endpoint with path variables substituted. `:sessionId` is left in
    /// place until [`to_wire`](Self::to_wire).
    pub endpoint: String,
    /// Body parameters by name.
    pub body: Map<String, Value>,
    /// Routed to the server root instead of the session's base path.
    pub is_hub_command: bool,
}

impl PreparedRequest {
    /// The endpoint contains a `:sessionId` segment.
    pub fn needs_session(&self) -> bool {
        self.endpoint
            .split('/')
            .any(|segment| segment == SESSION_ID_PLACEHOLDER)
    }

    /// Resolve against a server.
    ///
    /// The endpoint is appended to the path of `base`, or to the server root
    /// for hub commands. Body parameters of `GET`/`DELETE` requests become
    /// query pairs; `POST`/`PUT` requests always carry a JSON body.
    pub fn to_wire(&self, base: &Url, session_id: Option<&str>) -> DriverResult<WireRequest> {
        if base.cannot_be_a_base() {
            return Err(DriverError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let mut path = self.endpoint.clone();
        if self.needs_session() {
            let id = session_id.ok_or_else(|| DriverError::MissingSession(self.command.clone()))?;
            let encoded = utf8_percent_encode(id, PATH_COMPONENT).to_string();
            path = replace_segment(&path, SESSION_ID_PLACEHOLDER, &encoded);
        }

        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if self.is_hub_command {
            url.set_path(&path);
        } else {
            let prefix = base.path().trim_end_matches('/');
            url.set_path(&format!("{prefix}{path}"));
        }

        let body = if self.method.carries_body() {
            Some(serde_json::to_string(&self.body)?)
        } else {
            if !self.body.is_empty() {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in &self.body {
                    pairs.append_pair(key, &display_text(value));
                }
            }
            None
        };

        Ok(WireRequest {
            command: self.command.clone(),
            method: self.method,
            url,
            body,
        })
    }
}

/// What an invocation runs against: the transport, the server and the session.
#[derive(Clone, Copy)]
pub struct CallContext<'a> {
    /// Sends the rendered request.
    pub transport: &'a dyn Transport,
    /// Base URL of the server, including any path prefix such as `/wd/hub`.
    pub base_url: &'a Url,
    /// Negotiated session id, if a session exists.
    pub session_id: Option<&'a str>,
}

impl<'a> CallContext<'a> {
    /// Context without a session.
    pub fn new(transport: &'a dyn Transport, base_url: &'a Url) -> Self {
        Self {
            transport,
            base_url,
            session_id: None,
        }
    }

    /// Attach a session id.
    #[must_use]
    pub fn with_session(mut self, session_id: &'a str) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

impl fmt::Debug for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("transport", &self.transport)
            .field("base_url", &self.base_url.as_str())
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// A shareable invocation function.
pub type CommandFn = Arc<dyn Fn(&CallContext<'_>, &[Argument]) -> DriverResult<Value> + Send + Sync>;

/// Wrap a closure as a [`CommandFn`].
pub fn command_fn<F>(f: F) -> CommandFn
where
    F: Fn(&CallContext<'_>, &[Argument]) -> DriverResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}
