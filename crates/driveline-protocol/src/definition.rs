//! Protocol definition sets.
//!
//! A definition set maps an endpoint template (`/session/:sessionId/url`) to the
//! HTTP methods it accepts, and each method to the command metadata that names
//! it and describes its parameters. Sets are authored independently and layered
//! on top of each other; see [`ProtocolDefinition::merge`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// HTTP method an endpoint is invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ProtocolError::UnknownMethod(s.to_string())),
        }
    }
}

/// A path variable of an endpoint template, e.g. `elementId` in
/// `/session/:sessionId/element/:elementId/click`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name, without the leading colon.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A body parameter accepted by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Key of the parameter in the request body.
    pub name: String,
    /// Type descriptor, e.g. `string`, `number[]` or `(string|object)`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the caller must supply this parameter.
    #[serde(default)]
    pub required: bool,
}

/// Metadata for one endpoint/method pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Command name the pair is exposed under.
    pub command: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to the upstream protocol documentation.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Path variables, in the order callers pass them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    /// Body parameters, in the order callers pass them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Routed to the grid hub instead of the session's node.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_hub_command: bool,
}

impl CommandSpec {
    /// Create a command with no variables or parameters.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: None,
            reference: None,
            variables: Vec::new(),
            parameters: Vec::new(),
            is_hub_command: false,
        }
    }

    /// Add a path variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variables.push(Variable {
            name: name.into(),
            description: None,
        });
        self
    }

    /// Add a body parameter.
    #[must_use]
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        required: bool,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            type_name: type_name.into(),
            description: None,
            required,
        });
        self
    }

    /// Add a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the metadata against the endpoint template it is declared under:
    /// the command must be named and every declared variable must appear as a
    /// `:name` segment of the template.
    pub fn validate(&self, endpoint: &str) -> ProtocolResult<()> {
        let invalid = |reason: String| ProtocolError::Invalid {
            command: self.command.clone(),
            endpoint: endpoint.to_string(),
            reason,
        };

        if self.command.trim().is_empty() {
            return Err(invalid("command name is empty".to_string()));
        }

        for variable in &self.variables {
            let placeholder = format!(":{}", variable.name);
            let declared = endpoint.split('/').any(|segment| segment == placeholder);
            if !declared {
                return Err(invalid(format!(
                    "variable {} is not part of the endpoint",
                    variable.name
                )));
            }
        }

        Ok(())
    }

    /// Usage line, e.g. `elementClick(elementId)`.
    pub fn usage(&self) -> String {
        let names: Vec<&str> = self
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .chain(self.parameters.iter().map(|p| p.name.as_str()))
            .collect();
        format!("{}({})", self.command, names.join(", "))
    }
}

/// All methods declared for one endpoint template, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDefinition {
    template: String,
    methods: Vec<(HttpMethod, CommandSpec)>,
}

impl EndpointDefinition {
    /// Endpoint template, e.g. `/session/:sessionId/url`.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared methods with their command metadata.
    pub fn methods(&self) -> impl Iterator<Item = (HttpMethod, &CommandSpec)> {
        self.methods.iter().map(|(method, spec)| (*method, spec))
    }

    /// Command metadata for `method`, if declared.
    pub fn get(&self, method: HttpMethod) -> Option<&CommandSpec> {
        self.methods
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, spec)| spec)
    }

    fn upsert(&mut self, method: HttpMethod, spec: CommandSpec) {
        match self.methods.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = spec,
            None => self.methods.push((method, spec)),
        }
    }
}

/// A protocol definition set.
///
/// Endpoints keep their first-insertion position; merging a later set replaces
/// metadata for an existing endpoint/method pair in place and appends new
/// endpoints at the end. Iteration order is therefore deterministic and mirrors
/// the order the sets were layered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolDefinition {
    endpoints: Vec<EndpointDefinition>,
    index: HashMap<String, usize>,
}

impl ProtocolDefinition {
    /// Create an empty definition set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a definition set from its JSON form:
    ///
    /// ```json
    /// { "/session/:sessionId/url": { "GET": { "command": "getUrl" } } }
    /// ```
    pub fn from_json(content: &str) -> ProtocolResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Build a definition set from an already-parsed JSON value.
    ///
    /// Endpoint order follows the document order of the input object.
    pub fn from_value(value: Value) -> ProtocolResult<Self> {
        let Value::Object(endpoints) = value else {
            return Err(ProtocolError::Shape(
                "definition set must be an object keyed by endpoint".to_string(),
            ));
        };

        let mut definition = Self::new();
        for (template, methods) in endpoints {
            let Value::Object(methods) = methods else {
                return Err(ProtocolError::Shape(format!(
                    "endpoint {template} must map HTTP methods to commands"
                )));
            };
            for (method, spec) in methods {
                let method: HttpMethod = method.parse()?;
                let spec: CommandSpec =
                    serde_json::from_value(spec).map_err(|e| ProtocolError::Command {
                        endpoint: template.clone(),
                        method: method.to_string(),
                        reason: e.to_string(),
                    })?;
                definition.insert(template.clone(), method, spec);
            }
        }
        Ok(definition)
    }

    /// Declare (or replace) the command for an endpoint/method pair.
    pub fn insert(&mut self, template: impl Into<String>, method: HttpMethod, spec: CommandSpec) {
        let template = template.into();
        match self.index.get(&template) {
            Some(&position) => self.endpoints[position].upsert(method, spec),
            None => {
                self.index.insert(template.clone(), self.endpoints.len());
                self.endpoints.push(EndpointDefinition {
                    template,
                    methods: vec![(method, spec)],
                });
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, template: impl Into<String>, method: HttpMethod, spec: CommandSpec) -> Self {
        self.insert(template, method, spec);
        self
    }

    /// Layer `other` on top of this set. Later metadata wins for the same
    /// endpoint/method pair; methods unknown to `self` are added.
    pub fn merge(&mut self, other: &Self) {
        for endpoint in &other.endpoints {
            for (method, spec) in &endpoint.methods {
                self.insert(endpoint.template.clone(), *method, spec.clone());
            }
        }
    }

    /// Merge a sequence of sets in order into a new set.
    pub fn merged<'a>(sets: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut merged = Self::new();
        for set in sets {
            merged.merge(set);
        }
        merged
    }

    /// Endpoint definitions in iteration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &EndpointDefinition> {
        self.endpoints.iter()
    }

    /// Flattened `(template, method, spec)` triples in iteration order.
    pub fn commands(&self) -> impl Iterator<Item = (&str, HttpMethod, &CommandSpec)> {
        self.endpoints.iter().flat_map(|endpoint| {
            endpoint
                .methods()
                .map(move |(method, spec)| (endpoint.template(), method, spec))
        })
    }

    /// Look up the command declared for an endpoint/method pair.
    pub fn get(&self, template: &str, method: HttpMethod) -> Option<&CommandSpec> {
        self.index
            .get(template)
            .and_then(|&position| self.endpoints[position].get(method))
    }

    /// Number of endpoint/method pairs.
    pub fn len(&self) -> usize {
        self.endpoints.iter().map(|e| e.methods.len()).sum()
    }

    /// `true` when no endpoint is declared.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const URL_SET: &str = r#"{
        "/session/:sessionId/url": {
            "GET": { "command": "getUrl", "parameters": [] },
            "POST": {
                "command": "navigateTo",
                "ref": "https://w3c.github.io/webdriver/#dfn-navigate-to",
                "parameters": [
                    { "name": "url", "type": "string", "description": "url to navigate to", "required": true }
                ]
            }
        },
        "/session/:sessionId/element/:elementId/click": {
            "POST": {
                "command": "elementClick",
                "variables": [{ "name": "elementId", "description": "the id of an element" }]
            }
        }
    }"#;

    #[test]
    fn test_parse_definition_set() {
        let set = ProtocolDefinition::from_json(URL_SET).unwrap();

        assert_eq!(set.len(), 3);
        let navigate = set.get("/session/:sessionId/url", HttpMethod::Post).unwrap();
        assert_eq!(navigate.command, "navigateTo");
        assert_eq!(navigate.parameters[0].type_name, "string");
        assert!(navigate.parameters[0].required);

        let click = set
            .get("/session/:sessionId/element/:elementId/click", HttpMethod::Post)
            .unwrap();
        assert_eq!(click.variables[0].name, "elementId");
        assert!(click.parameters.is_empty());
    }

    #[test]
    fn test_document_order_preserved() {
        let set = ProtocolDefinition::from_json(URL_SET).unwrap();
        let names: Vec<_> = set.commands().map(|(_, _, spec)| spec.command.as_str()).collect();
        assert_eq!(names, vec!["getUrl", "navigateTo", "elementClick"]);
    }

    #[test]
    fn test_merge_replaces_pair_and_appends_new() {
        let mut base = ProtocolDefinition::new()
            .with("/status", HttpMethod::Get, CommandSpec::new("status"))
            .with("/a", HttpMethod::Get, CommandSpec::new("getA"));
        let overlay = ProtocolDefinition::new()
            .with("/a", HttpMethod::Get, CommandSpec::new("getAOverlay"))
            .with("/a", HttpMethod::Post, CommandSpec::new("setA"))
            .with("/b", HttpMethod::Delete, CommandSpec::new("deleteB"));

        base.merge(&overlay);

        let flattened: Vec<_> = base
            .commands()
            .map(|(t, m, s)| (t.to_string(), m, s.command.clone()))
            .collect();
        assert_eq!(
            flattened,
            vec![
                ("/status".to_string(), HttpMethod::Get, "status".to_string()),
                ("/a".to_string(), HttpMethod::Get, "getAOverlay".to_string()),
                ("/a".to_string(), HttpMethod::Post, "setA".to_string()),
                ("/b".to_string(), HttpMethod::Delete, "deleteB".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_method() {
        let result = ProtocolDefinition::from_json(r#"{ "/x": { "PATCH": { "command": "x" } } }"#);
        assert!(matches!(result, Err(ProtocolError::UnknownMethod(m)) if m == "PATCH"));
    }

    #[test]
    fn test_rejects_non_object_shapes() {
        assert!(matches!(
            ProtocolDefinition::from_json("[]"),
            Err(ProtocolError::Shape(_))
        ));
        assert!(matches!(
            ProtocolDefinition::from_json(r#"{ "/x": "GET" }"#),
            Err(ProtocolError::Shape(_))
        ));
        assert!(matches!(
            ProtocolDefinition::from_json(r#"{ "/x": { "GET": { "description": "no name" } } }"#),
            Err(ProtocolError::Command { .. })
        ));
    }

    #[test]
    fn test_empty_set() {
        let set = ProtocolDefinition::from_json("{}").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_validate_variables_against_endpoint() {
        let click = CommandSpec::new("elementClick").with_variable("elementId");
        assert!(click.validate("/session/:sessionId/element/:elementId/click").is_ok());
        assert!(matches!(
            click.validate("/session/:sessionId/element/:elementIdx/click"),
            Err(ProtocolError::Invalid { .. })
        ));
        assert!(matches!(
            CommandSpec::new(" ").validate("/status"),
            Err(ProtocolError::Invalid { .. })
        ));
    }

    #[test]
    fn test_usage_lists_variables_then_parameters() {
        let spec = CommandSpec::new("elementSendKeys")
            .with_variable("elementId")
            .with_parameter("text", "string", true);
        assert_eq!(spec.usage(), "elementSendKeys(elementId, text)");
    }

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert!(HttpMethod::Post.carries_body());
        assert!(!HttpMethod::Get.carries_body());
    }
}
