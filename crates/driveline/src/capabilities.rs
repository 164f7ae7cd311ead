//! Capability records.
//!
//! Capabilities arrive as arbitrary JSON with no fixed schema: keys may be
//! missing, `null`, or carry a value of an unexpected type. [`Capabilities`]
//! parses such a record tolerantly into typed [`Slot`]s so that classification
//! (see [`crate::environment`]) can be written as plain functions over typed
//! fields while keeping the permissive presence/truthiness semantics servers
//! rely on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys whose mere presence marks a mobile session, in all historical
/// spellings.
pub const MOBILE_MARKER_KEYS: [&str; 5] = [
    "appium-version",
    "device-type",
    "deviceType",
    "device-orientation",
    "deviceOrientation",
];

/// Vendor-prefixed chromedriver options key.
pub const CHROME_OPTIONS_KEY: &str = "goog:chromeOptions";

/// Sauce Labs vendor options key.
pub const SAUCE_OPTIONS_KEY: &str = "sauce:options";

/// Session id key set by legacy Selenium standalone servers.
pub const LEGACY_SESSION_ID_KEY: &str = "webdriver.remote.sessionid";

/// One capability value, reduced to its shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    /// Key absent from the record.
    #[default]
    Missing,
    /// Key present with `null`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// String value.
    Text(String),
    /// Array value; contents are not inspected.
    Array,
    /// Object value; contents are not inspected.
    Object,
}

impl Slot {
    /// Reduce an optional JSON value to a slot.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None => Self::Missing,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(b)) => Self::Bool(*b),
            Some(Value::Number(n)) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }

    /// The key exists, whatever its value.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// The value is truthy (see the crate-level notes on truthiness).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Missing | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::Array | Self::Object => true,
        }
    }

    /// String content, if the value is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Case-insensitive substring test on string values; `false` for every
    /// other shape.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.as_text()
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase()))
    }
}

/// Typed view over a capabilities record.
///
/// Only the keys classification looks at are retained. Build it with
/// [`Capabilities::from_value`] or deserialize it from any JSON document; a
/// document that is not an object yields the empty record.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Value")]
pub struct Capabilities {
    /// `browserName`
    pub browser_name: Slot,
    /// `browserVersion`
    pub browser_version: Slot,
    /// `platformName`
    pub platform_name: Slot,
    /// `platformVersion`
    pub platform_version: Slot,
    /// `automationName`
    pub automation_name: Slot,
    /// `deviceName`
    pub device_name: Slot,
    /// `setWindowRect`
    pub set_window_rect: Slot,
    /// `chrome`
    pub chrome: Slot,
    /// `goog:chromeOptions`
    pub chrome_options: Slot,
    /// Which of [`MOBILE_MARKER_KEYS`] are present.
    pub mobile_markers: Vec<String>,
    /// `extendedDebugging`
    pub extended_debugging: Slot,
    /// `sauce:options.extendedDebugging`
    pub sauce_extended_debugging: Slot,
    /// `webdriver.remote.sessionid`
    pub legacy_session_id: Slot,
}

impl Capabilities {
    /// Parse a record. Anything other than a JSON object is treated as an
    /// empty record.
    pub fn from_value(value: &Value) -> Self {
        value.as_object().map(Self::from_map).unwrap_or_default()
    }

    /// Parse a record from a JSON object.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let slot = |key: &str| Slot::from_value(map.get(key));

        let mobile_markers = MOBILE_MARKER_KEYS
            .iter()
            .filter(|key| map.contains_key(**key))
            .map(|key| (*key).to_string())
            .collect();

        let sauce_extended_debugging = Slot::from_value(
            map.get(SAUCE_OPTIONS_KEY)
                .and_then(|options| options.get("extendedDebugging")),
        );

        Self {
            browser_name: slot("browserName"),
            browser_version: slot("browserVersion"),
            platform_name: slot("platformName"),
            platform_version: slot("platformVersion"),
            automation_name: slot("automationName"),
            device_name: slot("deviceName"),
            set_window_rect: slot("setWindowRect"),
            chrome: slot("chrome"),
            chrome_options: slot(CHROME_OPTIONS_KEY),
            mobile_markers,
            extended_debugging: slot("extendedDebugging"),
            sauce_extended_debugging,
            legacy_session_id: slot(LEGACY_SESSION_ID_KEY),
        }
    }
}

impl From<Value> for Capabilities {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl From<&Value> for Capabilities {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

/// The W3C capability request block.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct W3cCapabilities {
    /// Capabilities every matched configuration must satisfy.
    pub always_match: Map<String, Value>,
    /// Alternative configurations, tried in order.
    pub first_match: Vec<Map<String, Value>>,
}

/// Capabilities the client asked for when the session was created.
///
/// Vendor checks that servers may drop from the negotiated record are
/// evaluated against this block instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct RequestedCapabilities {
    /// `w3cCaps`
    pub w3c_caps: W3cCapabilities,
}

impl RequestedCapabilities {
    /// Request with the given `alwaysMatch` block and no `firstMatch` entries.
    pub fn with_always_match(always_match: Map<String, Value>) -> Self {
        Self {
            w3c_caps: W3cCapabilities {
                always_match,
                first_match: Vec::new(),
            },
        }
    }

    /// Parse `{ "w3cCaps": { "alwaysMatch": {..}, "firstMatch": [..] } }`.
    /// Missing or mis-shaped blocks are treated as empty.
    pub fn from_value(value: &Value) -> Self {
        let w3c = value.get("w3cCaps");
        let always_match = w3c
            .and_then(|caps| caps.get("alwaysMatch"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let first_match = w3c
            .and_then(|caps| caps.get("firstMatch"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_object)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            w3c_caps: W3cCapabilities {
                always_match,
                first_match,
            },
        }
    }

    /// The `alwaysMatch` block as a typed record.
    pub fn always_match(&self) -> Capabilities {
        Capabilities::from_map(&self.w3c_caps.always_match)
    }
}

impl From<Value> for RequestedCapabilities {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}
