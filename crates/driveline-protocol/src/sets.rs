//! The family of definition sets a command table is assembled from.

use crate::definition::ProtocolDefinition;
use crate::error::ProtocolResult;

const WEBDRIVER_JSON: &str = include_str!("../protocol/webdriver.json");
const JSONWP_JSON: &str = include_str!("../protocol/jsonwp.json");
const MJSONWP_JSON: &str = include_str!("../protocol/mjsonwp.json");
const APPIUM_JSON: &str = include_str!("../protocol/appium.json");
const CHROMIUM_JSON: &str = include_str!("../protocol/chromium.json");
const SAUCELABS_JSON: &str = include_str!("../protocol/saucelabs.json");
const SELENIUM_JSON: &str = include_str!("../protocol/selenium.json");

/// Which member of [`DefinitionSets`] a set fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetKind {
    /// W3C WebDriver.
    WebDriver,
    /// Legacy JSON Wire Protocol.
    JsonWireProtocol,
    /// Mobile JSON Wire Protocol extensions.
    MobileJsonWireProtocol,
    /// Appium device-automation extensions.
    Appium,
    /// Chromedriver extensions.
    Chromium,
    /// Sauce Labs extensions.
    SauceLabs,
    /// Selenium standalone / grid extensions.
    Selenium,
}

impl SetKind {
    /// All kinds, in the order they are layered when every flag is set.
    pub const ALL: [Self; 7] = [
        Self::JsonWireProtocol,
        Self::WebDriver,
        Self::MobileJsonWireProtocol,
        Self::Appium,
        Self::Chromium,
        Self::SauceLabs,
        Self::Selenium,
    ];

    /// Short name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Self::WebDriver => "webdriver",
            Self::JsonWireProtocol => "jsonwp",
            Self::MobileJsonWireProtocol => "mjsonwp",
            Self::Appium => "appium",
            Self::Chromium => "chromium",
            Self::SauceLabs => "saucelabs",
            Self::Selenium => "selenium",
        }
    }
}

/// Every definition set known to the client. Any of them may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionSets {
    /// W3C WebDriver base dialect.
    pub webdriver: ProtocolDefinition,
    /// Legacy JSON Wire Protocol base dialect.
    pub jsonwp: ProtocolDefinition,
    /// Mobile JSON Wire Protocol extensions.
    pub mjsonwp: ProtocolDefinition,
    /// Appium extensions.
    pub appium: ProtocolDefinition,
    /// Chromedriver extensions.
    pub chromium: ProtocolDefinition,
    /// Sauce Labs extensions.
    pub saucelabs: ProtocolDefinition,
    /// Selenium standalone / grid extensions.
    pub selenium: ProtocolDefinition,
}

impl DefinitionSets {
    /// All sets empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The definition sets shipped with this crate.
    pub fn bundled() -> ProtocolResult<Self> {
        Ok(Self {
            webdriver: ProtocolDefinition::from_json(WEBDRIVER_JSON)?,
            jsonwp: ProtocolDefinition::from_json(JSONWP_JSON)?,
            mjsonwp: ProtocolDefinition::from_json(MJSONWP_JSON)?,
            appium: ProtocolDefinition::from_json(APPIUM_JSON)?,
            chromium: ProtocolDefinition::from_json(CHROMIUM_JSON)?,
            saucelabs: ProtocolDefinition::from_json(SAUCELABS_JSON)?,
            selenium: ProtocolDefinition::from_json(SELENIUM_JSON)?,
        })
    }

    /// Borrow the set of the given kind.
    pub fn get(&self, kind: SetKind) -> &ProtocolDefinition {
        match kind {
            SetKind::WebDriver => &self.webdriver,
            SetKind::JsonWireProtocol => &self.jsonwp,
            SetKind::MobileJsonWireProtocol => &self.mjsonwp,
            SetKind::Appium => &self.appium,
            SetKind::Chromium => &self.chromium,
            SetKind::SauceLabs => &self.saucelabs,
            SetKind::Selenium => &self.selenium,
        }
    }

    /// Replace the set of the given kind.
    #[must_use]
    pub fn with_set(mut self, kind: SetKind, set: ProtocolDefinition) -> Self {
        let slot = match kind {
            SetKind::WebDriver => &mut self.webdriver,
            SetKind::JsonWireProtocol => &mut self.jsonwp,
            SetKind::MobileJsonWireProtocol => &mut self.mjsonwp,
            SetKind::Appium => &mut self.appium,
            SetKind::Chromium => &mut self.chromium,
            SetKind::SauceLabs => &mut self.saucelabs,
            SetKind::Selenium => &mut self.selenium,
        };
        *slot = set;
        self
    }
}
