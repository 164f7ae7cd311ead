//! Session environment classification.
//!
//! Each predicate is a pure function over a parsed [`Capabilities`] record.
//! [`EnvironmentFlags::detect`] runs all of them once per session; the result
//! drives definition-set selection in [`crate::table`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::capabilities::{Capabilities, RequestedCapabilities};

/// Dialect, browser family and vendor characteristics of one session.
///
/// Flags are independent: a session may be W3C and mobile and Sauce at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EnvironmentFlags {
    /// Speaks the W3C WebDriver dialect.
    #[serde(rename = "isW3C")]
    pub is_w3c: bool,
    /// Driven by chromedriver.
    #[serde(rename = "isChrome")]
    pub is_chrome: bool,
    /// Mobile device or emulator.
    #[serde(rename = "isMobile")]
    pub is_mobile: bool,
    /// iOS device.
    #[serde(rename = "isIOS")]
    pub is_ios: bool,
    /// Android device.
    #[serde(rename = "isAndroid")]
    pub is_android: bool,
    /// Sauce Labs session with extended debugging.
    #[serde(rename = "isSauce")]
    pub is_sauce: bool,
    /// Legacy Selenium standalone server.
    #[serde(rename = "isSeleniumStandalone")]
    pub is_selenium_standalone: bool,
}

impl EnvironmentFlags {
    /// Classify a session.
    ///
    /// `hostname` is recorded for diagnostics only. The Sauce check runs on
    /// the requested `alwaysMatch` block because servers may strip vendor
    /// options from the negotiated record.
    pub fn detect(
        hostname: &str,
        capabilities: &Capabilities,
        requested: &RequestedCapabilities,
    ) -> Self {
        let flags = Self {
            is_w3c: is_w3c(capabilities),
            is_chrome: is_chrome(capabilities),
            is_mobile: is_mobile(capabilities),
            is_ios: is_ios(capabilities),
            is_android: is_android(capabilities),
            is_sauce: is_sauce(&requested.always_match()),
            is_selenium_standalone: is_selenium_standalone(capabilities),
        };
        debug!(hostname, ?flags, "classified session environment");
        flags
    }

    /// Classify a session from raw JSON records.
    pub fn from_values(hostname: &str, capabilities: &Value, requested: &Value) -> Self {
        Self::detect(
            hostname,
            &Capabilities::from_value(capabilities),
            &RequestedCapabilities::from_value(requested),
        )
    }

    /// The flags as `(property name, value)` pairs, in publication order.
    pub fn properties(&self) -> [(&'static str, bool); 7] {
        [
            ("isW3C", self.is_w3c),
            ("isMobile", self.is_mobile),
            ("isIOS", self.is_ios),
            ("isAndroid", self.is_android),
            ("isChrome", self.is_chrome),
            ("isSauce", self.is_sauce),
            ("isSeleniumStandalone", self.is_selenium_standalone),
        ]
    }

    /// No flag is set.
    pub fn is_plain(&self) -> bool {
        self.properties().iter().all(|(_, set)| !set)
    }
}

/// W3C dialect: an Appium-style record (`automationName` or `deviceName`), or
/// `platformName` and `browserVersion` together with either `platformVersion`
/// or a `setWindowRect` key.
pub fn is_w3c(caps: &Capabilities) -> bool {
    let is_appium = caps.automation_name.is_truthy() || caps.device_name.is_truthy();
    let has_w3c_caps = caps.platform_name.is_truthy()
        && caps.browser_version.is_truthy()
        && (caps.platform_version.is_truthy() || caps.set_window_rect.is_present());
    has_w3c_caps || is_appium
}

/// Chromedriver session.
pub fn is_chrome(caps: &Capabilities) -> bool {
    caps.chrome.is_truthy() || caps.chrome_options.is_truthy()
}

/// Mobile session. Marker keys count when present with any value.
pub fn is_mobile(caps: &Capabilities) -> bool {
    if !caps.mobile_markers.is_empty() || caps.device_name.is_present() {
        return true;
    }
    match caps.browser_name.as_text() {
        Some(name) => {
            name.is_empty() || ["ipad", "iphone", "android"].contains(&name.to_lowercase().as_str())
        }
        None => false,
    }
}

/// iOS session.
pub fn is_ios(caps: &Capabilities) -> bool {
    caps.platform_name.contains_ignore_case("ios")
        || caps.device_name.contains_ignore_case("ipad")
        || caps.device_name.contains_ignore_case("iphone")
}

/// Android session.
pub fn is_android(caps: &Capabilities) -> bool {
    caps.platform_name.contains_ignore_case("android")
        || caps.browser_name.contains_ignore_case("android")
}

/// Sauce Labs session with extended debugging enabled, either at the top
/// level or inside `sauce:options`.
pub fn is_sauce(caps: &Capabilities) -> bool {
    caps.extended_debugging.is_truthy() || caps.sauce_extended_debugging.is_truthy()
}

/// Legacy Selenium standalone server.
pub fn is_selenium_standalone(caps: &Capabilities) -> bool {
    caps.legacy_session_id.is_truthy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn caps(value: Value) -> Capabilities {
        Capabilities::from_value(&value)
    }

    #[test]
    fn test_w3c_detection() {
        assert!(is_w3c(&caps(json!({ "automationName": "XCUITest" }))));
        assert!(is_w3c(&caps(json!({ "deviceName": "Pixel" }))));
        assert!(is_w3c(&caps(json!({
            "platformName": "linux",
            "browserVersion": "120",
            "setWindowRect": null
        }))));
        assert!(is_w3c(&caps(json!({
            "platformName": "mac",
            "browserVersion": "17",
            "platformVersion": "14"
        }))));
        // platformVersion alone is not enough without browserVersion
        assert!(!is_w3c(&caps(json!({ "platformName": "linux", "platformVersion": "6" }))));
        assert!(!is_w3c(&caps(json!({ "platformName": "linux", "browserVersion": "120" }))));
        assert!(!is_w3c(&caps(json!({ "deviceName": "" }))));
    }

    #[test]
    fn test_mobile_detection() {
        assert!(is_mobile(&caps(json!({ "deviceOrientation": null }))));
        assert!(is_mobile(&caps(json!({ "deviceName": null }))));
        assert!(is_mobile(&caps(json!({ "browserName": "" }))));
        assert!(is_mobile(&caps(json!({ "browserName": "iPad" }))));
        assert!(is_mobile(&caps(json!({ "browserName": "ANDROID" }))));
        assert!(!is_mobile(&caps(json!({ "browserName": "chrome" }))));
        assert!(!is_mobile(&caps(json!({ "browserName": null }))));
    }

    #[test]
    fn test_platform_detection() {
        let ios = caps(json!({ "platformName": "iOS" }));
        assert!(is_ios(&ios));
        assert!(!is_android(&ios));

        assert!(is_ios(&caps(json!({ "deviceName": "iPhone 15 Simulator" }))));
        assert!(is_android(&caps(json!({ "browserName": "Android" }))));
        assert!(is_android(&caps(json!({ "platformName": "android" }))));
        assert!(!is_ios(&caps(json!({ "platformName": 1 }))));
    }

    #[test]
    fn test_vendor_detection() {
        assert!(is_chrome(&caps(json!({ "goog:chromeOptions": { "args": [] } }))));
        assert!(is_chrome(&caps(json!({ "chrome": true }))));
        assert!(!is_chrome(&caps(json!({ "chrome": false }))));

        assert!(is_selenium_standalone(&caps(json!({ "webdriver.remote.sessionid": "abc" }))));
        assert!(!is_selenium_standalone(&caps(json!({ "webdriver.remote.sessionid": "" }))));

        assert!(is_sauce(&caps(json!({ "extendedDebugging": true }))));
        assert!(is_sauce(&caps(json!({ "sauce:options": { "extendedDebugging": 1 } }))));
        assert!(!is_sauce(&caps(json!({ "sauce:options": {} }))));
    }

    #[test]
    fn test_sauce_uses_requested_capabilities() {
        let flags = EnvironmentFlags::from_values(
            "ondemand.saucelabs.com",
            &json!({ "extendedDebugging": true }),
            &json!({ "w3cCaps": { "alwaysMatch": {} } }),
        );
        assert!(!flags.is_sauce);

        let flags = EnvironmentFlags::from_values(
            "localhost",
            &json!({}),
            &json!({ "w3cCaps": { "alwaysMatch": { "sauce:options": { "extendedDebugging": true } } } }),
        );
        assert!(flags.is_sauce);
    }

    #[test]
    fn test_falsy_records_yield_plain_flags() {
        for value in [json!(null), json!(false), json!(""), json!({})] {
            let flags = EnvironmentFlags::from_values("localhost", &value, &json!(null));
            assert!(flags.is_plain(), "{value} produced {flags:?}");
        }
    }

    #[test]
    fn test_flags_serialize_with_property_names() {
        let flags = EnvironmentFlags {
            is_w3c: true,
            is_ios: true,
            ..Default::default()
        };
        let value = serde_json::to_value(flags).unwrap();
        assert_eq!(value["isW3C"], json!(true));
        assert_eq!(value["isIOS"], json!(true));
        assert_eq!(value["isSeleniumStandalone"], json!(false));
        assert_eq!(flags.properties()[0], ("isW3C", true));
    }
}
