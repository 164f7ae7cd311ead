//! Command table assembly against bundled and synthetic definition sets.

use driveline::{
    CommandSpec, CommandTable, DefinitionSets, EnvironmentFlags, HttpMethod, ProtocolDefinition,
    SetKind, select_definitions,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn bundled() -> DefinitionSets {
    DefinitionSets::bundled().unwrap()
}

fn w3c() -> EnvironmentFlags {
    EnvironmentFlags {
        is_w3c: true,
        ..Default::default()
    }
}

#[test]
fn test_plain_session_uses_legacy_dialect() {
    let table = CommandTable::build(&EnvironmentFlags::default(), &bundled()).unwrap();

    let handle = table.command("getWindowHandle").unwrap();
    assert_eq!(handle.endpoint(), "/session/:sessionId/window_handle");
    assert!(table.command("getWindowRect").is_none());
    assert!(table.command("getNetworkConditions").is_none());
}

#[test]
fn test_w3c_session_uses_webdriver_dialect() {
    let table = CommandTable::build(&w3c(), &bundled()).unwrap();

    assert_eq!(
        table.command("getWindowHandle").unwrap().endpoint(),
        "/session/:sessionId/window"
    );
    assert!(table.command("getWindowRect").is_some());
    // legacy-only commands are absent
    assert!(table.command("getElementLocation").is_none());
    assert!(table.command("touchClick").is_none());
}

#[test]
fn test_mobile_session_gets_both_dialects_and_extensions() {
    let flags = EnvironmentFlags {
        is_mobile: true,
        is_android: true,
        ..Default::default()
    };
    let table = CommandTable::build(&flags, &bundled()).unwrap();

    // legacy-only, W3C-only and mobile-only commands side by side
    assert!(table.command("getElementLocation").is_some());
    assert!(table.command("getWindowRect").is_some());
    assert!(table.command("touchClick").is_some());
    assert!(table.command("shake").is_some());

    // the W3C set is layered after the legacy one
    assert_eq!(
        table.command("getWindowHandle").unwrap().endpoint(),
        "/session/:sessionId/window"
    );

    // the device-automation set is layered after the legacy set
    let orientation = table.command("getOrientation").unwrap();
    assert!(
        orientation
            .spec()
            .reference
            .as_deref()
            .unwrap()
            .contains("appium.io")
    );
}

#[test]
fn test_vendor_sets_follow_their_flags() {
    let sets = bundled();

    let chrome = EnvironmentFlags {
        is_chrome: true,
        ..w3c()
    };
    let table = CommandTable::build(&chrome, &sets).unwrap();
    assert!(table.command("getNetworkConditions").is_some());
    assert!(table.command("getPageLogs").is_none());

    let sauce = EnvironmentFlags {
        is_sauce: true,
        ..w3c()
    };
    let table = CommandTable::build(&sauce, &sets).unwrap();
    assert!(table.command("getPageLogs").is_some());
    assert!(table.command("getNetworkConditions").is_none());

    let standalone = EnvironmentFlags {
        is_selenium_standalone: true,
        ..Default::default()
    };
    let table = CommandTable::build(&standalone, &sets).unwrap();
    let hub = table.command("getHubTestSession").unwrap();
    assert!(hub.spec().is_hub_command);
    assert_eq!(hub.method(), HttpMethod::Get);
}

#[test]
fn test_later_vendor_set_shadows_earlier_one() {
    let flags = EnvironmentFlags {
        is_chrome: true,
        is_selenium_standalone: true,
        ..w3c()
    };
    let table = CommandTable::build(&flags, &bundled()).unwrap();
    let file = table.command("file").unwrap();
    assert!(
        file.spec()
            .reference
            .as_deref()
            .unwrap()
            .contains("SeleniumHQ")
    );
}

#[test]
fn test_synthetic_overlap_keeps_later_entry() {
    let generic = ProtocolDefinition::new().with(
        "/session/:sessionId/probe",
        HttpMethod::Get,
        CommandSpec::new("probe").with_description("generic"),
    );
    let vendor = ProtocolDefinition::new().with(
        "/session/:sessionId/vendor/probe",
        HttpMethod::Post,
        CommandSpec::new("probe")
            .with_description("vendor")
            .with_parameter("depth", "number", false),
    );
    let sets = DefinitionSets::empty()
        .with_set(SetKind::WebDriver, generic)
        .with_set(SetKind::Chromium, vendor);

    let only_w3c = CommandTable::build(&w3c(), &sets).unwrap();
    assert_eq!(
        only_w3c.command("probe").unwrap().spec().description.as_deref(),
        Some("generic")
    );

    let with_chrome = CommandTable::build(
        &EnvironmentFlags {
            is_chrome: true,
            ..w3c()
        },
        &sets,
    )
    .unwrap();
    let probe = with_chrome.command("probe").unwrap();
    assert_eq!(probe.spec().description.as_deref(), Some("vendor"));
    assert_eq!(probe.endpoint(), "/session/:sessionId/vendor/probe");
    assert_eq!(probe.method(), HttpMethod::Post);
    assert_eq!(with_chrome.commands().filter(|c| c.name() == "probe").count(), 1);
}

#[test]
fn test_later_set_shadows_name_declared_further_down_earlier_set() {
    let generic = ProtocolDefinition::new()
        .with(
            "/session/:sessionId/shared",
            HttpMethod::Get,
            CommandSpec::new("other"),
        )
        .with(
            "/session/:sessionId/generic/probe",
            HttpMethod::Get,
            CommandSpec::new("probe").with_description("generic"),
        );
    let vendor = ProtocolDefinition::new().with(
        "/session/:sessionId/shared",
        HttpMethod::Post,
        CommandSpec::new("probe").with_description("vendor"),
    );
    let sets = DefinitionSets::empty()
        .with_set(SetKind::WebDriver, generic)
        .with_set(SetKind::Chromium, vendor);

    let flags = EnvironmentFlags {
        is_chrome: true,
        ..w3c()
    };
    let table = CommandTable::build(&flags, &sets).unwrap();

    let probe = table.command("probe").unwrap();
    assert_eq!(probe.spec().description.as_deref(), Some("vendor"));
    assert_eq!(probe.method(), HttpMethod::Post);
    assert_eq!(probe.endpoint(), "/session/:sessionId/shared");

    let other = table.command("other").unwrap();
    assert_eq!(other.method(), HttpMethod::Get);
    assert_eq!(other.endpoint(), "/session/:sessionId/shared");
}

#[test]
fn test_empty_sets_produce_only_properties() {
    let table = CommandTable::build(&w3c(), &DefinitionSets::empty()).unwrap();
    assert_eq!(table.commands().count(), 0);
    assert_eq!(table.property("isW3C"), Some(&json!(true)));
    assert_eq!(table.property("isMobile"), Some(&json!(false)));
}

#[test]
fn test_building_twice_is_identical() {
    let flags = EnvironmentFlags {
        is_mobile: true,
        is_chrome: true,
        is_sauce: true,
        is_selenium_standalone: true,
        ..w3c()
    };
    let sets = bundled();
    let first = CommandTable::build(&flags, &sets).unwrap();
    let second = CommandTable::build(&flags, &sets).unwrap();

    let describe = |table: &CommandTable| {
        table
            .commands()
            .map(|c| (c.name().to_string(), c.method(), c.endpoint().to_string(), c.spec().clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(
        first.names().collect::<Vec<_>>(),
        second.names().collect::<Vec<_>>()
    );
    assert_eq!(describe(&first), describe(&second));
    assert_eq!(
        select_definitions(&flags, &sets),
        select_definitions(&flags, &sets)
    );
}
