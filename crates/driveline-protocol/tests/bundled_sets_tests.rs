//! Sanity checks over the definition data shipped with the crate.

use driveline_protocol::{DefinitionSets, HttpMethod, SetKind};

#[test]
fn test_every_bundled_set_loads() {
    let sets = DefinitionSets::bundled().unwrap();
    for kind in SetKind::ALL {
        assert!(!sets.get(kind).is_empty(), "{} is empty", kind.name());
    }
}

#[test]
fn test_bundled_metadata_matches_endpoints() {
    let sets = DefinitionSets::bundled().unwrap();
    for kind in SetKind::ALL {
        for (template, method, spec) in sets.get(kind).commands() {
            spec.validate(template).unwrap_or_else(|e| {
                panic!("{} {} {}: {}", kind.name(), method, template, e)
            });
            for parameter in &spec.parameters {
                assert!(
                    !parameter.type_name.is_empty(),
                    "{} parameter {} has no type",
                    spec.command,
                    parameter.name
                );
            }
        }
    }
}

#[test]
fn test_hub_commands_live_in_selenium_set() {
    let sets = DefinitionSets::bundled().unwrap();
    for kind in SetKind::ALL {
        let hub_commands = sets
            .get(kind)
            .commands()
            .filter(|(_, _, spec)| spec.is_hub_command)
            .count();
        if kind == SetKind::Selenium {
            assert!(hub_commands > 0);
        } else {
            assert_eq!(hub_commands, 0, "{} declares hub commands", kind.name());
        }
    }
}

#[test]
fn test_well_known_commands() {
    let sets = DefinitionSets::bundled().unwrap();

    let status = sets.webdriver.get("/status", HttpMethod::Get).unwrap();
    assert_eq!(status.command, "status");

    let navigate = sets
        .webdriver
        .get("/session/:sessionId/url", HttpMethod::Post)
        .unwrap();
    assert_eq!(navigate.command, "navigateTo");
    assert_eq!(navigate.parameters[0].name, "url");
    assert!(navigate.parameters[0].required);

    let find = sets
        .jsonwp
        .get("/session/:sessionId/element", HttpMethod::Post)
        .unwrap();
    assert_eq!(find.command, "findElement");
    assert_eq!(find.usage(), "findElement(using, value)");
}
