//! Output formatting for CLI results

use std::fmt::Write as _;

use clap::ValueEnum;
use driveline::EnvironmentFlags;

use crate::commands::{Classification, CommandDetail, CommandRow, Report};
use crate::error::CliResult;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// Pretty-printed JSON
    Json,
}

/// Render a report in the requested format.
pub fn render(report: &Report, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Human => Ok(match report {
            Report::Flags(flags) => human_flags(flags),
            Report::Commands(rows) => human_commands(rows),
            Report::Describe(detail) => human_detail(detail),
            Report::Prepare(request) => match &request.body {
                Some(body) => format!("{request}\n{body}"),
                None => request.to_string(),
            },
            Report::Classify(classification) => human_classification(classification),
        }),
    }
}

fn human_flags(flags: &EnvironmentFlags) -> String {
    let width = flags
        .properties()
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);
    flags
        .properties()
        .iter()
        .map(|(name, set)| format!("{name:<width$}  {set}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn human_commands(rows: &[CommandRow]) -> String {
    if rows.is_empty() {
        return "No commands available".to_string();
    }
    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<6}  {}",
            row.name,
            row.method.as_str(),
            row.endpoint
        );
    }
    let _ = write!(out, "Total: {} commands", rows.len());
    out
}

fn human_detail(detail: &CommandDetail) -> String {
    let mut out = format!(
        "{}\n  {} {}\n  usage: {}",
        detail.name,
        detail.method.as_str(),
        detail.endpoint,
        detail.usage
    );
    if let Some(description) = &detail.description {
        let _ = write!(out, "\n  {description}");
    }
    if let Some(reference) = &detail.reference {
        let _ = write!(out, "\n  ref: {reference}");
    }
    if detail.is_hub_command {
        out.push_str("\n  routed to the grid hub");
    }
    out
}

fn human_classification(classification: &Classification) -> String {
    if classification.successful {
        let value = classification
            .value
            .as_ref()
            .map_or_else(|| "null".to_string(), ToString::to_string);
        return format!("success\nvalue: {value}");
    }
    let mut out = "failure".to_string();
    if let Some(error) = &classification.error {
        let _ = write!(out, "\nerror: {error}");
    }
    if let Some(message) = &classification.message {
        let _ = write!(out, "\nmessage: {message}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveline::HttpMethod;
    use serde_json::json;

    #[test]
    fn test_flags_human() {
        let flags = EnvironmentFlags {
            is_w3c: true,
            ..Default::default()
        };
        let text = render(&Report::Flags(flags), OutputFormat::Human).unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("isW3C"));
        assert!(first.ends_with("true"));
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn test_flags_json_uses_property_names() {
        let text = render(&Report::Flags(EnvironmentFlags::default()), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["isSeleniumStandalone"], json!(false));
    }

    #[test]
    fn test_commands_human() {
        let rows = vec![CommandRow {
            name: "getTitle".to_string(),
            method: HttpMethod::Get,
            endpoint: "/session/:sessionId/title".to_string(),
        }];
        let text = render(&Report::Commands(rows), OutputFormat::Human).unwrap();
        assert!(text.contains("getTitle  GET     /session/:sessionId/title"));
        assert!(text.ends_with("Total: 1 commands"));

        let empty = render(&Report::Commands(Vec::new()), OutputFormat::Human).unwrap();
        assert_eq!(empty, "No commands available");
    }

    #[test]
    fn test_classification_human() {
        let failure = Classification {
            successful: false,
            value: None,
            error: Some("no such window".to_string()),
            message: Some("window closed".to_string()),
        };
        assert_eq!(
            render(&Report::Classify(failure), OutputFormat::Human).unwrap(),
            "failure\nerror: no such window\nmessage: window closed"
        );
    }
}
