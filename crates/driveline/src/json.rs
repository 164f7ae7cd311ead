//! Helpers for loosely-typed JSON coming off the wire.

use serde_json::Value;

/// Truthiness as automation servers and their clients have historically
/// interpreted it: `null`, `false`, `0`, `NaN` and `""` are falsy, everything
/// else (including empty arrays and objects) is truthy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `value` when it is truthy.
pub(crate) fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| is_truthy(v))
}

/// Render a scalar for messages: strings verbatim, everything else as JSON.
pub(crate) fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Shorten long values for log lines.
pub(crate) fn summarize(value: &Value, limit: usize) -> String {
    let text = display_text(value);
    if text.chars().count() <= limit {
        return text;
    }
    let head: String = text.chars().take(limit).collect();
    format!("{head}... ({} bytes)", text.len())
}
