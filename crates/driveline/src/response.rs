//! Success/failure classification of server responses.
//!
//! Servers disagree on how failures are reported: legacy servers use a
//! non-zero `status` field in the body, W3C servers use HTTP status codes and
//! an `error` field. Element lookups that found nothing are a special case
//! under both dialects, since callers use them to probe for existence.

use serde_json::Value;
use tracing::debug;

use crate::json::{is_truthy, truthy};

/// Legacy JSON Wire Protocol status code for "no such element".
pub const LEGACY_NO_SUCH_ELEMENT: i64 = 7;

/// W3C error code for a failed element lookup.
pub const NO_SUCH_ELEMENT: &str = "no such element";

const NOT_FOUND_PREFIXES: [&str; 2] = ["no such element", "unable to find element"];

const NOT_FOUND_MESSAGE: &str =
    "An element could not be located on the page using the given search parameters.";

/// Decide whether a response represents success.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. missing or falsy body: failure
/// 2. legacy status 7 with a "not found" message: success
/// 3. any other truthy `status`: failure
/// 4. HTTP 200 without an error indicator in `value`: success
/// 5. HTTP 404 with `value.error == "no such element"`: success
/// 6. an error indicator (`error`, `stackTrace`, `stacktrace`): failure
/// 7. otherwise: success
pub fn is_successful_response(status: u16, body: Option<&Value>) -> bool {
    let Some(body) = body.filter(|b| is_truthy(b)) else {
        debug!("request failed due to missing body");
        return false;
    };

    let value = truthy(body.get("value"));
    let legacy_status = truthy(body.get("status"));

    if legacy_status.and_then(Value::as_f64) == Some(LEGACY_NO_SUCH_ELEMENT as f64)
        && value.is_some_and(is_not_found_message)
    {
        return true;
    }

    if let Some(code) = legacy_status {
        debug!("request failed due to status {code}");
        return false;
    }

    let error_indicator = value.and_then(|v| {
        truthy(v.get("error"))
            .or_else(|| truthy(v.get("stackTrace")))
            .or_else(|| truthy(v.get("stacktrace")))
    });

    if status == 200 && error_indicator.is_none() {
        return true;
    }

    if status == 404
        && value
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
            == Some(NO_SUCH_ELEMENT)
    {
        return true;
    }

    if error_indicator.is_some() {
        let error = value.and_then(|v| v.get("error")).unwrap_or(&Value::Null);
        debug!("request failed due to response error: {error}");
        return false;
    }

    true
}

fn is_not_found_message(value: &Value) -> bool {
    let Some(message) = truthy(value.get("message")).and_then(Value::as_str) else {
        return false;
    };
    let lowered = message.to_lowercase();
    NOT_FOUND_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
        || message == NOT_FOUND_MESSAGE
}
