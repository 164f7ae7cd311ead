//! The seam between bound commands and whatever issues HTTP requests.
//!
//! This crate never performs network I/O. A [`Transport`] receives a fully
//! rendered [`WireRequest`] and hands back the status code and parsed body;
//! classification of that pair happens on this side of the seam.

use std::fmt;
use std::sync::Arc;

use driveline_protocol::HttpMethod;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{DriverResult, error_from_response_body};
use crate::response::is_successful_response;

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireRequest {
    /// Command the request was rendered for.
    pub command: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully resolved URL.
    pub url: Url,
    /// Serialized JSON body, if the method carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl fmt::Display for WireRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// What came back from the server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl WireResponse {
    /// Response with a JSON body.
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Response without a body.
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    /// Classify the response.
    pub fn is_success(&self) -> bool {
        is_successful_response(self.status, self.body.as_ref())
    }

    /// The body's `value` on success (`null` when absent), the synthesized
    /// error otherwise.
    pub fn into_result(self) -> DriverResult<Value> {
        if !self.is_success() {
            return Err(error_from_response_body(self.body.as_ref()));
        }
        Ok(self
            .body
            .and_then(|mut body| body.get_mut("value").map(Value::take))
            .unwrap_or(Value::Null))
    }
}

/// Sends rendered requests.
///
/// Implementations report connection-level failures as
/// [`DriverError::Transport`](crate::DriverError::Transport); HTTP-level
/// failures are returned as ordinary responses.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send one request and wait for the response.
    fn send(&self, request: &WireRequest) -> DriverResult<WireResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &WireRequest) -> DriverResult<WireResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &WireRequest) -> DriverResult<WireResponse> {
        (**self).send(request)
    }
}
