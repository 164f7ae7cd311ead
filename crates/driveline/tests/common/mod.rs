//! Common test utilities for integration tests
//!
//! A scripted [`Transport`] that records every request it is handed and
//! answers from a queue of canned responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use driveline::{DriverResult, Transport, WireRequest, WireResponse};
use serde_json::{Value, json};

/// Records requests; answers with queued responses, then with `{"value": null}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<WireRequest>>,
    responses: Mutex<VecDeque<WireResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for the next request.
    pub fn respond(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(WireResponse::new(status, body));
    }

    /// Queue a successful response carrying `value`.
    pub fn respond_value(&self, value: Value) {
        self.respond(200, json!({ "value": value }));
    }

    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> WireRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &WireRequest) -> DriverResult<WireResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| WireResponse::new(200, json!({ "value": null }))))
    }
}

/// Negotiated capabilities of a desktop W3C Chrome session.
pub fn w3c_chrome_capabilities() -> Value {
    json!({
        "browserName": "chrome",
        "browserVersion": "120.0",
        "platformName": "linux",
        "setWindowRect": true,
        "goog:chromeOptions": { "debuggerAddress": "localhost:9222" }
    })
}

/// Negotiated capabilities of an Appium Android session.
pub fn android_capabilities() -> Value {
    json!({
        "platformName": "Android",
        "automationName": "UiAutomator2",
        "deviceName": "emulator-5554",
        "appium-version": "1.22"
    })
}

/// Negotiated capabilities of a legacy Selenium standalone session.
pub fn legacy_capabilities() -> Value {
    json!({
        "browserName": "firefox",
        "version": "45.0",
        "platform": "LINUX",
        "webdriver.remote.sessionid": "abc-123"
    })
}
