//! Type definitions for stored rules and normalized requests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One stored "expected request -> canned response" rule.
///
/// Field names follow the persisted JSON layout (`requestUrl`, `requestMethod`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    /// Exact path the rule applies to
    pub request_url: String,
    /// HTTP verb, compared case-insensitively
    pub request_method: String,
    /// Token the request must carry in the identifier query parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_identifier: Option<String>,
    /// Key/value pairs that must all appear in the request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_payload: Option<Map<String, Value>>,
    pub response_status_code: u16,
    pub response_content_type: String,
    pub response_value: Value,
}

impl RuleSpec {
    /// Body bytes to emit for this rule.
    ///
    /// String values are emitted verbatim, anything else as compact JSON.
    pub fn response_body(&self) -> String {
        match &self.response_value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Normalized view of an incoming replay request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDescriptor {
    pub path: String,
    pub method: String,
    /// `None` when the identifier query parameter is absent; `Some("")` when present but empty
    pub unique_identifier: Option<String>,
    pub body: Map<String, Value>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            unique_identifier: None,
            body: Map::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.unique_identifier = Some(identifier.into());
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }
}
