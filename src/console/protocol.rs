//! The two-message JSON envelope spoken over the command channel.
//!
//! Every request names an `action`; every request gets exactly one
//! response, `{"success": true, "result": ...}` on success or
//! `{"success": false, "error": ...}` on failure. There is no further
//! protocol state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command received over the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ConsoleRequest {
    /// Evaluate a JavaScript snippet in the live page.
    #[serde(rename = "executeCode")]
    ExecuteCode { code: String },

    /// Return a sanitized snapshot of the current page markup.
    #[serde(rename = "fetchHTML")]
    FetchHtml,
}

/// The single reply sent for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConsoleResponse {
    /// Success envelope carrying a result value.
    #[must_use]
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Failure envelope carrying an error message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }

    /// Serialize for the wire.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
