//! # Result Normalization
//!
//! Tools return text, serialized JSON or structured values. Everything is
//! folded into one JSON shape before it reaches the transcript or the caller.

use crate::tool::ToolOutput;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Canonical envelope for the outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedResult {
    /// `{"tool": <fully-qualified name>, "result": <payload>}`
    Success { tool: String, result: Value },
    /// `{"error": <message>}`
    Error { error: String },
}

impl NormalizedResult {
    /// Normalize a raw tool output produced by `tool`.
    pub fn from_output(tool: impl Into<String>, output: ToolOutput) -> Self {
        NormalizedResult::Success {
            tool: tool.into(),
            result: normalize_output(output),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        NormalizedResult::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NormalizedResult::Error { .. })
    }

    /// The caller-visible payload: the result alone on success, the error
    /// object otherwise.
    pub fn payload(&self) -> Value {
        match self {
            NormalizedResult::Success { result, .. } => result.clone(),
            NormalizedResult::Error { error } => json!({ "error": error }),
        }
    }
}

/// Canonical JSON value for a raw tool output.
///
/// Text holding a JSON object becomes that object; any other text is
/// wrapped as `{"raw": <text>}`. Structured values pass through unchanged.
pub fn normalize_output(output: ToolOutput) -> Value {
    match output {
        ToolOutput::Structured(value) => value,
        ToolOutput::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(value @ Value::Object(_)) => value,
            _ => json!({ "raw": text }),
        },
    }
}
