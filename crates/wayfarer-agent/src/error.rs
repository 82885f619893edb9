//! Error types for the model client, configuration and the dispatch cycle.

use thiserror::Error;
use wayfarer_core::error::RegistryError;

/// Failures talking to the language model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection or protocol failure below HTTP status handling.
    #[error("Model transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not carry the expected reply text.
    #[error("Invalid model response: {reason}")]
    InvalidResponse { reason: String },

    /// The request exceeded the configured timeout.
    #[error("Model request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl LlmError {
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        LlmError::InvalidResponse {
            reason: reason.into(),
        }
    }
}

/// Missing or malformed environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Environment variable '{name}' is not set.")]
    MissingVar { name: String },

    #[error("Environment variable '{name}' is invalid: {reason}")]
    InvalidVar { name: String, reason: String },
}

/// Errors surfaced by [`ToolAgent`](crate::ToolAgent).
///
/// Tool and routing failures inside a cycle never appear here; they become
/// `{"error": ...}` replies instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;
pub type AgentResult<T> = std::result::Result<T, AgentError>;
