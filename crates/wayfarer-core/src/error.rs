//! # Error Types
//!
//! Errors raised while registering tools and while routing a tool call.
//! A missing structured payload is not an error: the extractor returns
//! `None` for it.

use crate::tool::{FailureReason, IdValidationError};
use thiserror::Error;

/// Result type for registry setup operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for dispatching a single tool call.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur while building the tool registry.
///
/// Registration happens once at startup, so any of these aborts
/// initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A tool instance with this short name is already registered.
    #[error("Tool instance already registered: {name}")]
    DuplicateRegistration { name: String },

    /// The short name cannot be used as a registry key.
    #[error("Invalid tool name '{name}': {reason}")]
    InvalidToolName {
        name: String,
        reason: IdValidationError,
    },
}

/// Errors that can occur while routing and invoking one tool call.
///
/// Every variant is caught at the dispatch-cycle boundary and turned into
/// an `{"error": ...}` reply; none of them ends the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The request itself is unusable: empty tool name, arguments that are
    /// not an object, or arguments that do not match the declared parameters.
    #[error("{reason}")]
    InvalidRequest { reason: String },

    /// No callable is registered under the fully-qualified name.
    #[error("Unknown tool: {tool}")]
    UnknownTool { tool: String },

    /// The tool callable ran and reported a failure.
    #[error("{reason}")]
    ExecutionFailed { tool: String, reason: FailureReason },
}

impl DispatchError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn unknown_tool(tool: impl Into<String>) -> Self {
        Self::UnknownTool { tool: tool.into() }
    }

    /// Fully-qualified tool name involved in the failure, when known.
    pub fn tool(&self) -> Option<&str> {
        match self {
            DispatchError::InvalidRequest { .. } => None,
            DispatchError::UnknownTool { tool } | DispatchError::ExecutionFailed { tool, .. } => {
                Some(tool)
            }
        }
    }
}
