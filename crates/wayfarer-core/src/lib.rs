//! # Wayfarer Core
//!
//! Core types for the Wayfarer conversational dispatcher.
//!
//! - [`conversation`]: append-only transcript of role-tagged turns
//! - [`tool`]: the tool contract, tool-call requests and execution results
//! - [`extract`]: locating a tool-call payload inside noisy model output
//! - [`normalize`]: folding tool outputs into one JSON result shape
//! - [`error`]: registration and dispatch errors

pub mod conversation;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod tool;

pub use conversation::{Role, Transcript, Turn};
pub use error::{DispatchError, DispatchResult, RegistryError, RegistryResult};
pub use extract::{extract_json, strip_code_fences};
pub use normalize::{NormalizedResult, normalize_output};
pub use tool::{
    Arguments, ExecutionResult, FailureReason, IdValidationError, MethodSpec, ParamKind,
    ParamSpec, Tool, ToolCallRequest, ToolName, ToolOutput,
};
