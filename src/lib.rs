//! # Wayfarer
//!
//! Conversational dispatcher between a chat model and callable tools, shipped
//! as a travel-currency assistant.
//!
//! A user message goes to the model; the model either answers or embeds a
//! `{"tool": "<name>.<method>", "arguments": {...}}` request in its reply.
//! Wayfarer finds that request even inside prose or code fences, routes it to
//! the registered tool, normalizes the output and records every step in an
//! append-only transcript.
//!
//! - [`core`]: transcript, tool contract, payload extraction, normalization
//! - [`tools`]: tool router and the `travel_info` tool
//! - [`agent`]: model client, configuration and the [`ToolAgent`] dispatcher

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use wayfarer_agent as agent;
pub use wayfarer_core as core;
pub use wayfarer_tools as tools;

// ============================================================================
// Common types
// ============================================================================

pub use wayfarer_agent::{AgentConfig, AgentError, ChatClient, LanguageModel, LlmError, ToolAgent};
pub use wayfarer_core::{
    DispatchError, ExecutionResult, FailureReason, MethodSpec, NormalizedResult, ParamKind,
    ParamSpec, RegistryError, Role, Tool, ToolCallRequest, ToolOutput, Transcript, Turn,
    extract_json,
};
pub use wayfarer_tools::{TravelConfig, TravelInfo, ToolRouter};
