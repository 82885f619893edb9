//! # Tool Contract
//!
//! Types shared by tool implementations, the registry and the dispatcher.
//!
//! A tool is an object that advertises a static list of named methods
//! ([`MethodSpec`]) and executes them on request. The registry exposes each
//! advertised method under `"<registration-name>.<method>"`, so adding a tool
//! never requires touching routing code.

use crate::error::DispatchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Keyword arguments passed to a tool method.
pub type Arguments = serde_json::Map<String, Value>;

/// Separator between the registration name and the method name.
pub const SEPARATOR: char = '.';

/// Prefix marking a method as internal; such methods are never exposed.
pub const INTERNAL_PREFIX: char = '_';

/// Maximum length of a registration name.
pub const MAX_NAME_LENGTH: usize = 64;

/// Reasons a registration name can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    #[error("Identifier cannot be empty")]
    Empty,
    #[error("Identifier cannot be whitespace-only")]
    WhitespaceOnly,
    #[error("Identifier cannot have leading or trailing whitespace")]
    LeadingTrailingWhitespace,
    #[error("Identifier cannot contain the '.' separator")]
    ContainsSeparator,
    #[error("Identifier can only contain alphanumeric characters, hyphens and underscores")]
    InvalidCharacters,
    #[error("Identifier too long ({length} chars, max {max})")]
    TooLong { length: usize, max: usize },
}

/// Validated short name a tool instance is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolName(String);

impl ToolName {
    /// Validate and wrap a registration name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wayfarer_core::tool::ToolName;
    ///
    /// assert!(ToolName::parse("travel_info").is_ok());
    /// assert!(ToolName::parse("travel.info").is_err());
    /// assert!(ToolName::parse("").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self, IdValidationError> {
        if name.is_empty() {
            return Err(IdValidationError::Empty);
        }
        if name.trim().is_empty() {
            return Err(IdValidationError::WhitespaceOnly);
        }
        if name != name.trim() {
            return Err(IdValidationError::LeadingTrailingWhitespace);
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(IdValidationError::TooLong {
                length: name.len(),
                max: MAX_NAME_LENGTH,
            });
        }
        if name.contains(SEPARATOR) {
            return Err(IdValidationError::ContainsSeparator);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(IdValidationError::InvalidCharacters);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully-qualified name of one of this tool's methods.
    pub fn qualify(&self, method: &str) -> String {
        format!("{}{}{}", self.0, SEPARATOR, method)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Any,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::Object => "object",
            ParamKind::Array => "array",
            ParamKind::Any => "any",
        }
    }

    /// Whether `value` is acceptable for this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Number => value.is_number(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Object => value.is_object(),
            ParamKind::Array => value.is_array(),
            ParamKind::Any => true,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared keyword parameter of a tool method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A named callable offered by a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl MethodSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            description: "",
            params: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Internal methods are skipped at registration time.
    pub fn is_internal(&self) -> bool {
        self.name.starts_with(INTERNAL_PREFIX)
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Signature in the form `name(param: kind, other?: kind)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                let marker = if p.required { "" } else { "?" };
                format!("{}{}: {}", p.name, marker, p.kind)
            })
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// Raw value returned by a tool method.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Text, possibly holding serialized JSON.
    Text(String),
    /// Already structured data.
    Structured(Value),
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        ToolOutput::Text(text)
    }
}

impl From<&str> for ToolOutput {
    fn from(text: &str) -> Self {
        ToolOutput::Text(text.to_string())
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        ToolOutput::Structured(value)
    }
}

/// Categorized failure reasons for tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// Invalid or malformed input provided to the tool
    InvalidInput { message: String },
    /// Requested entity does not exist
    NotFound { message: String },
    /// Network-related failure
    NetworkError { message: String },
    /// Timeout exceeded
    Timeout { operation: String },
    /// Missing configuration the tool needs
    Configuration { message: String },
    /// Internal tool error or unexpected state
    InternalError { message: String },
}

impl FailureReason {
    /// Human-readable error message.
    pub fn message(&self) -> String {
        match self {
            FailureReason::InvalidInput { message }
            | FailureReason::NotFound { message }
            | FailureReason::Configuration { message }
            | FailureReason::InternalError { message } => message.clone(),
            FailureReason::NetworkError { message } => format!("Network error: {}", message),
            FailureReason::Timeout { operation } => format!("Timeout: {}", operation),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The result of executing a tool method.
///
/// Either successful output or a structured failure reason; there is no
/// state in which both are present.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success { output: ToolOutput },
    Failure { reason: FailureReason },
}

impl ExecutionResult {
    /// Successful execution returning text.
    pub fn text(output: impl Into<String>) -> Self {
        ExecutionResult::Success {
            output: ToolOutput::Text(output.into()),
        }
    }

    /// Successful execution returning structured data.
    pub fn structured(output: Value) -> Self {
        ExecutionResult::Success {
            output: ToolOutput::Structured(output),
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        ExecutionResult::Failure { reason }
    }

    /// Failed execution from a plain message, categorized as internal.
    pub fn failure(message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            reason: FailureReason::InternalError {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failure { .. })
    }

    pub fn into_result(self) -> Result<ToolOutput, FailureReason> {
        match self {
            ExecutionResult::Success { output } => Ok(output),
            ExecutionResult::Failure { reason } => Err(reason),
        }
    }
}

/// A capability that can be registered with the tool router.
///
/// Methods run on the caller's runtime, so tools that do I/O await it
/// directly instead of blocking.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use wayfarer_core::tool::{
///     Arguments, ExecutionResult, MethodSpec, ParamKind, ParamSpec, Tool,
/// };
///
/// struct Greeter;
///
/// #[async_trait]
/// impl Tool for Greeter {
///     fn methods(&self) -> Vec<MethodSpec> {
///         vec![MethodSpec::new("hello").with_param(ParamSpec::required("who", ParamKind::String))]
///     }
///
///     async fn call(&self, method: &str, arguments: &Arguments) -> ExecutionResult {
///         match method {
///             "hello" => {
///                 let who = arguments.get("who").and_then(|v| v.as_str()).unwrap_or("world");
///                 ExecutionResult::text(format!("hello {who}"))
///             }
///             other => ExecutionResult::failure(format!("no method {other}")),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Methods this tool offers. Called once, at registration.
    fn methods(&self) -> Vec<MethodSpec>;

    /// Execute `method` with already validated `arguments`.
    async fn call(&self, method: &str, arguments: &Arguments) -> ExecutionResult;
}

/// Parsed structured payload asking for one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Dotted identifier `<registration-name>.<method>`.
    pub tool: String,
    /// Keyword arguments, not validated at this layer.
    #[serde(default)]
    pub arguments: Arguments,
}

impl ToolCallRequest {
    pub fn new(tool: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            tool: tool.into(),
            arguments,
        }
    }

    /// Build a request from an extracted JSON mapping.
    ///
    /// `tool` must be a string and `arguments` an object; anything else is
    /// an [`DispatchError::InvalidRequest`].
    pub fn from_payload(payload: &serde_json::Map<String, Value>) -> Result<Self, DispatchError> {
        let tool = match payload.get("tool") {
            Some(Value::String(tool)) => tool.clone(),
            Some(other) => {
                return Err(DispatchError::invalid_request(format!(
                    "Tool name must be a string, got: {}",
                    other
                )));
            }
            None => return Err(DispatchError::invalid_request("Tool name is empty.")),
        };

        let arguments = match payload.get("arguments") {
            Some(Value::Object(arguments)) => arguments.clone(),
            Some(other) => {
                return Err(DispatchError::invalid_request(format!(
                    "Arguments for '{}' must be an object, got: {}",
                    tool, other
                )));
            }
            None => Arguments::new(),
        };

        Ok(Self { tool, arguments })
    }
}
