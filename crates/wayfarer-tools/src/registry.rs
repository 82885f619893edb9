use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use wayfarer_core::error::{DispatchError, DispatchResult, RegistryError, RegistryResult};
use wayfarer_core::tool::{
    Arguments, MethodSpec, SEPARATOR, Tool, ToolCallRequest, ToolName, ToolOutput,
};

/// Registration name that may be used without a method name.
pub const SHORTHAND_TOOL: &str = "travel_info";

/// Method a bare [`SHORTHAND_TOOL`] name is rewritten to.
pub const SHORTHAND_METHOD: &str = "get_info";

/// One exposed method of a registered tool instance.
#[derive(Clone)]
pub struct RegisteredMethod {
    qualified_name: String,
    spec: MethodSpec,
    tool: Arc<dyn Tool>,
}

impl std::fmt::Debug for RegisteredMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredMethod")
            .field("qualified_name", &self.qualified_name)
            .field("spec", &self.spec)
            .finish()
    }
}

impl RegisteredMethod {
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn spec(&self) -> &MethodSpec {
        &self.spec
    }

    /// Validate `arguments` against the declared parameters and run the method.
    pub async fn invoke(&self, arguments: &Arguments) -> DispatchResult<ToolOutput> {
        validate_arguments(&self.qualified_name, &self.spec, arguments)?;

        self.tool
            .call(self.spec.name, arguments)
            .await
            .into_result()
            .map_err(|reason| {
                tracing::warn!(tool = %self.qualified_name, error = %reason, "Tool execution failed");
                DispatchError::ExecutionFailed {
                    tool: self.qualified_name.clone(),
                    reason,
                }
            })
    }
}

/// Registry mapping fully-qualified tool names to callables.
///
/// Each registered instance contributes every method it advertises under
/// `"<name>.<method>"`. Methods whose name starts with `_` stay private.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use std::sync::Arc;
/// use wayfarer_core::tool::{Arguments, ExecutionResult, MethodSpec, Tool, ToolCallRequest};
/// use wayfarer_tools::ToolRouter;
///
/// struct Clock;
///
/// #[async_trait]
/// impl Tool for Clock {
///     fn methods(&self) -> Vec<MethodSpec> {
///         vec![MethodSpec::new("now")]
///     }
///
///     async fn call(&self, _method: &str, _arguments: &Arguments) -> ExecutionResult {
///         ExecutionResult::text("12:00")
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut router = ToolRouter::new();
/// router.register("clock", Arc::new(Clock)).unwrap();
///
/// let output = router
///     .dispatch(&ToolCallRequest::new("clock.now", Arguments::new()))
///     .await;
/// assert!(output.is_ok());
/// # }
/// ```
#[derive(Clone, Default)]
pub struct ToolRouter {
    instances: HashMap<ToolName, Arc<dyn Tool>>,
    methods: HashMap<String, RegisteredMethod>,
}

impl ToolRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`ToolRouter::register`].
    pub fn try_with_tool(mut self, name: &str, tool: Arc<dyn Tool>) -> RegistryResult<Self> {
        self.register(name, tool)?;
        Ok(self)
    }

    /// Register a tool instance and expose all of its public methods.
    ///
    /// Fails with [`RegistryError::DuplicateRegistration`] when `name` is
    /// taken; the existing registration is left untouched in that case.
    /// Returns the number of methods exposed.
    pub fn register(&mut self, name: &str, tool: Arc<dyn Tool>) -> RegistryResult<usize> {
        let tool_name = ToolName::parse(name).map_err(|reason| RegistryError::InvalidToolName {
            name: name.to_string(),
            reason,
        })?;

        if self.instances.contains_key(&tool_name) {
            tracing::warn!(tool = %tool_name, "Tool instance already registered");
            return Err(RegistryError::DuplicateRegistration {
                name: name.to_string(),
            });
        }

        let mut exposed = 0;
        for spec in tool.methods() {
            if spec.is_internal() {
                tracing::trace!(tool = %tool_name, method = spec.name, "Skipping internal method");
                continue;
            }

            let qualified_name = tool_name.qualify(spec.name);
            if self.methods.contains_key(&qualified_name) {
                tracing::warn!(method = %qualified_name, "Method advertised twice, keeping first");
                continue;
            }

            tracing::debug!(method = %qualified_name, signature = %spec.signature(), "Registered tool method");
            self.methods.insert(
                qualified_name.clone(),
                RegisteredMethod {
                    qualified_name,
                    spec,
                    tool: Arc::clone(&tool),
                },
            );
            exposed += 1;
        }

        self.instances.insert(tool_name, tool);
        Ok(exposed)
    }

    /// Look up the callable registered under exactly `name`.
    pub fn resolve(&self, name: &str) -> DispatchResult<&RegisteredMethod> {
        self.methods
            .get(name)
            .ok_or_else(|| DispatchError::unknown_tool(name))
    }

    /// Route a tool call to its callable and invoke it.
    ///
    /// Invocation failures are returned, not swallowed; turning them into a
    /// reply is the dispatcher's job.
    pub async fn dispatch(&self, request: &ToolCallRequest) -> DispatchResult<ToolOutput> {
        if request.tool.is_empty() {
            return Err(DispatchError::invalid_request("Tool name is empty."));
        }

        let name = normalize_tool_name(&request.tool);
        let method = self.resolve(&name).inspect_err(|_| {
            tracing::warn!(tool = %name, "Unknown tool requested");
        })?;

        tracing::debug!(tool = %name, arguments = request.arguments.len(), "Dispatching tool call");
        method.invoke(&request.arguments).await
    }

    /// Fully-qualified names of every exposed method, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Number of exposed methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// One line per exposed method, e.g. `- travel_info.get_info(country_to: string)`.
    pub fn describe(&self) -> String {
        let mut methods: Vec<&RegisteredMethod> = self.methods.values().collect();
        methods.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

        methods
            .iter()
            .map(|method| {
                let owner = method
                    .qualified_name
                    .rsplit_once(SEPARATOR)
                    .map(|(owner, _)| owner)
                    .unwrap_or_default();
                let mut line = format!("- {}.{}", owner, method.spec.signature());
                if !method.spec.description.is_empty() {
                    line.push_str(": ");
                    line.push_str(method.spec.description);
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Apply the default-method shorthand.
///
/// A bare `travel_info` (no separator) means `travel_info.get_info`. This is
/// the only shorthand; other bare names are looked up unchanged.
pub fn normalize_tool_name(name: &str) -> Cow<'_, str> {
    if !name.contains(SEPARATOR) && name == SHORTHAND_TOOL {
        Cow::Owned(format!("{}{}{}", SHORTHAND_TOOL, SEPARATOR, SHORTHAND_METHOD))
    } else {
        Cow::Borrowed(name)
    }
}

/// Check keyword arguments against a method's declared parameters.
pub fn validate_arguments(tool: &str, spec: &MethodSpec, arguments: &Arguments) -> DispatchResult<()> {
    let reject = |reason: String| {
        tracing::warn!(tool, %reason, "Rejected tool arguments");
        Err(DispatchError::InvalidRequest { reason })
    };

    for param in spec.params.iter().filter(|p| p.required) {
        if !arguments.contains_key(param.name) {
            return reject(format!(
                "Missing required argument '{}' for {}",
                param.name, tool
            ));
        }
    }

    for (key, value) in arguments {
        let Some(param) = spec.param(key) else {
            return reject(format!("Unexpected argument '{}' for {}", key, tool));
        };
        if !param.kind.accepts(value) {
            return reject(format!(
                "Argument '{}' for {} must be {}, got: {}",
                key, tool, param.kind, value
            ));
        }
    }

    Ok(())
}
