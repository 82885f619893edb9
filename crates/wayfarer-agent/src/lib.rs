//! # Wayfarer Agent
//!
//! The conversational side of Wayfarer: a language-model client, the system
//! prompt, configuration and the [`ToolAgent`] dispatcher that turns model
//! replies into routed tool calls.
//!
//! ```rust,no_run
//! use wayfarer_agent::{AgentConfig, ToolAgent};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfig::from_env()?;
//! let mut agent = ToolAgent::from_config(&config)?;
//! let reply = agent.run("Can I go to Japan?").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod llm;
pub mod prompt;

pub use config::AgentConfig;
pub use dispatcher::{INVALID_TOOL_CALL, REQUIRED_PROPS, ToolAgent};
pub use error::{AgentError, AgentResult, ConfigError, LlmError, LlmResult};
pub use llm::{ChatClient, LanguageModel};
pub use prompt::system_prompt;
