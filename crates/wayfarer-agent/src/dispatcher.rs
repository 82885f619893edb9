//! # Dispatcher
//!
//! [`ToolAgent`] runs one request/response cycle per user input:
//!
//! 1. append the user turn
//! 2. ask the model for a reply over the whole transcript
//! 3. strip code fences from the reply
//! 4. extract a `{"tool", "arguments"}` payload
//! 5. route it, normalize the output and append a tool turn on success
//! 6. append the assistant turn holding the reply text
//! 7. return the reply text
//!
//! Every failure after step 2 becomes an `{"error": <message>}` reply. Only
//! model failures are returned as errors, and turns already appended stay.

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::llm::{ChatClient, LanguageModel};
use crate::prompt::system_prompt;
use serde_json::{Map, Value};
use std::sync::Arc;
use wayfarer_core::conversation::{Transcript, Turn};
use wayfarer_core::extract::{extract_json, strip_code_fences};
use wayfarer_core::normalize::NormalizedResult;
use wayfarer_core::tool::ToolCallRequest;
use wayfarer_tools::registry::{ToolRouter, normalize_tool_name};
use wayfarer_tools::travel::{
    CurrencyService, HttpCurrencyService, TRAVEL_TOOL_NAME, TravelConfig, TravelInfo,
};

/// Keys a tool-call payload must carry.
pub const REQUIRED_PROPS: [&str; 2] = ["tool", "arguments"];

/// Reply text when the model output holds no usable tool call.
pub const INVALID_TOOL_CALL: &str = "Model did not return valid tool call JSON.";

/// Conversation session binding a model, a tool router and one transcript.
pub struct ToolAgent {
    model: Arc<dyn LanguageModel>,
    router: ToolRouter,
    transcript: Transcript,
}

impl ToolAgent {
    /// Start a conversation seeded with one system turn.
    pub fn new(
        model: Arc<dyn LanguageModel>,
        router: ToolRouter,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model,
            router,
            transcript: Transcript::with_system(system_prompt),
        }
    }

    /// Agent with `travel_info` backed by the web currency APIs.
    ///
    /// API endpoints and the Fixer key come from [`TravelConfig::from_env`].
    pub fn with_travel_tool(model: Arc<dyn LanguageModel>, config: &AgentConfig) -> AgentResult<Self> {
        let service = Arc::new(HttpCurrencyService::new(TravelConfig::from_env()));
        Self::with_travel_service(model, config, service)
    }

    /// Agent with `travel_info` backed by `service`.
    pub fn with_travel_service(
        model: Arc<dyn LanguageModel>,
        config: &AgentConfig,
        service: Arc<dyn CurrencyService>,
    ) -> AgentResult<Self> {
        let tool = TravelInfo::new(&config.country_from, service);
        let router = ToolRouter::new().try_with_tool(TRAVEL_TOOL_NAME, Arc::new(tool))?;
        let prompt = system_prompt(
            &config.country_from,
            config.currency_from.as_deref(),
            &router.describe(),
        );

        tracing::info!(
            country_from = %config.country_from,
            tools = router.len(),
            "Travel agent ready"
        );
        Ok(Self::new(model, router, prompt))
    }

    /// Agent talking to the HTTP chat endpoint in `config`.
    pub fn from_config(config: &AgentConfig) -> AgentResult<Self> {
        let model = Arc::new(ChatClient::from_config(config));
        Self::with_travel_tool(model, config)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn router(&self) -> &ToolRouter {
        &self.router
    }

    /// Transcript as a JSON array of `{role, content}` objects.
    pub fn transcript_json(&self) -> AgentResult<String> {
        serde_json::to_string_pretty(&self.transcript).map_err(AgentError::from)
    }

    /// Run one cycle for `user_input` and return the reply text.
    ///
    /// The reply is always a JSON object. A model failure is returned as an
    /// error after the user turn has been appended.
    #[tracing::instrument(skip_all, fields(turns = self.transcript.len()))]
    pub async fn run(&mut self, user_input: &str) -> AgentResult<String> {
        self.transcript.append(Turn::user(user_input));

        let raw = self.model.complete(self.transcript.turns()).await?;
        let reply = self.process_reply(&raw).await;

        self.transcript.append(Turn::assistant(reply.clone()));
        Ok(reply)
    }

    async fn process_reply(&mut self, raw: &str) -> String {
        let cleaned = strip_code_fences(raw);

        let payload = match extract_json(&cleaned, &REQUIRED_PROPS) {
            Some(payload) if is_truthy(payload.get("tool")) => payload,
            _ => {
                tracing::debug!(reply_bytes = raw.len(), "Model reply holds no tool call");
                return error_reply(INVALID_TOOL_CALL);
            }
        };

        match self.handle_tool_call(&payload).await {
            Ok(reply) => reply,
            Err(message) => error_reply(message),
        }
    }

    /// Route the payload and append the tool turn. Errors are reply messages.
    async fn handle_tool_call(&mut self, payload: &Map<String, Value>) -> Result<String, String> {
        let request = ToolCallRequest::from_payload(payload).map_err(|e| e.to_string())?;
        let tool = normalize_tool_name(&request.tool).into_owned();

        let output = self
            .router
            .dispatch(&request)
            .await
            .map_err(|e| e.to_string())?;

        let envelope = NormalizedResult::from_output(tool.as_str(), output);
        let turn = serde_json::to_string(&envelope).map_err(|e| e.to_string())?;
        let reply = envelope.payload().to_string();

        self.transcript.append(Turn::tool(turn));
        tracing::info!(tool = %tool, "Tool call completed");
        Ok(reply)
    }
}

/// Reply text for a failed cycle, shaped like [`NormalizedResult::Error`].
fn error_reply(message: impl Into<String>) -> String {
    NormalizedResult::error(message).payload().to_string()
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, LlmResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use wayfarer_core::conversation::Role;
    use wayfarer_core::tool::{
        Arguments, ExecutionResult, FailureReason, MethodSpec, ParamKind, ParamSpec, Tool,
    };

    struct ScriptedModel {
        replies: Mutex<VecDeque<LlmResult<String>>>,
        seen_turns: Mutex<Vec<usize>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<LlmResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen_turns: Mutex::new(Vec::new()),
            })
        }

        fn replying(reply: &str) -> Arc<Self> {
            Self::new(vec![Ok(reply.to_string())])
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, transcript: &[Turn]) -> LlmResult<String> {
            self.seen_turns.lock().unwrap().push(transcript.len());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::invalid_response("script exhausted")))
        }
    }

    struct Destinations;

    #[async_trait]
    impl Tool for Destinations {
        fn methods(&self) -> Vec<MethodSpec> {
            vec![
                MethodSpec::new("get_info")
                    .with_param(ParamSpec::required("country_to", ParamKind::String)),
                MethodSpec::new("plain"),
                MethodSpec::new("broken"),
            ]
        }

        async fn call(&self, method: &str, arguments: &Arguments) -> ExecutionResult {
            match method {
                "get_info" => ExecutionResult::text(
                    json!({"country_to": arguments["country_to"], "code_to": "JPY"}).to_string(),
                ),
                "plain" => ExecutionResult::text("sunny"),
                _ => ExecutionResult::failed(FailureReason::NotFound {
                    message: "Country 'Atlantis' not found.".into(),
                }),
            }
        }
    }

    fn agent(model: Arc<ScriptedModel>) -> ToolAgent {
        let router = ToolRouter::new()
            .try_with_tool("travel_info", Arc::new(Destinations))
            .unwrap();
        ToolAgent::new(model, router, "system")
    }

    fn parse(reply: &str) -> Value {
        serde_json::from_str(reply).unwrap()
    }

    #[tokio::test]
    async fn seeds_single_system_turn() {
        let agent = agent(ScriptedModel::new(vec![]));
        assert_eq!(agent.transcript().len(), 1);
        assert_eq!(agent.transcript().turns()[0].role(), Role::System);
    }

    #[tokio::test]
    async fn fenced_tool_call_appends_user_tool_and_assistant() {
        let model = ScriptedModel::replying(
            "```json\n{\"tool\": \"travel_info.get_info\", \"arguments\": {\"country_to\": \"Japan\"}}\n```",
        );
        let mut agent = agent(model.clone());

        let reply = agent.run("Can I go to Japan?").await.unwrap();

        assert_eq!(parse(&reply), json!({"country_to": "Japan", "code_to": "JPY"}));
        let roles: Vec<Role> = agent.transcript().iter().map(|t| t.role()).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Tool, Role::Assistant]
        );

        let tool_turn = parse(agent.transcript().turns()[2].content());
        assert_eq!(tool_turn["tool"], "travel_info.get_info");
        assert_eq!(tool_turn["result"]["code_to"], "JPY");
        assert_eq!(agent.transcript().last().unwrap().content(), reply);

        // The model saw the system and user turns.
        assert_eq!(*model.seen_turns.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn prose_reply_is_invalid_tool_call() {
        let mut agent = agent(ScriptedModel::replying("Japan is lovely in spring."));

        let reply = agent.run("Can I go to Japan?").await.unwrap();

        assert_eq!(parse(&reply), json!({"error": INVALID_TOOL_CALL}));
        assert_eq!(agent.transcript().len(), 3);
        assert_eq!(agent.transcript().count_role(Role::Tool), 0);
    }

    #[tokio::test]
    async fn falsy_tool_field_is_invalid_tool_call() {
        for reply in [
            r#"{"tool": "", "arguments": {}}"#,
            r#"{"tool": null, "arguments": {}}"#,
            r#"{"tool": false, "arguments": {}}"#,
        ] {
            let mut agent = agent(ScriptedModel::replying(reply));
            let reply = agent.run("hi").await.unwrap();
            assert_eq!(parse(&reply), json!({"error": INVALID_TOOL_CALL}));
        }
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_reply() {
        let mut agent = agent(ScriptedModel::replying(
            r#"{"tool": "weather.today", "arguments": {}}"#,
        ));

        let reply = agent.run("Weather?").await.unwrap();

        assert_eq!(parse(&reply), json!({"error": "Unknown tool: weather.today"}));
        assert_eq!(agent.transcript().len(), 3);
        assert_eq!(agent.transcript().count_role(Role::Tool), 0);
    }

    #[tokio::test]
    async fn non_string_tool_is_invalid_request() {
        let mut agent = agent(ScriptedModel::replying(r#"{"tool": 7, "arguments": {}}"#));
        let reply = agent.run("hi").await.unwrap();
        assert_eq!(
            parse(&reply),
            json!({"error": "Tool name must be a string, got: 7"})
        );
    }

    #[tokio::test]
    async fn tool_failure_becomes_error_reply() {
        let mut agent = agent(ScriptedModel::replying(
            r#"{"tool": "travel_info.broken", "arguments": {}}"#,
        ));
        let reply = agent.run("Atlantis?").await.unwrap();
        assert_eq!(
            parse(&reply),
            json!({"error": "Country 'Atlantis' not found."})
        );
        assert_eq!(agent.transcript().count_role(Role::Tool), 0);
    }

    #[tokio::test]
    async fn invalid_arguments_become_error_reply() {
        let mut agent = agent(ScriptedModel::replying(
            r#"{"tool": "travel_info.get_info", "arguments": {"country": "Japan"}}"#,
        ));
        let reply = agent.run("Japan?").await.unwrap();
        assert!(parse(&reply)["error"].as_str().unwrap().contains("country_to"));
        assert_eq!(agent.transcript().len(), 3);
    }

    #[tokio::test]
    async fn shorthand_name_is_recorded_fully_qualified() {
        let mut agent = agent(ScriptedModel::replying(
            r#"{"tool": "travel_info", "arguments": {"country_to": "Japan"}}"#,
        ));
        agent.run("Japan?").await.unwrap();

        let tool_turn = parse(agent.transcript().turns()[2].content());
        assert_eq!(tool_turn["tool"], "travel_info.get_info");
    }

    #[tokio::test]
    async fn plain_text_output_is_wrapped_as_raw() {
        let mut agent = agent(ScriptedModel::replying(
            r#"{"tool": "travel_info.plain", "arguments": {}}"#,
        ));
        let reply = agent.run("Weather?").await.unwrap();
        assert_eq!(parse(&reply), json!({"raw": "sunny"}));
    }

    #[tokio::test]
    async fn model_failure_propagates_and_keeps_user_turn() {
        let mut agent = agent(ScriptedModel::new(vec![Err(LlmError::Status {
            status: 500,
            body: "boom".into(),
        })]));

        let err = agent.run("hello").await.unwrap_err();

        assert!(matches!(err, AgentError::Model(LlmError::Status { status: 500, .. })));
        assert_eq!(agent.transcript().len(), 2);
        assert_eq!(agent.transcript().last().unwrap().role(), Role::User);
    }

    #[tokio::test]
    async fn cycles_accumulate_in_order() {
        let model = ScriptedModel::new(vec![
            Ok("no idea".into()),
            Ok(r#"{"tool": "travel_info.get_info", "arguments": {"country_to": "Japan"}}"#.into()),
        ]);
        let mut agent = agent(model.clone());

        agent.run("first").await.unwrap();
        agent.run("second").await.unwrap();

        assert_eq!(agent.transcript().len(), 6);
        assert_eq!(*model.seen_turns.lock().unwrap(), vec![2, 4]);
        assert_eq!(agent.transcript().turns()[3].content(), "second");
    }

    #[test]
    fn truthiness_follows_json_values() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!("travel_info"))));
        assert!(is_truthy(Some(&json!(7))));
    }

    #[test]
    fn error_reply_matches_normalized_error_payload() {
        let reply = error_reply(INVALID_TOOL_CALL);
        assert_eq!(parse(&reply), json!({"error": INVALID_TOOL_CALL}));
        assert_eq!(
            parse(&reply),
            NormalizedResult::error(INVALID_TOOL_CALL).payload()
        );
    }

    #[test]
    fn travel_agent_prompt_states_origin_currency() {
        struct NoRates;

        #[async_trait]
        impl CurrencyService for NoRates {
            async fn country_currency(
                &self,
                country: &str,
            ) -> Result<wayfarer_tools::CurrencyInfo, FailureReason> {
                Err(FailureReason::NotFound {
                    message: format!("Country '{}' not found.", country),
                })
            }

            async fn exchange_rate(&self, _from: &str, _to: &str) -> Result<f64, FailureReason> {
                Err(FailureReason::NotFound {
                    message: "no rates".into(),
                })
            }
        }

        let mut config = AgentConfig::new("http://localhost/api/chat", "phi3");
        let agent =
            ToolAgent::with_travel_service(ScriptedModel::new(vec![]), &config, Arc::new(NoRates))
                .unwrap();
        let system = agent.transcript().turns()[0].content();
        assert!(system.contains("- My country is Israel"));
        assert!(system.contains("- My currency code is ILS"));

        config.country_from = "France".into();
        config.currency_from = None;
        let agent =
            ToolAgent::with_travel_service(ScriptedModel::new(vec![]), &config, Arc::new(NoRates))
                .unwrap();
        assert!(!agent.transcript().turns()[0].content().contains("currency code"));
    }

    #[test]
    fn transcript_exports_as_json_array() {
        let agent = agent(ScriptedModel::new(vec![]));
        let exported: Value = serde_json::from_str(&agent.transcript_json().unwrap()).unwrap();
        assert_eq!(exported, json!([{"role": "system", "content": "system"}]));
    }
}
