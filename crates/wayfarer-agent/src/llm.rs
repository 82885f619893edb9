//! # Language Model Client
//!
//! The dispatcher talks to the model through [`LanguageModel`]: the full
//! transcript goes in, one reply text comes out. [`ChatClient`] implements
//! it for chat endpoints that accept `{"model", "messages", "stream"}` and
//! answer with `{"message": {"content": ...}}`.

use crate::config::AgentConfig;
use crate::error::{LlmError, LlmResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use wayfarer_core::conversation::Turn;

/// Text-generating collaborator consulted once per dispatch cycle.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produce a reply for the ordered transcript.
    ///
    /// Transport, status and response-shape failures are returned as errors;
    /// the dispatcher does not retry them.
    async fn complete(&self, transcript: &[Turn]) -> LlmResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    stream: bool,
}

/// HTTP chat client for a single non-streaming endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            model: model.into(),
            timeout,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(&config.api_url, &config.model, config.request_timeout)
    }

    fn map_send_error(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            LlmError::Transport(error)
        }
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    #[tracing::instrument(skip_all, fields(model = %self.model, turns = transcript.len()))]
    async fn complete(&self, transcript: &[Turn]) -> LlmResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: transcript,
            stream: false,
        };

        let started = Instant::now();
        let response = self
            .http
            .post(&self.api_url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Model endpoint returned error status");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| LlmError::invalid_response(format!("body is not JSON: {}", e)))?;

        let content = data
            .get("message")
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| LlmError::invalid_response("missing 'message.content' field"))?;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_bytes = content.len(),
            "Model replied"
        );
        Ok(content.to_string())
    }
}
