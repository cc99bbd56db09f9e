//! AutoGenAgent -- framework-style [`ChatAgent`].
//!
//! Each turn builds a short-lived [`AssistantAgent`] (model, credential,
//! temperature, system message), hands it a single user message, and reads
//! back a reply that is either bare text or a structured message object.
//! The assistant talks to an OpenAI-compatible backend synchronously, so the
//! whole exchange runs on the [`BlockingPool`].

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use chatbridge_core::agent::chat_agent::ChatAgent;
use chatbridge_types::error::ProviderError;
use chatbridge_types::provider::ProviderKind;

use crate::worker::BlockingPool;

use super::openai_compat::types::{ChatCompletionRequest, ChatMessage};

/// Backend settings for an [`AssistantAgent`].
#[derive(Clone)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: SecretString,
    pub base_url: String,
    pub temperature: f64,
    pub timeout: Duration,
}

/// What an assistant hands back for one exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    Text(String),
    /// The raw assistant message, e.g. when it carries tool calls.
    Structured(Value),
}

impl AssistantReply {
    /// Build a reply from the assistant message of a completion response.
    fn from_message(message: Value) -> Self {
        let has_calls = message.get("tool_calls").is_some_and(|v| !v.is_null())
            || message.get("function_call").is_some_and(|v| !v.is_null());
        match message.get("content").and_then(Value::as_str) {
            Some(text) if !has_calls => AssistantReply::Text(text.to_string()),
            _ => AssistantReply::Structured(message),
        }
    }

    /// The textual content, wherever it lives.
    pub fn content(&self) -> Option<&str> {
        match self {
            AssistantReply::Text(text) => Some(text),
            AssistantReply::Structured(value) => value.get("content").and_then(Value::as_str),
        }
    }
}

/// A single-use conversational assistant.
pub struct AssistantAgent {
    name: String,
    llm_config: LlmConfig,
    system_message: String,
}

impl AssistantAgent {
    pub fn new(name: impl Into<String>, llm_config: LlmConfig, system_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            llm_config,
            system_message: system_message.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blocking: send `messages` after the system message and return the reply.
    pub fn generate_reply(&self, messages: &[ChatMessage]) -> Result<AssistantReply, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.llm_config.timeout)
            .build()
            .map_err(|e| ProviderError::transport(format!("failed to create AutoGen client: {e}")))?;

        let mut all = Vec::with_capacity(messages.len() + 1);
        all.push(ChatMessage::system(self.system_message.clone()));
        all.extend_from_slice(messages);

        let body = ChatCompletionRequest {
            model: self.llm_config.model.clone(),
            messages: all,
            temperature: self.llm_config.temperature,
        };

        let url = format!(
            "{}/chat/completions",
            self.llm_config.base_url.trim_end_matches('/')
        );
        let response = client
            .post(&url)
            .bearer_auth(self.llm_config.api_key.expose_secret())
            .json(&body)
            .send()
            .map_err(|e| ProviderError::transport(format!("AutoGen request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::http_status(
                status.as_u16(),
                format!("AutoGen request failed ({}): {body}", status.as_u16()),
            ));
        }

        let payload: Value = response
            .json()
            .map_err(|e| ProviderError::decode(format!("failed to parse AutoGen response: {e}")))?;

        let message = payload
            .pointer("/choices/0/message")
            .cloned()
            .ok_or_else(|| ProviderError::empty_response("AutoGen response was empty."))?;
        Ok(AssistantReply::from_message(message))
    }
}

pub struct AutoGenConfig {
    /// Assistant name, e.g. `"A"`.
    pub name: String,
    pub llm: LlmConfig,
    pub system_prompt: String,
}

// No Debug: holds the API key.
pub struct AutoGenAgent {
    config: AutoGenConfig,
    pool: BlockingPool,
}

impl AutoGenAgent {
    pub fn new(config: AutoGenConfig, pool: BlockingPool) -> Self {
        Self { config, pool }
    }
}

impl ChatAgent for AutoGenAgent {
    fn provider(&self) -> ProviderKind {
        ProviderKind::AutoGen
    }

    fn model(&self) -> &str {
        &self.config.llm.model
    }

    async fn generate_reply(&self, context: &str, _memory_window: usize) -> Result<String, ProviderError> {
        let name = self.config.name.clone();
        let llm = self.config.llm.clone();
        let system = self.config.system_prompt.clone();
        let prompt = context.to_string();

        self.pool
            .run(move || {
                let assistant = AssistantAgent::new(name, llm, system);
                let reply = assistant.generate_reply(&[ChatMessage::user(prompt)])?;
                debug!(
                    assistant = assistant.name(),
                    structured = matches!(reply, AssistantReply::Structured(_)),
                    "autogen reply received"
                );
                reply
                    .content()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| ProviderError::empty_response("AutoGen response was empty."))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbridge_types::error::ProviderErrorKind;
    use mockito::Matcher;
    use serde_json::json;

    use crate::llm::test_support::{silent_backend, ticks_during};

    fn agent(base_url: &str) -> AutoGenAgent {
        agent_with_timeout(base_url, Duration::from_secs(5))
    }

    fn agent_with_timeout(base_url: &str, timeout: Duration) -> AutoGenAgent {
        AutoGenAgent::new(
            AutoGenConfig {
                name: "A".to_string(),
                llm: LlmConfig {
                    model: "gpt-4o-mini".to_string(),
                    api_key: SecretString::from("sk-autogen".to_string()),
                    base_url: base_url.to_string(),
                    temperature: 0.5,
                    timeout,
                },
                system_prompt: "You debate.".to_string(),
            },
            BlockingPool::new(1),
        )
    }

    #[test]
    fn text_reply_exposes_content() {
        let reply = AssistantReply::from_message(json!({"role": "assistant", "content": "plain"}));
        assert_eq!(reply, AssistantReply::Text("plain".into()));
        assert_eq!(reply.content(), Some("plain"));
    }

    #[test]
    fn structured_reply_reads_content_field() {
        let reply = AssistantReply::from_message(json!({
            "role": "assistant",
            "content": "calling a tool",
            "tool_calls": [{"id": "c1"}]
        }));
        assert!(matches!(reply, AssistantReply::Structured(_)));
        assert_eq!(reply.content(), Some("calling a tool"));

        let reply = AssistantReply::from_message(json!({"role": "assistant", "content": null}));
        assert_eq!(reply.content(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_single_user_message_after_system() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-autogen")
            .match_body(Matcher::Json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "You debate."},
                    {"role": "user", "content": "motion: tabs over spaces"}
                ],
                "temperature": 0.5
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Opposed. "}}]}"#)
            .create_async()
            .await;

        let reply = agent(&format!("{}/v1", server.url()))
            .generate_reply("motion: tabs over spaces", 8)
            .await
            .unwrap();
        assert_eq!(reply, "Opposed.");
        mock.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_content_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[{"id":"x"}]}}]}"#)
            .create_async()
            .await;

        let err = agent(&server.url()).generate_reply("hi", 8).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::EmptyResponse);
        assert_eq!(err.message, "AutoGen response was empty.");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn no_choices_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = agent(&server.url()).generate_reply("hi", 8).await.unwrap_err();
        assert_eq!(err.message, "AutoGen response was empty.");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stalled_backend_does_not_block_the_event_loop() {
        let (url, backend) = silent_backend().await;
        let agent = agent_with_timeout(&url, Duration::from_secs(1));

        let (result, elapsed, ticks) = ticks_during(agent.generate_reply("hi", 8)).await;
        backend.abort();

        assert_eq!(result.unwrap_err().kind, ProviderErrorKind::Transport);
        assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(10), "returned after {elapsed:?}");
        assert!(ticks >= 5, "only {ticks} ticks while the call was in flight");
    }
}
