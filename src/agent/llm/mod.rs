//! LLM client abstraction layer.
//!
//! This module provides:
//! - [`LlmClient`] trait for swappable LLM providers
//! - [`ProviderRegistry`] for creating a client from configuration
//! - [`GeminiClient`], the Gemini API implementation
//!
//! # Adding a New Provider
//!
//! 1. Create a new file (e.g., `openai.rs`)
//! 2. Implement `LlmClient` trait
//! 3. Add to `ProviderRegistry::create()`
//! 4. Add config fields in `config.rs`

mod sse;
mod types;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::tools::ToolDefinition;
use crate::Result;

pub use sse::SseDecoder;
pub use types::*;

pub mod gemini;

pub use gemini::GeminiClient;

use super::message::{Message, ToolCallRequest};

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Text content of the response.
    pub content: Option<String>,

    /// Tool calls requested by the LLM.
    pub tool_calls: Vec<ToolCallRequest>,

    /// Reason the response finished.
    pub finish_reason: String,

    /// Token usage statistics.
    pub usage: Usage,
}

impl LlmResponse {
    /// Create a simple text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
            usage: Usage::default(),
        }
    }

    /// Check if response has tool calls.
    #[inline]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// LLM client trait: swappable provider abstraction.
///
/// Implement this trait to add a new LLM provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send messages and get response.
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse>;

    /// Send messages and stream text fragments to `on_text` as they arrive.
    ///
    /// Providers without streaming support emit the whole text once.
    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_text: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<LlmResponse> {
        let response = self.chat(messages, tools).await?;
        if let Some(text) = response.content.as_deref().filter(|t| !t.is_empty()) {
            on_text(text);
        }
        Ok(response)
    }

    /// Get the default model for this provider.
    fn default_model(&self) -> &str;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        (**self).chat(messages, tools).await
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_text: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<LlmResponse> {
        (**self).chat_stream(messages, tools, on_text).await
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        (**self).chat(messages, tools).await
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_text: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<LlmResponse> {
        (**self).chat_stream(messages, tools, on_text).await
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }
}

/// Provider registry: creates LLM clients from configuration.
///
/// # Example
///
/// ```ignore
/// let client = ProviderRegistry::create(&config)?;
/// let response = client.chat(&messages, &tools).await?;
/// ```
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Create an LLM client from configuration.
    ///
    /// Supported providers:
    /// - `"gemini"`: Gemini API with API key authentication
    pub fn create(config: &Config) -> Result<Box<dyn LlmClient>> {
        match config.provider.as_str() {
            "gemini" => {
                let client = GeminiClient::new(&config.gemini_api_key, &config.model)
                    .with_base_url(&config.api_base);
                Ok(Box::new(client))
            }
            other => Err(Error::Config(format!("Unknown provider: {other}"))),
        }
    }

    /// List available provider names.
    pub fn available() -> &'static [&'static str] {
        &["gemini"]
    }
}

/// Fake LLM client for testing.
#[cfg(test)]
pub struct FakeLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<LlmResponse>>>,
    seen: std::sync::Mutex<Vec<Vec<Message>>>,
}

#[cfg(test)]
impl FakeLlmClient {
    /// Create with predefined text responses.
    pub fn new(responses: Vec<&str>) -> Self {
        Self::scripted(responses.iter().map(|s| LlmResponse::text(*s)).collect())
    }

    /// Create with an arbitrary sequence of responses.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().map(Ok).collect()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a client whose first call fails.
    pub fn failing(message: &str) -> Self {
        let client = Self::scripted(vec![]);
        client
            .responses
            .lock()
            .unwrap()
            .push_back(Err(Error::Llm(message.to_string())));
        client
    }

    /// Create with a single tool call followed by a text response.
    pub fn with_tool_call(name: &str, args: serde_json::Value, final_response: &str) -> Self {
        Self::scripted(vec![
            Self::tool_call_response(name, args),
            LlmResponse::text(final_response),
        ])
    }

    /// A response requesting one tool call.
    pub fn tool_call_response(name: &str, args: serde_json::Value) -> LlmResponse {
        LlmResponse {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: "tc_1".to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: "tool_calls".to_string(),
            usage: Usage::default(),
        }
    }

    /// Message lists received so far, one entry per call.
    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn chat(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let mut responses = self.responses.lock().unwrap();
        responses
            .pop_front()
            .unwrap_or_else(|| Err(Error::Llm("No more fake responses".to_string())))
    }

    fn default_model(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_llm_client() {
        let client = FakeLlmClient::new(vec!["Hello!", "World!"]);

        let resp1 = client.chat(&[], &[]).await.unwrap();
        assert_eq!(resp1.content.as_deref(), Some("Hello!"));

        let resp2 = client.chat(&[], &[]).await.unwrap();
        assert_eq!(resp2.content.as_deref(), Some("World!"));

        assert!(client.chat(&[], &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_default_stream_emits_whole_text() {
        let client = FakeLlmClient::new(vec!["all at once"]);
        let collected = std::sync::Mutex::new(Vec::new());
        let on_text = |t: &str| collected.lock().unwrap().push(t.to_string());

        let resp = client.chat_stream(&[], &[], &on_text).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("all at once"));
        assert_eq!(*collected.lock().unwrap(), vec!["all at once".to_string()]);
    }

    #[tokio::test]
    async fn test_boxed_client_delegates() {
        let client: Box<dyn LlmClient> = Box::new(FakeLlmClient::new(vec!["boxed"]));
        let resp = client.chat(&[], &[]).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("boxed"));
        assert_eq!(client.default_model(), "fake-model");
    }

    #[test]
    fn test_registry_rejects_unknown_provider() {
        let mut config = Config::default();
        config.provider = "mystery".to_string();
        assert!(ProviderRegistry::create(&config).is_err());

        config.provider = "gemini".to_string();
        let client = ProviderRegistry::create(&config).unwrap();
        assert_eq!(client.default_model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_usage_accumulates() {
        let mut total = Usage::default();
        total += Usage { prompt_tokens: 3, completion_tokens: 2, total_tokens: 5 };
        total += Usage { prompt_tokens: 1, completion_tokens: 1, total_tokens: 2 };
        assert_eq!(total.total_tokens, 7);
    }
}
