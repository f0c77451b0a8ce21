//! Gemini LLM client implementation (API key authentication).

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::Error;
use crate::tools::ToolDefinition;
use crate::Result;

use super::super::message::{Message, Role, ToolCallRequest};
use super::{GeminiResponse, LlmClient, LlmResponse, SseDecoder, Usage};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client using API key authentication.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client with API key.
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_API_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Point the client at a different models endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// The key travels in the `x-goog-api-key` header, never in the URL.
    fn build_url(&self, stream: bool) -> String {
        if stream {
            format!("{}/{}:streamGenerateContent?alt=sse", self.base_url, self.model)
        } else {
            format!("{}/{}:generateContent", self.base_url, self.model)
        }
    }

    fn convert_messages(&self, messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| match m.role {
                Role::Tool => json!({
                    "role": "user",
                    "parts": [{
                        "functionResponse": {
                            "name": m.tool_name.as_deref().unwrap_or("unknown"),
                            "response": {"result": m.content}
                        }
                    }]
                }),
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if !m.content.is_empty() {
                        parts.push(json!({"text": m.content}));
                    }
                    for tc in m.tool_calls.iter().flatten() {
                        parts.push(json!({
                            "functionCall": {
                                "name": tc.name,
                                "args": tc.arguments
                            }
                        }));
                    }
                    if parts.is_empty() {
                        parts.push(json!({"text": ""}));
                    }
                    json!({"role": "model", "parts": parts})
                }
                Role::User | Role::System => json!({
                    "role": "user",
                    "parts": [{"text": m.content}]
                }),
            })
            .collect()
    }

    fn get_system_instruction(&self, messages: &[Message]) -> Option<String> {
        messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone())
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Option<Value> {
        if tools.is_empty() {
            return None;
        }

        let function_declarations: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters
                })
            })
            .collect();

        Some(json!([{
            "functionDeclarations": function_declarations
        }]))
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolDefinition]) -> Value {
        let mut request = json!({
            "contents": self.convert_messages(messages),
            "generationConfig": {
                "temperature": 0.7,
                "maxOutputTokens": 8192
            }
        });

        if let Some(system) = self.get_system_instruction(messages) {
            request["systemInstruction"] = json!({
                "parts": [{"text": system}]
            });
        }

        if let Some(tool_config) = self.convert_tools(tools) {
            request["tools"] = tool_config;
        }

        request
    }

    async fn send(&self, request: &Value, stream: bool) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.build_url(stream))
            .header("x-goog-api-key", self.api_key.as_str())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(Error::Llm(format!("Gemini API error ({status}): {error_text}")));
        }

        Ok(response)
    }
}

/// Folds one or more Gemini responses into a single [`LlmResponse`].
#[derive(Debug, Default)]
struct ResponseAccumulator {
    text: String,
    tool_calls: Vec<ToolCallRequest>,
    finish_reason: Option<String>,
    usage: Usage,
    saw_candidate: bool,
}

impl ResponseAccumulator {
    fn apply(
        &mut self,
        chunk: &GeminiResponse,
        on_text: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) {
        if let Some(u) = chunk.usage_metadata.as_ref() {
            self.usage = Usage {
                prompt_tokens: u.prompt_token_count.unwrap_or(0),
                completion_tokens: u.candidates_token_count.unwrap_or(0),
                total_tokens: u.total_token_count.unwrap_or(0),
            };
        }

        let Some(candidate) = chunk.candidates.first() else {
            return;
        };
        self.saw_candidate = true;

        if let Some(reason) = candidate.finish_reason.as_ref() {
            self.finish_reason = Some(reason.clone());
        }

        for part in candidate.content.iter().flat_map(|c| c.parts.iter()) {
            if let Some(text) = part.text.as_deref().filter(|t| !t.is_empty()) {
                self.text.push_str(text);
                on_text(text);
            }

            if let Some(fc) = part.function_call.as_ref() {
                self.tool_calls.push(ToolCallRequest {
                    id: format!("call_{}", self.tool_calls.len()),
                    name: fc.name.clone(),
                    arguments: fc.args.clone(),
                });
            }
        }
    }

    fn finish(self) -> Result<LlmResponse> {
        if !self.saw_candidate {
            return Err(Error::Llm("No candidates in response".to_string()));
        }

        Ok(LlmResponse {
            content: (!self.text.is_empty()).then_some(self.text),
            tool_calls: self.tool_calls,
            finish_reason: self.finish_reason.unwrap_or_else(|| "stop".to_string()),
            usage: self.usage,
        })
    }
}

fn ignore_text(_: &str) {}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools);
        let response = self.send(&request, false).await?;

        let gemini_response: GeminiResponse = response.json().await?;
        let mut acc = ResponseAccumulator::default();
        acc.apply(&gemini_response, &ignore_text);
        acc.finish()
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_text: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<LlmResponse> {
        let request = self.build_request(messages, tools);
        let response = self.send(&request, true).await?;

        let mut acc = ResponseAccumulator::default();
        let mut decoder = SseDecoder::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for payload in decoder.push(&chunk) {
                apply_payload(&mut acc, &payload, on_text);
            }
        }
        for payload in decoder.finish() {
            apply_payload(&mut acc, &payload, on_text);
        }

        acc.finish()
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}

fn apply_payload(
    acc: &mut ResponseAccumulator,
    payload: &str,
    on_text: &(dyn for<'a> Fn(&'a str) + Send + Sync),
) {
    match serde_json::from_str::<GeminiResponse>(payload) {
        Ok(chunk) => acc.apply(&chunk, on_text),
        Err(e) => debug!("Skipping unparsable stream chunk ({}): {}", e, payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn client() -> GeminiClient {
        GeminiClient::new("test-key", "gemini-2.0-flash")
    }

    #[test]
    fn test_urls() {
        let c = client().with_base_url("http://localhost:9999/models/");
        assert_eq!(
            c.build_url(false),
            "http://localhost:9999/models/gemini-2.0-flash:generateContent"
        );
        assert!(c.build_url(true).ends_with(":streamGenerateContent?alt=sse"));
        assert!(!c.build_url(true).contains("test-key"));
    }

    #[test]
    fn test_request_shape() {
        let call = ToolCallRequest {
            id: "call_0".to_string(),
            name: "get_student_data".to_string(),
            arguments: json!({"student_id": "101"}),
        };
        let messages = vec![
            Message::system("You are a helpful assistant"),
            Message::user("Who is 101?"),
            Message::assistant_with_tools("", vec![call.clone()]),
            Message::tool_result(&call, "Alice"),
            Message::assistant("Alice Johnson"),
        ];
        let tools = vec![ToolDefinition {
            name: "get_student_data".to_string(),
            description: "Get the student data by student ID".to_string(),
            parameters: json!({"type": "object"}),
        }];

        let request = client().build_request(&messages, &tools);

        assert_eq!(
            request["systemInstruction"]["parts"][0]["text"],
            "You are a helpful assistant"
        );
        let contents = request["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "get_student_data");
        assert_eq!(contents[2]["parts"][0]["functionResponse"]["name"], "get_student_data");
        assert_eq!(contents[2]["parts"][0]["functionResponse"]["response"]["result"], "Alice");
        assert_eq!(contents[3]["parts"][0]["text"], "Alice Johnson");
        assert_eq!(
            request["tools"][0]["functionDeclarations"][0]["name"],
            "get_student_data"
        );
    }

    #[test]
    fn test_no_tools_omits_declarations() {
        let request = client().build_request(&[Message::user("hi")], &[]);
        assert!(request.get("tools").is_none());
        assert!(request.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_text_and_function_call() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Let me check. "},
                    {"functionCall": {"name": "get_weather", "args": {"location": "Karachi"}}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3, "totalTokenCount": 10}
        });
        let parsed: GeminiResponse = serde_json::from_value(raw).unwrap();

        let mut acc = ResponseAccumulator::default();
        acc.apply(&parsed, &ignore_text);
        let response = acc.finish().unwrap();

        assert_eq!(response.content.as_deref(), Some("Let me check. "));
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].arguments["location"], "Karachi");
        assert_eq!(response.finish_reason, "STOP");
        assert_eq!(response.usage.total_tokens, 10);
    }

    #[test]
    fn test_stream_chunks_concatenate() {
        let seen = Mutex::new(Vec::new());
        let on_text = |t: &str| seen.lock().unwrap().push(t.to_string());

        let mut acc = ResponseAccumulator::default();
        for payload in [
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#,
            r#"not json"#,
            r#"{"candidates":[{"content":{"parts":[{"text":", world"}]},"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":4}}"#,
        ] {
            apply_payload(&mut acc, payload, &on_text);
        }
        let response = acc.finish().unwrap();

        assert_eq!(response.content.as_deref(), Some("Hello, world"));
        assert_eq!(*seen.lock().unwrap(), vec!["Hello", ", world"]);
        assert_eq!(response.usage.total_tokens, 4);
    }

    #[test]
    fn test_empty_response_is_error() {
        let parsed: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        let mut acc = ResponseAccumulator::default();
        acc.apply(&parsed, &ignore_text);
        assert!(acc.finish().is_err());
    }
}
