//! Agent loop - runs an agent over a conversation until it produces an answer

use tracing::{debug, info};
use crate::Result;
use crate::error::Error;
use super::definition::Agent;
use super::llm::{LlmClient, Usage};
use super::message::{Message, ToolCallRequest};

/// Progress reported by a streamed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text fragment from the model
    TextDelta(String),
    /// A tool is about to run
    ToolStarted { name: String, label: String },
    /// A tool finished; `output` is what the model will see
    ToolFinished { name: String, output: String },
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Full text of the model's final turn
    pub final_output: String,
    /// Model calls made
    pub turns: usize,
    /// Token usage summed over all model calls
    pub usage: Usage,
}

/// The agent loop processes a conversation through the LLM and tool execution
pub struct AgentLoop<C: LlmClient> {
    client: C,
    max_iterations: usize,
    max_history: usize,
}

impl<C: LlmClient> AgentLoop<C> {
    /// Create a new agent loop
    pub fn new(client: C, max_iterations: usize) -> Self {
        Self {
            client,
            max_iterations,
            max_history: 0,
        }
    }

    /// Limit how many history entries are sent per call (0 = all)
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn model(&self) -> &str {
        self.client.default_model()
    }

    /// Run the agent on `input` and wait for the final answer
    pub async fn run(&self, agent: &Agent, input: &[Message]) -> Result<RunResult> {
        self.run_inner(agent, input, None).await
    }

    /// Run the agent on `input`, reporting text and tool steps as they happen
    pub async fn run_streamed(
        &self,
        agent: &Agent,
        input: &[Message],
        on_event: &(dyn Fn(StreamEvent) + Send + Sync),
    ) -> Result<RunResult> {
        self.run_inner(agent, input, Some(on_event)).await
    }

    async fn run_inner(
        &self,
        agent: &Agent,
        input: &[Message],
        on_event: Option<&(dyn Fn(StreamEvent) + Send + Sync)>,
    ) -> Result<RunResult> {
        let mut messages = agent.build_messages(input, self.max_history);
        let tools = agent.tools.definitions();
        let mut usage = Usage::default();

        info!("Running agent '{}' with {} history messages", agent.name, input.len());

        for iteration in 0..self.max_iterations {
            debug!("Iteration {}/{}", iteration + 1, self.max_iterations);

            let response = match on_event {
                Some(emit) => {
                    let on_text = |text: &str| emit(StreamEvent::TextDelta(text.to_string()));
                    self.client.chat_stream(&messages, &tools, &on_text).await?
                }
                None => self.client.chat(&messages, &tools).await?,
            };
            usage += response.usage;

            if !response.has_tool_calls() {
                let final_output = response.content.unwrap_or_default();
                info!("Agent '{}' completed with response: {} chars", agent.name, final_output.len());
                return Ok(RunResult {
                    final_output,
                    turns: iteration + 1,
                    usage,
                });
            }

            messages.push(Message::assistant_with_tools(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            for tool_call in &response.tool_calls {
                if let Some(emit) = on_event {
                    emit(StreamEvent::ToolStarted {
                        name: tool_call.name.clone(),
                        label: agent.tools.label(&tool_call.name),
                    });
                }

                let output = self.execute_tool(agent, tool_call).await;

                if let Some(emit) = on_event {
                    emit(StreamEvent::ToolFinished {
                        name: tool_call.name.clone(),
                        output: output.clone(),
                    });
                }
                messages.push(Message::tool_result(tool_call, output));
            }
        }

        Err(Error::MaxIterations)
    }

    async fn execute_tool(&self, agent: &Agent, tool_call: &ToolCallRequest) -> String {
        debug!("Executing tool: {} with args: {}", tool_call.name, tool_call.arguments);

        match agent.tools.execute(&tool_call.name, tool_call.arguments.clone()).await {
            Ok(result) => {
                debug!("Tool {} succeeded: {} chars", tool_call.name, result.len());
                result
            }
            Err(e) => {
                let error_msg = format!("Error: {}", e);
                debug!("Tool {} failed: {}", tool_call.name, error_msg);
                error_msg
            }
        }
    }
}
