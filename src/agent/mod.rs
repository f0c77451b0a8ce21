//! Agent module: core agent logic.
//!
//! This module contains:
//! - Message types (Message, InboundMessage, Response)
//! - LLM client trait and the Gemini implementation
//! - Agent definition (name, instructions, tools)
//! - Agent loop for running a conversation, sync or streamed
//!
//! # Adding a New LLM Provider
//!
//! See [`llm::ProviderRegistry`] for instructions.

mod definition;
mod loop_impl;
mod message;

// LLM providers in submodule
pub mod llm;

// Re-exports for convenience
pub use definition::Agent;
pub use llm::{GeminiClient, LlmClient, LlmResponse, ProviderRegistry, Usage};
pub use loop_impl::{AgentLoop, RunResult, StreamEvent};
pub use message::{InboundMessage, Message, Response, Role, ToolCallRequest};
