//! Bots module: chat event handlers.
//!
//! A bot reacts to two events from a channel: a chat starting and a message
//! arriving. Three bots ship with the crate:
//!
//! - **echo**: repeats the message back; no model involved
//! - **support**: Swift Solves Studios support agent, plain replies
//! - **assistant**: general assistant with school lookup tools, streamed replies

mod agent_bot;
mod echo;
mod profiles;

pub use agent_bot::AgentBot;
pub use echo::EchoBot;
pub use profiles::{assistant, support};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentLoop, LlmClient, StreamEvent};
use crate::config::Config;
use crate::session::Session;
use crate::Result;

/// Which bot to serve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    Echo,
    Support,
    #[default]
    Assistant,
}

impl BotKind {
    pub fn all() -> &'static [BotKind] {
        &[BotKind::Echo, BotKind::Support, BotKind::Assistant]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BotKind::Echo => "echo",
            BotKind::Support => "support",
            BotKind::Assistant => "assistant",
        }
    }

    /// Whether the bot calls the model
    pub fn needs_llm(&self) -> bool {
        !matches!(self, BotKind::Echo)
    }
}

impl std::fmt::Display for BotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suggested opening message shown when a chat starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Starter {
    pub label: String,
    pub message: String,
}

impl Starter {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

/// Event handlers for one kind of bot.
#[async_trait]
pub trait ChatBot: Send + Sync {
    fn kind(&self) -> BotKind;

    /// Display name
    fn name(&self) -> &str;

    /// Model used for replies, if any
    fn model(&self) -> Option<&str> {
        None
    }

    /// Suggested opening messages
    fn starters(&self) -> Vec<Starter> {
        Vec::new()
    }

    /// Called once on a fresh session; returns the greeting to send, if any.
    async fn on_chat_start(&self, session: &mut Session) -> Result<Option<String>>;

    /// Handle one user message and return the reply text.
    ///
    /// Streaming bots report progress through `on_event` before returning.
    async fn on_message(
        &self,
        session: &mut Session,
        content: &str,
        on_event: &(dyn Fn(StreamEvent) + Send + Sync),
    ) -> Result<String>;
}

/// Build the bot for `kind` on top of `client`.
pub fn build<C: LlmClient + 'static>(kind: BotKind, client: C, config: &Config) -> Box<dyn ChatBot> {
    match kind {
        BotKind::Echo => Box::new(EchoBot),
        BotKind::Support | BotKind::Assistant => {
            let runner = AgentLoop::new(client, config.max_iterations)
                .with_max_history(config.max_history_messages);
            if kind == BotKind::Support {
                Box::new(support(runner))
            } else {
                Box::new(assistant(runner))
            }
        }
    }
}

/// Map a starter label typed by the user to the starter's message.
pub fn resolve_starter(bot: &dyn ChatBot, input: &str) -> String {
    let trimmed = input.trim();
    bot.starters()
        .into_iter()
        .find(|s| s.label.eq_ignore_ascii_case(trimmed))
        .map(|s| s.message)
        .unwrap_or_else(|| input.to_string())
}
