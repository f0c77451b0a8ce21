//! Adapters module: chat platform integrations.
//!
//! This module provides channel adapters for different chat platforms.
//! Each adapter implements the [`Channel`] trait and hands inbound messages
//! to [`dispatch`], which owns session lookup and error reporting.
//!
//! # Supported Channels
//!
//! - **CLI**: Interactive command line interface
//! - **Telegram**: Telegram Bot API via teloxide
//!
//! # Adding a New Channel
//!
//! 1. Create a new file (e.g., `slack.rs`)
//! 2. Implement the [`Channel`] trait
//! 3. Add to [`ChannelRegistry`]

pub mod cli;
pub mod telegram;

use tracing::error;

use crate::agent::{InboundMessage, Response, StreamEvent};
use crate::bots::{self, ChatBot};
use crate::config::Config;
use crate::session::SessionStore;

/// Channel trait for chat adapters.
///
/// All channel implementations must be [`Send`] + [`Sync`] for async compatibility.
pub trait Channel: Send + Sync {
    /// Channel name (e.g., "telegram", "cli").
    fn name(&self) -> &str;

    /// Start listening for messages.
    fn start(&self) -> impl std::future::Future<Output = crate::Result<()>> + Send;

    /// Stop the channel.
    fn stop(&self) -> impl std::future::Future<Output = crate::Result<()>> + Send;
}

/// Route one inbound message to the bot and produce the reply.
///
/// The session is created on first contact. Any failure becomes the reply
/// `Error: <text>`; nothing is retried.
pub async fn dispatch(
    bot: &dyn ChatBot,
    sessions: &SessionStore,
    inbound: &InboundMessage,
    on_event: &(dyn Fn(StreamEvent) + Send + Sync),
) -> Response {
    let handle = sessions.get_or_start(&inbound.session_key()).await;
    let mut session = handle.lock().await;
    let content = bots::resolve_starter(bot, &inbound.content);

    match bot.on_message(&mut session, &content, on_event).await {
        Ok(reply) => Response::to(inbound, reply),
        Err(e) => {
            error!("Error handling message for {}: {}", inbound.session_key(), e);
            Response::error(inbound, format!("Error: {}", e))
        }
    }
}

/// Start (or restart) a chat and return the greeting, if the bot has one.
pub async fn start_chat(
    bot: &dyn ChatBot,
    sessions: &SessionStore,
    session_key: &str,
) -> crate::Result<Option<String>> {
    let handle = sessions.start(session_key).await;
    let mut session = handle.lock().await;
    bot.on_chat_start(&mut session).await
}

/// Channel registry: metadata about available channels.
///
/// # Example
///
/// ```ignore
/// for name in ChannelRegistry::available() {
///     if ChannelRegistry::is_enabled(name, &config) {
///         println!("{} is enabled", name);
///     }
/// }
/// ```
pub struct ChannelRegistry;

impl ChannelRegistry {
    /// List all available channel names.
    pub fn available() -> &'static [&'static str] {
        &["cli", "telegram"]
    }

    /// Check if a channel is enabled in the config.
    pub fn is_enabled(name: &str, config: &Config) -> bool {
        match name {
            "cli" => true, // CLI is always available
            "telegram" => config.telegram.enabled && !config.telegram.token.is_empty(),
            _ => false,
        }
    }

    /// Get a human-readable description of a channel.
    pub fn description(name: &str) -> &'static str {
        match name {
            "cli" => "Interactive command line interface",
            "telegram" => "Telegram Bot API",
            _ => "Unknown channel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::FakeLlmClient;
    use crate::agent::GeminiClient;
    use crate::bots::BotKind;

    fn no_events(_: StreamEvent) {}

    #[tokio::test]
    async fn test_dispatch_replies_and_records_history() {
        let bot = bots::build(BotKind::Support, FakeLlmClient::new(vec!["Hi!"]), &Config::default());
        let sessions = SessionStore::new();
        let inbound = InboundMessage::new("cli", "t1", "Hello");

        let response = dispatch(bot.as_ref(), &sessions, &inbound, &no_events).await;

        assert!(!response.is_error);
        assert_eq!(response.content, "SwiftSolvesStudios: Hi!");
        assert_eq!(response.chat_id, "t1");
        let handle = sessions.get("cli:t1").await.unwrap();
        assert_eq!(handle.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_catch_all() {
        let bot = bots::build(
            BotKind::Assistant,
            FakeLlmClient::failing("model unavailable"),
            &Config::default(),
        );
        let sessions = SessionStore::new();
        let inbound = InboundMessage::new("cli", "t2", "Hello");

        let response = dispatch(bot.as_ref(), &sessions, &inbound, &no_events).await;

        assert!(response.is_error);
        assert_eq!(response.content, "Error: LLM error: model unavailable");
    }

    #[tokio::test]
    async fn test_dispatch_error_never_echoes_api_key() {
        let client = GeminiClient::new("SECRET-KEY-123", "gemini-2.0-flash")
            .with_base_url("http://127.0.0.1:1/models");
        let bot = bots::build(BotKind::Support, client, &Config::default());
        let sessions = SessionStore::new();
        let inbound = InboundMessage::new("telegram", "t5", "Hello");

        let response = dispatch(bot.as_ref(), &sessions, &inbound, &no_events).await;

        assert!(response.is_error);
        assert!(response.content.starts_with("Error: HTTP error"));
        assert!(!response.content.contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn test_dispatch_expands_starter() {
        let bot = bots::build(BotKind::Echo, FakeLlmClient::new(vec![]), &Config::default());
        let sessions = SessionStore::new();
        let inbound = InboundMessage::new("cli", "t3", "Greetings");

        // Echo has no starters, so the label passes through unchanged
        let response = dispatch(bot.as_ref(), &sessions, &inbound, &no_events).await;
        assert_eq!(response.content, "Echo: Greetings");
    }

    #[tokio::test]
    async fn test_start_chat_resets_session() {
        let bot = bots::build(BotKind::Support, FakeLlmClient::new(vec!["ok"]), &Config::default());
        let sessions = SessionStore::new();
        let inbound = InboundMessage::new("cli", "t4", "first");
        dispatch(bot.as_ref(), &sessions, &inbound, &no_events).await;

        let greeting = start_chat(bot.as_ref(), &sessions, "cli:t4").await.unwrap();

        assert!(greeting.unwrap().contains("Support Agent"));
        assert!(sessions.get("cli:t4").await.unwrap().lock().await.is_empty());
    }

    #[test]
    fn test_registry() {
        let mut config = Config::default();
        assert!(ChannelRegistry::is_enabled("cli", &config));
        assert!(!ChannelRegistry::is_enabled("telegram", &config));

        config.telegram.enabled = true;
        config.telegram.token = "123:abc".to_string();
        assert!(ChannelRegistry::is_enabled("telegram", &config));
        assert_eq!(ChannelRegistry::description("slack"), "Unknown channel");
    }
}
