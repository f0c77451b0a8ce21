//! Telegram adapter using teloxide

use std::sync::Arc;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, KeyboardButton, KeyboardMarkup, User};
use tracing::{debug, info};
use crate::Result;
use crate::agent::{InboundMessage, StreamEvent};
use crate::bots::ChatBot;
use crate::config::TelegramConfig;
use crate::session::SessionStore;
use super::{dispatch, start_chat, Channel};

const CHANNEL: &str = "telegram";

/// Telegram rejects longer message texts.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Sent instead of an empty reply, which Telegram rejects.
const EMPTY_REPLY: &str = "(no reply)";

/// Telegram channel adapter
#[derive(Clone)]
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    chatbot: Arc<dyn ChatBot>,
    sessions: SessionStore,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig, chatbot: Arc<dyn ChatBot>) -> Self {
        let bot = Bot::new(&config.token);
        Self {
            bot,
            config,
            chatbot,
            sessions: SessionStore::new(),
        }
    }

    async fn handle_message(&self, message: teloxide::types::Message) -> Result<()> {
        let chat_id = message.chat.id;

        if !self.is_allowed(message.from()) {
            debug!("Ignoring message from unauthorized user: {:?}", message.from());
            return Ok(());
        }

        // Ignore non-text messages
        let Some(text) = message.text() else {
            return Ok(());
        };

        let inbound = InboundMessage::new(CHANNEL, &chat_id.0.to_string(), text);
        info!("Received message from {}: {}", chat_id.0, text);

        if is_start_command(text) {
            return self.start_chat(chat_id, &inbound.session_key()).await;
        }

        let _ = self.bot.send_chat_action(chat_id, ChatAction::Typing).await;

        let on_event = |event: StreamEvent| {
            if let StreamEvent::ToolStarted { label, .. } = event {
                debug!("Chat {} running {}", chat_id.0, label);
            }
        };
        let response = dispatch(self.chatbot.as_ref(), &self.sessions, &inbound, &on_event).await;

        for chunk in reply_chunks(&response.content, MAX_MESSAGE_CHARS) {
            self.bot.send_message(chat_id, chunk).await?;
        }
        Ok(())
    }

    async fn start_chat(&self, chat_id: ChatId, session_key: &str) -> Result<()> {
        let greeting = start_chat(self.chatbot.as_ref(), &self.sessions, session_key)
            .await?
            .unwrap_or_else(|| format!("New chat with {} started.", self.chatbot.name()));

        let starters = self.chatbot.starters();
        if starters.is_empty() {
            self.bot.send_message(chat_id, greeting).await?;
        } else {
            let keyboard = KeyboardMarkup::new(
                starters
                    .iter()
                    .map(|s| vec![KeyboardButton::new(s.label.clone())]),
            );
            self.bot.send_message(chat_id, greeting).reply_markup(keyboard).await?;
        }
        Ok(())
    }

    fn is_allowed(&self, user: Option<&User>) -> bool {
        let Some(user) = user else {
            return self.config.allow_from.is_empty();
        };
        is_allowed(
            &self.config.allow_from,
            user.username.as_deref(),
            &user.id.0.to_string(),
        )
    }
}

/// An empty allow list admits everyone; otherwise the username or numeric id must be listed.
fn is_allowed(allow_from: &[String], username: Option<&str>, id: &str) -> bool {
    if allow_from.is_empty() {
        return true;
    }

    allow_from.iter().any(|allowed| {
        let allowed = allowed.trim_start_matches('@');
        allowed == id || username.is_some_and(|name| name == allowed)
    })
}

/// Split a reply into sendable messages of at most `max_chars` characters,
/// breaking at a newline when one is available.
fn reply_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![EMPTY_REPLY.to_string()];
    }

    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.chars().count() > max_chars {
        let limit = remaining
            .char_indices()
            .nth(max_chars)
            .map_or(remaining.len(), |(i, _)| i);
        let split_at = remaining[..limit]
            .rfind('\n')
            .filter(|&i| i > 0)
            .map_or(limit, |i| i + 1);

        let chunk = remaining[..split_at].trim_end();
        if !chunk.trim().is_empty() {
            chunks.push(chunk.to_string());
        }
        remaining = &remaining[split_at..];
    }

    if !remaining.trim().is_empty() {
        chunks.push(remaining.to_string());
    }
    chunks
}

fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or("");
    command == "/start" || command.starts_with("/start@")
}

// Helper to wrap the event loop
async fn run_telegram_loop(channel: Arc<TelegramChannel>) {
    let handler = Update::filter_message()
        .endpoint(|msg: teloxide::types::Message, channel: Arc<TelegramChannel>| async move {
            if let Err(e) = channel.handle_message(msg).await {
                tracing::error!("Error handling telegram message: {}", e);
            }
            respond(())
        });

    Dispatcher::builder(channel.bot.clone(), handler)
        .dependencies(dptree::deps![channel])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        CHANNEL
    }

    fn start(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        let this = Arc::new(self.clone());

        async move {
            info!("Starting Telegram bot for '{}'...", this.chatbot.name());
            run_telegram_loop(this).await;
            Ok(())
        }
    }

    fn stop(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        // The dispatcher stops itself on Ctrl+C
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_allow_list() {
        assert!(is_allowed(&[], Some("anyone"), "1"));
        assert!(is_allowed(&[], None, "1"));
    }

    #[test]
    fn test_allow_by_username_or_id() {
        let allow = vec!["@alice".to_string(), "42".to_string()];
        assert!(is_allowed(&allow, Some("alice"), "7"));
        assert!(is_allowed(&allow, None, "42"));
        assert!(!is_allowed(&allow, Some("bob"), "7"));
        assert!(!is_allowed(&allow, None, "7"));
    }

    #[test]
    fn test_empty_reply_gets_fallback() {
        assert_eq!(reply_chunks("", MAX_MESSAGE_CHARS), vec![EMPTY_REPLY]);
        assert_eq!(reply_chunks("  \n", MAX_MESSAGE_CHARS), vec![EMPTY_REPLY]);
        assert_eq!(reply_chunks("Hi", MAX_MESSAGE_CHARS), vec!["Hi"]);
    }

    #[test]
    fn test_long_reply_is_split() {
        let text = "é".repeat(MAX_MESSAGE_CHARS * 2 + 10);
        let chunks = reply_chunks(&text, MAX_MESSAGE_CHARS);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_CHARS));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_prefers_newlines() {
        let chunks = reply_chunks("first line\nsecond line", 15);
        assert_eq!(chunks, vec!["first line", "second line"]);
    }

    #[test]
    fn test_start_command() {
        assert!(is_start_command("/start"));
        assert!(is_start_command("/start@swift_bot"));
        assert!(is_start_command("/start payload"));
        assert!(!is_start_command("/started"));
        assert!(!is_start_command("start"));
    }
}
