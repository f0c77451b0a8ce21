//! Echo bot - repeats each message back

use async_trait::async_trait;

use crate::agent::StreamEvent;
use crate::session::Session;
use crate::Result;
use super::{BotKind, ChatBot};

const ECHO_PREFIX: &str = "Echo: ";

/// Replies with the user's own message; keeps no history.
pub struct EchoBot;

#[async_trait]
impl ChatBot for EchoBot {
    fn kind(&self) -> BotKind {
        BotKind::Echo
    }

    fn name(&self) -> &str {
        "Echo"
    }

    async fn on_chat_start(&self, _session: &mut Session) -> Result<Option<String>> {
        Ok(None)
    }

    async fn on_message(
        &self,
        _session: &mut Session,
        content: &str,
        _on_event: &(dyn Fn(StreamEvent) + Send + Sync),
    ) -> Result<String> {
        Ok(format!("{}{}", ECHO_PREFIX, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo() {
        let mut session = Session::new("cli:echo");
        assert_eq!(EchoBot.on_chat_start(&mut session).await.unwrap(), None);

        let reply = EchoBot
            .on_message(&mut session, "hello there", &|_: StreamEvent| {})
            .await
            .unwrap();

        assert_eq!(reply, "Echo: hello there");
        assert!(session.is_empty());
    }
}
