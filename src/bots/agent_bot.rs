//! Bot that answers through an agent run over the session history

use async_trait::async_trait;
use tracing::{debug, info};

use crate::agent::{Agent, AgentLoop, LlmClient, Message, StreamEvent};
use crate::session::Session;
use crate::Result;
use super::{BotKind, ChatBot, Starter};

/// Event handlers backed by an [`Agent`].
///
/// Each message is appended to the session, the whole history goes to the
/// agent, and the final output is appended and returned. If the run fails the
/// user message stays in the history and nothing else is added.
pub struct AgentBot<C: LlmClient> {
    pub(super) kind: BotKind,
    pub(super) agent: Agent,
    pub(super) runner: AgentLoop<C>,
    pub(super) greeting: Option<String>,
    pub(super) reply_prefix: String,
    pub(super) streamed: bool,
    pub(super) starters: Vec<Starter>,
}

impl<C: LlmClient> AgentBot<C> {
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

#[async_trait]
impl<C: LlmClient + 'static> ChatBot for AgentBot<C> {
    fn kind(&self) -> BotKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.agent.name
    }

    fn model(&self) -> Option<&str> {
        Some(self.runner.model())
    }

    fn starters(&self) -> Vec<Starter> {
        self.starters.clone()
    }

    async fn on_chat_start(&self, session: &mut Session) -> Result<Option<String>> {
        debug!("Chat {} started with '{}'", session.id(), self.agent.name);
        Ok(self.greeting.clone())
    }

    async fn on_message(
        &self,
        session: &mut Session,
        content: &str,
        on_event: &(dyn Fn(StreamEvent) + Send + Sync),
    ) -> Result<String> {
        session.push(Message::user(content));
        debug!("Calling agent with {} history messages", session.len());

        let result = if self.streamed {
            self.runner.run_streamed(&self.agent, session.history(), on_event).await?
        } else {
            self.runner.run(&self.agent, session.history()).await?
        };

        session.push(Message::assistant(result.final_output.as_str()));
        info!("User: {}", content);
        info!("Assistant: {}", result.final_output);

        Ok(format!("{}{}", self.reply_prefix, result.final_output))
    }
}
