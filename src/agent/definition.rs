//! Agent definition: a named set of instructions plus the tools it may call.

use crate::tools::ToolRunner;

use super::message::{Message, Role};

/// An agent the [`AgentLoop`](super::AgentLoop) can run.
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub tools: ToolRunner,
}

impl Agent {
    /// Create an agent without tools.
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: ToolRunner::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRunner) -> Self {
        self.tools = tools;
        self
    }

    /// Build the message list for one model call.
    ///
    /// `max_history` keeps only the most recent entries; `0` keeps all of them.
    /// A trimmed window never opens with an assistant turn.
    pub fn build_messages(&self, history: &[Message], max_history: usize) -> Vec<Message> {
        let windowed = if max_history > 0 && history.len() > max_history {
            let window = &history[history.len() - max_history..];
            let first_user = window
                .iter()
                .position(|m| m.role == Role::User)
                .unwrap_or(window.len());
            &window[first_user..]
        } else {
            history
        };

        let mut messages = Vec::with_capacity(windowed.len() + 1);
        messages.push(Message::system(self.instructions.as_str()));
        messages.extend(windowed.iter().cloned());
        messages
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("tools", &self.tools.tool_names())
            .finish()
    }
}
