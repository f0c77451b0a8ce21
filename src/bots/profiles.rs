//! The Swift Solves Studios support agent and the tool-using assistant

use crate::agent::{Agent, AgentLoop, LlmClient};
use crate::tools::ToolRunner;
use super::{AgentBot, BotKind, Starter};

const SUPPORT_AGENT_NAME: &str = "SwiftSolvesStudios Agent";
const SUPPORT_INSTRUCTIONS: &str = "You are helpful assistant that can answer questions and support";
const SUPPORT_PREFIX: &str = "SwiftSolvesStudios: ";
const SUPPORT_GREETING: &str =
    "SwiftSolvesStudios: Hello, I am a SwiftSolvesStudios Support Agent. How can I help you?";

const ASSISTANT_AGENT_NAME: &str = "Assistant";
const ASSISTANT_INSTRUCTIONS: &str = "You are a helpful assistant";
const ASSISTANT_GREETING: &str = "Welcome to the Swift Solves Studios, how may i help you today?";

/// Support agent: no tools, plain replies prefixed with the studio name.
pub fn support<C: LlmClient>(runner: AgentLoop<C>) -> AgentBot<C> {
    AgentBot {
        kind: BotKind::Support,
        agent: Agent::new(SUPPORT_AGENT_NAME, SUPPORT_INSTRUCTIONS),
        runner,
        greeting: Some(SUPPORT_GREETING.to_string()),
        reply_prefix: SUPPORT_PREFIX.to_string(),
        streamed: false,
        starters: Vec::new(),
    }
}

/// Assistant: school lookup and weather tools, streamed replies.
pub fn assistant<C: LlmClient>(runner: AgentLoop<C>) -> AgentBot<C> {
    AgentBot {
        kind: BotKind::Assistant,
        agent: Agent::new(ASSISTANT_AGENT_NAME, ASSISTANT_INSTRUCTIONS)
            .with_tools(ToolRunner::new_with_defaults()),
        runner,
        greeting: Some(ASSISTANT_GREETING.to_string()),
        reply_prefix: String::new(),
        streamed: true,
        starters: vec![Starter::new("Greetings", "Hello! What can you help me with today?")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::{FakeLlmClient, LlmResponse};
    use crate::agent::{Role, StreamEvent};
    use crate::bots::ChatBot;
    use crate::session::Session;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn no_events(_: StreamEvent) {}

    #[tokio::test]
    async fn test_support_greeting_and_prefix() {
        let bot = support(AgentLoop::new(FakeLlmClient::new(vec!["Sure, happy to help."]), 5));
        let mut session = Session::new("cli:support");

        let greeting = bot.on_chat_start(&mut session).await.unwrap();
        assert_eq!(greeting.as_deref(), Some(SUPPORT_GREETING));
        assert!(bot.starters().is_empty());
        assert!(bot.agent().tools.is_empty());

        let reply = bot.on_message(&mut session, "Can you help?", &no_events).await.unwrap();
        assert_eq!(reply, "SwiftSolvesStudios: Sure, happy to help.");

        // History keeps the bare output, not the prefixed reply
        assert_eq!(session.len(), 2);
        assert_eq!(session.history()[0].role, Role::User);
        assert_eq!(session.history()[1].content, "Sure, happy to help.");
    }

    #[tokio::test]
    async fn test_support_forwards_growing_history() {
        let client = Arc::new(FakeLlmClient::new(vec!["First", "Second"]));
        let bot = support(AgentLoop::new(client.clone(), 5));
        let mut session = Session::new("cli:support");

        bot.on_message(&mut session, "one", &no_events).await.unwrap();
        bot.on_message(&mut session, "two", &no_events).await.unwrap();

        let seen = client.seen();
        let contents: Vec<&str> = seen[1].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec![SUPPORT_INSTRUCTIONS, "one", "First", "two"]);
        assert_eq!(session.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_run_keeps_user_message_only() {
        let bot = support(AgentLoop::new(FakeLlmClient::failing("boom"), 5));
        let mut session = Session::new("cli:support");

        let err = bot.on_message(&mut session, "hello", &no_events).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(session.len(), 1);
        assert_eq!(session.history()[0].content, "hello");
    }

    #[tokio::test]
    async fn test_assistant_looks_up_student_and_streams() {
        let client = Arc::new(FakeLlmClient::scripted(vec![
            FakeLlmClient::tool_call_response("get_student_data", json!({"student_id": "101"})),
            LlmResponse::text("Student 101 is Alice Johnson in class 5A."),
        ]));
        let bot = assistant(AgentLoop::new(client.clone(), 5));
        let mut session = Session::new("cli:assistant");
        let events = Mutex::new(Vec::new());
        let on_event = |e: StreamEvent| events.lock().unwrap().push(e);

        let greeting = bot.on_chat_start(&mut session).await.unwrap();
        assert_eq!(greeting.as_deref(), Some(ASSISTANT_GREETING));
        assert_eq!(bot.starters()[0].label, "Greetings");

        let reply = bot.on_message(&mut session, "Who is student 101?", &on_event).await.unwrap();
        assert_eq!(reply, "Student 101 is Alice Johnson in class 5A.");

        let events = events.lock().unwrap();
        assert_eq!(
            events[0],
            StreamEvent::ToolStarted {
                name: "get_student_data".to_string(),
                label: "student data tool".to_string(),
            }
        );
        match &events[1] {
            StreamEvent::ToolFinished { output, .. } => assert!(output.contains("Alice Johnson")),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(
            events[2],
            StreamEvent::TextDelta("Student 101 is Alice Johnson in class 5A.".to_string())
        );

        // Tool traffic stays inside the run; the session sees one exchange
        assert_eq!(session.len(), 2);
        assert_eq!(session.history()[1].content, "Student 101 is Alice Johnson in class 5A.");
        assert_eq!(client.seen()[0].len(), 2);
    }

    #[test]
    fn test_assistant_has_all_tools() {
        let bot = assistant(AgentLoop::new(FakeLlmClient::new(vec![]), 5));
        assert_eq!(bot.agent().tools.len(), 5);
        assert_eq!(bot.name(), "Assistant");
        assert_eq!(bot.model(), Some("fake-model"));
    }
}
