//! CLI adapter: interactive and single-message command line interface.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::agent::{InboundMessage, Response, StreamEvent};
use crate::bots::ChatBot;
use crate::session::SessionStore;
use crate::ui;
use crate::Result;
use super::{dispatch, start_chat, Channel};

/// CLI channel for terminal chat sessions.
pub struct CliChannel {
    bot: Arc<dyn ChatBot>,
    sessions: SessionStore,
    chat_id: String,
}

impl CliChannel {
    /// Create a new CLI channel for one chat.
    pub fn new(bot: Arc<dyn ChatBot>, chat_id: impl Into<String>) -> Self {
        Self {
            bot,
            sessions: SessionStore::new(),
            chat_id: chat_id.into(),
        }
    }

    fn session_key(&self) -> String {
        InboundMessage::new("cli", &self.chat_id, "").session_key()
    }

    /// Start the chat: fresh history, greeting and starters.
    pub async fn start_chat(&self) -> Result<()> {
        let greeting = start_chat(self.bot.as_ref(), &self.sessions, &self.session_key()).await?;

        if let Some(greeting) = greeting {
            println!("\n{}: {}", ui::bot_label(), greeting);
        }

        let starters = self.bot.starters();
        if !starters.is_empty() {
            println!();
            ui::print_step("Try a starter (type its label):");
            for starter in &starters {
                ui::print_starter(&starter.label, &starter.message);
            }
        }
        Ok(())
    }

    /// Run a single message and return the response, without printing.
    pub async fn run_once(&self, message: &str) -> Response {
        let inbound = InboundMessage::new("cli", &self.chat_id, message);
        dispatch(self.bot.as_ref(), &self.sessions, &inbound, &|_: StreamEvent| {}).await
    }

    /// Run a single message, printing streamed text and tool steps as they arrive.
    pub async fn run_printed(&self, message: &str) -> Result<Response> {
        let inbound = InboundMessage::new("cli", &self.chat_id, message);
        let printer = TerminalPrinter::new();

        let response = dispatch(
            self.bot.as_ref(),
            &self.sessions,
            &inbound,
            &|event: StreamEvent| printer.handle(event),
        )
        .await;

        printer.finish(&response)?;
        Ok(response)
    }

    /// Run interactive REPL loop.
    pub async fn run_interactive(&self) -> Result<()> {
        self.start_chat().await?;

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("\n{}: ", ui::user_label());
            stdout.flush()?;

            let mut line = String::new();
            let read = stdin.lock().read_line(&mut line)?;
            if read == 0 {
                // EOF
                break;
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q") {
                println!("Goodbye! 👋");
                break;
            }

            self.run_printed(input).await?;
        }

        Ok(())
    }

    /// Number of messages in this chat's history.
    pub async fn history_len(&self) -> usize {
        match self.sessions.get(&self.session_key()).await {
            Some(handle) => handle.lock().await.len(),
            None => 0,
        }
    }
}

impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn start(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        self.run_interactive()
    }

    fn stop(&self) -> impl std::future::Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}

/// Renders stream events to the terminal.
struct TerminalPrinter {
    spinner: ProgressBar,
    streamed: AtomicBool,
    line_open: AtomicBool,
}

impl TerminalPrinter {
    fn new() -> Self {
        Self {
            spinner: ui::spinner("Thinking"),
            streamed: AtomicBool::new(false),
            line_open: AtomicBool::new(false),
        }
    }

    fn handle(&self, event: StreamEvent) {
        self.spinner.finish_and_clear();
        match event {
            StreamEvent::TextDelta(text) => {
                if !self.line_open.swap(true, Ordering::SeqCst) {
                    print!("\n{}: ", ui::bot_label());
                }
                self.streamed.store(true, Ordering::SeqCst);
                print!("{}", text);
                let _ = io::stdout().flush();
            }
            StreamEvent::ToolStarted { label, .. } => {
                if self.line_open.swap(false, Ordering::SeqCst) {
                    println!();
                }
                ui::print_tool_step(&label, "running");
            }
            StreamEvent::ToolFinished { name, output } => {
                tracing::debug!("{} returned {} chars", name, output.len());
            }
        }
    }

    fn finish(&self, response: &Response) -> Result<()> {
        self.spinner.finish_and_clear();
        if self.line_open.load(Ordering::SeqCst) {
            println!();
        }

        if response.is_error {
            println!("\n{}: {}", ui::error_label(), response.content);
        } else if !self.streamed.load(Ordering::SeqCst) {
            println!("\n{}: {}", ui::bot_label(), response.content);
        }
        io::stdout().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::FakeLlmClient;
    use crate::bots::{self, BotKind};
    use crate::config::Config;

    fn channel(kind: BotKind, replies: Vec<&str>) -> CliChannel {
        let bot: Arc<dyn ChatBot> =
            Arc::from(bots::build(kind, FakeLlmClient::new(replies), &Config::default()));
        CliChannel::new(bot, "test")
    }

    #[tokio::test]
    async fn test_run_once_keeps_history() {
        let cli = channel(BotKind::Support, vec!["One", "Two"]);

        let first = cli.run_once("hi").await;
        let second = cli.run_once("again").await;

        assert_eq!(first.content, "SwiftSolvesStudios: One");
        assert_eq!(second.content, "SwiftSolvesStudios: Two");
        assert_eq!(cli.history_len().await, 4);
    }

    #[tokio::test]
    async fn test_start_chat_clears_history() {
        let cli = channel(BotKind::Support, vec!["One"]);
        cli.run_once("hi").await;

        cli.start_chat().await.unwrap();
        assert_eq!(cli.history_len().await, 0);
    }

    #[tokio::test]
    async fn test_echo_channel() {
        let cli = channel(BotKind::Echo, vec![]);
        let response = cli.run_once("ping").await;
        assert_eq!(response.content, "Echo: ping");
        assert_eq!(response.channel, "cli");
        assert_eq!(cli.history_len().await, 0);
    }
}
