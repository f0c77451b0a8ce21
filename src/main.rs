//! SwiftSolves CLI entry point

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use swiftsolves::adapters::{cli::CliChannel, telegram::TelegramChannel, Channel, ChannelRegistry};
use swiftsolves::agent::ProviderRegistry;
use swiftsolves::bots::{self, BotKind, ChatBot};
use swiftsolves::config::{self, Config};
use swiftsolves::tools::ToolRunner;
use swiftsolves::ui;

#[derive(Parser)]
#[command(name = "swiftsolves")]
#[command(about = "Swift Solves Studios demo chatbot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the configuration
    Onboard,

    /// Chat with a bot in the terminal
    Chat {
        /// Bot to talk to (defaults to the configured bot)
        #[arg(short, long, value_enum)]
        bot: Option<BotKind>,

        /// Send one message and exit
        #[arg(short, long)]
        message: Option<String>,

        /// Chat id (defaults to a new random id)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Serve a bot over Telegram
    Gateway {
        /// Bot to serve (defaults to the configured bot)
        #[arg(short, long, value_enum)]
        bot: Option<BotKind>,
    },

    /// Show configuration status
    Status,

    /// List the tools available to the assistant
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Setup Global Ctrl+C handler
    let exit_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let r = exit_flag.clone();

    ctrlc::set_handler(move || {
        if r.load(std::sync::atomic::Ordering::SeqCst) {
            println!("\n👋 Bye!");
            std::process::exit(0);
        } else {
            println!("\n⚠️  Press Ctrl+C again to exit");
            r.store(true, std::sync::atomic::Ordering::SeqCst);

            // Reset flag after 3 seconds
            let r2 = r.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_secs(3));
                r2.store(false, std::sync::atomic::Ordering::SeqCst);
            });
        }
    }).ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Onboard => {
            config::onboard()?;
        }

        Commands::Chat { bot, message, session } => {
            let config = config::load()?;
            let bot = build_bot(&config, bot.unwrap_or(config.bot))?;
            let chat_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let channel = CliChannel::new(bot.clone(), chat_id);

            if let Some(msg) = message {
                // Single message mode
                let response = channel.run_once(&msg).await;
                if response.is_error {
                    anyhow::bail!(response.content);
                }
                println!("{}", response.content);
            } else {
                ui::print_header(bot.name(), bot.model().unwrap_or("no model"));
                println!("  Interactive mode (type 'exit' or Ctrl+C to quit)");
                channel.start().await?;
            }
        }

        Commands::Gateway { bot } => {
            let config = config::load()?;

            if !ChannelRegistry::is_enabled("telegram", &config) {
                ui::print_warning("Telegram is disabled in config. Enable it and set 'token' to run the gateway.");
                return Ok(());
            }

            let kind = bot.unwrap_or(config.bot);
            let chatbot = build_bot(&config, kind)?;
            ui::print_step(&format!("Serving the {} bot", kind));

            let channel = TelegramChannel::new(config.telegram.clone(), chatbot);
            ui::print_success("Gateway started. Listening for Telegram messages...");
            channel.start().await?;
        }

        Commands::Status => {
            let config = config::load()?;
            println!("Swift Solves Studios status\n");
            println!("Config: {:?}", config::config_path());
            println!(
                "Provider: {} (available: {})",
                config.provider,
                ProviderRegistry::available().join(", ")
            );
            println!("Model: {}", config.model);
            println!("Default bot: {}", config.bot);
            println!(
                "Gemini API key: {}",
                if config.gemini_api_key.is_empty() { "not set" } else { "✓" }
            );
            for name in ChannelRegistry::available() {
                println!(
                    "Channel {}: {} ({})",
                    name,
                    if ChannelRegistry::is_enabled(name, &config) { "enabled" } else { "disabled" },
                    ChannelRegistry::description(name)
                );
            }
        }

        Commands::Tools => {
            let runner = ToolRunner::new_with_defaults();
            for def in runner.definitions() {
                println!("{:<24} {}", def.name, def.description);
            }
        }
    }

    Ok(())
}

fn build_bot(config: &Config, kind: BotKind) -> Result<Arc<dyn ChatBot>> {
    config.validate_for(kind)?;
    let client = ProviderRegistry::create(config)?;
    Ok(Arc::from(bots::build(kind, client, config)))
}
