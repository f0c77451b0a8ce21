//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::Result;
use crate::bots::BotKind;
use crate::error::Error;

/// Environment variable that overrides the configured Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider to use
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Gemini API key
    #[serde(default)]
    pub gemini_api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Gemini models endpoint
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Maximum model calls per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// History entries sent per turn (0 sends the whole session)
    #[serde(default)]
    pub max_history_messages: usize,

    /// Bot served by `chat` and `gateway` when none is given
    #[serde(default)]
    pub bot: BotKind,

    /// Telegram configuration
    #[serde(default)]
    pub telegram: TelegramConfig,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_max_iterations() -> usize {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub allow_from: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            gemini_api_key: String::new(),
            model: default_model(),
            api_base: default_api_base(),
            max_iterations: default_max_iterations(),
            max_history_messages: 0,
            bot: BotKind::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Config {
    /// Replace the API key with `value` when it is non-empty.
    pub fn apply_api_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.gemini_api_key = key;
        }
    }

    /// Check that the given bot can run with this configuration.
    pub fn validate_for(&self, kind: BotKind) -> Result<()> {
        if kind.needs_llm() && self.gemini_api_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "{} is not set. Export it or run 'swiftsolves onboard'.",
                API_KEY_ENV
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::Config("max_iterations must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".swiftsolves")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load configuration from the default location, applying the env override
pub fn load() -> Result<Config> {
    let mut config = load_from(&config_path())?;
    config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
    Ok(config)
}

/// Load configuration from a file; a missing file yields defaults
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<()> {
    save_to(config, &config_path())
}

/// Save configuration to a file
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Interactive setup wizard
pub fn onboard() -> Result<()> {
    use crate::ui;
    use inquire::{Select, Text};

    ui::print_header("Setup Wizard", "local");
    println!("  Welcome! Let's get the Swift Solves Studios bot configured.\n");

    let mut config = load_from(&config_path())?;

    // 1. API key
    let key = Text::new("Enter your Gemini API Key (leave empty to use $GEMINI_API_KEY):")
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;
    if !key.trim().is_empty() {
        config.gemini_api_key = key.trim().to_string();
    }

    // 2. Default bot
    let kinds = BotKind::all().to_vec();
    config.bot = Select::new("Which bot should run by default?", kinds)
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;

    // 3. Gateway (optional)
    let gateways = vec!["None (Skip for now)", "Telegram Bot"];
    let gateway_choice = Select::new("Would you like to setup a Telegram gateway?", gateways)
        .prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;

    if gateway_choice.contains("Telegram") {
        setup_telegram_gateway(&mut config)?;
    }

    ui::print_thinking("Saving configuration");
    save(&config)?;

    println!();
    ui::print_success("Setup complete!");
    ui::print_step("Run 'swiftsolves chat' to start chatting.");

    Ok(())
}

/// Helper to setup Telegram gateway interactively
pub fn setup_telegram_gateway(config: &mut Config) -> Result<()> {
    use inquire::Text;
    use crate::ui;
    use colored::Colorize;

    println!();
    ui::print_step("To setup a Telegram bot:");
    println!("    1. Message {} on Telegram", "@BotFather".cyan().bold());
    println!("    2. Send {} and choose a name", "/newbot".cyan());
    println!("    3. Copy the {} provided", "API Token".cyan());
    println!();

    let token = Text::new("Enter your Telegram Bot Token:").prompt()
        .map_err(|e| Error::Config(format!("Prompt failed: {}", e)))?;

    if token.is_empty() {
        return Err(Error::Config("Token cannot be empty".to_string()));
    }

    config.telegram.enabled = true;
    config.telegram.token = token;

    let user = whoami::username();
    config.telegram.allow_from = vec![user.clone()];

    ui::print_step(&format!("Auto-whitelisted local user: {}", user.cyan()));

    Ok(())
}
