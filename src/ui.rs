use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use terminal_size::{Width, Height, terminal_size};

pub fn print_header(bot: &str, model: &str) {
    let (width, _) = terminal_size().unwrap_or((Width(80), Height(24)));
    let width = width.0 as usize;

    let line = "─".repeat(width);
    println!("{}", line.black().bold());

    let name = "Swift Solves Studios".yellow().bold();
    let version = format!("v{}", env!("CARGO_PKG_VERSION")).black().bold();
    println!("  {} {}", name, version);

    let info = format!("  {}  •  {}", bot, model).cyan();
    println!("{}", info);

    println!("{}", line.black().bold());
}

pub fn print_step(msg: &str) {
    println!("  {} {}", "•".green(), msg);
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠️ ".yellow().bold(), msg.yellow());
}

pub fn print_thinking(msg: &str) {
    println!("  {} {}...", "∴".magenta(), msg);
}

/// Tool step line, shown while the agent calls a tool.
pub fn print_tool_step(label: &str, detail: &str) {
    println!("  {} {} {}", "⚙".magenta(), label.magenta().bold(), detail.black().bold());
}

pub fn print_starter(label: &str, message: &str) {
    println!("  {} {} {}", "›".cyan(), label.cyan().bold(), format!("({})", message).black().bold());
}

pub fn bot_label() -> ColoredString {
    "Bot".green().bold()
}

pub fn user_label() -> ColoredString {
    "You".blue().bold()
}

pub fn error_label() -> ColoredString {
    "Error".red().bold()
}

/// Spinner shown until the first reply event arrives.
pub fn spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.magenta} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
