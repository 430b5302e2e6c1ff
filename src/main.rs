//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `chat_file_grabber` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process;

use chat_file_grabber::initialization::init_logger_with;
use chat_file_grabber::{run_bot, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory.
    // Problems are reported once the logger is up.
    let env_warning = load_env_file();

    let opt = Opt::parse();
    let config = match Config::from_opt(opt) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("chat-file-grabber: invalid configuration: {e}");
            process::exit(2);
        }
    };

    init_logger_with(config.debug.into(), config.log_format)
        .context("Failed to initialize logger")?;
    if let Some(warning) = env_warning {
        log::warn!("{warning}");
    }

    log::info!(
        "chat-file-grabber {} joining {} as {}",
        env!("CARGO_PKG_VERSION"),
        config.chat.channels.join(", "),
        config.chat.nick
    );

    match run_bot(config).await {
        Ok(report) => {
            println!(
                "Processed {} message{} ({} with file links), {} download{} completed, {} failed",
                report.messages,
                if report.messages == 1 { "" } else { "s" },
                report.matches,
                report.downloads_completed,
                if report.downloads_completed == 1 { "" } else { "s" },
                report.failures
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("chat-file-grabber error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Loads `.env` from the working directory or, failing that, next to the
/// executable. Returns a message when a file exists but could not be read.
fn load_env_file() -> Option<String> {
    match dotenvy::dotenv() {
        Ok(_) => return None,
        Err(e) if !e.not_found() => return Some(format!("Ignoring .env file: {e}")),
        Err(_) => {}
    }

    let exe_path = std::env::current_exe().ok()?;
    load_env_from(&exe_path.parent()?.join(".env"))
}

fn load_env_from(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    dotenvy::from_path(path)
        .err()
        .map(|e| format!("Ignoring {}: {e}", path.display()))
}
