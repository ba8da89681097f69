// Rust Countdown Application
// Main entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rust_countdown::models::settings::StorageBackend;
use rust_countdown::services::settings::SettingsService;
use rust_countdown::ui_terminal::{self, RunOptions};

#[derive(Parser)]
#[command(name = "rust-countdown")]
#[command(about = "Counts down to a date and time, remembering it across restarts")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Storage backend: json, sqlite or memory (overrides the config file)
    #[arg(long, value_parser = parse_storage)]
    storage: Option<StorageBackend>,

    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Start counting down to this date and time, e.g. 2030-01-01T00:00
    #[arg(long)]
    target: Option<String>,

    /// Forget the saved countdown and exit
    #[arg(long, conflicts_with = "target")]
    reset: bool,

    /// Exit as soon as the countdown finishes
    #[arg(long)]
    exit_on_finish: bool,
}

fn parse_storage(value: &str) -> std::result::Result<StorageBackend, String> {
    match value.to_ascii_lowercase().as_str() {
        "json" => Ok(StorageBackend::Json),
        "sqlite" => Ok(StorageBackend::Sqlite),
        "memory" => Ok(StorageBackend::Memory),
        other => Err(format!("unknown storage backend `{}`", other)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    log::info!("Starting Rust Countdown");

    let settings_service = SettingsService::new(cli.config.clone());
    let mut settings = settings_service
        .load()
        .context("Failed to load settings")?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = Some(data_dir);
    }
    if let Some(storage) = cli.storage {
        settings.storage = storage;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(ui_terminal::run(
        settings,
        RunOptions {
            initial_target: cli.target,
            reset_only: cli.reset,
            exit_on_finish: cli.exit_on_finish,
        },
    ))
}
