use anyhow::Result;
use clap::Parser;
use gl_board_config::{AppConfig, UiState};

mod cli;
mod commands;
mod context;
mod host;
mod logger;

use cli::Cli;
use context::{AppContext, GITLAB_TOKEN_ENV};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = logger::init()?;
    log::info!("Starting gl-board, logging to {}", log_file.display());

    // Load .env file if the token is not already set
    if std::env::var(GITLAB_TOKEN_ENV).is_err() {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded .env file from: {:?}", path),
            Err(_) => log::debug!(".env file not found, relying on environment variables"),
        }
    }

    let config = AppConfig::load();
    let mut ctx = AppContext::open(config)?;
    let mut ui = UiState::load();

    let mode = cli.cache_mode();
    let saves_ui = cli.command.changes_ui_state();
    let result = commands::run(&mut ctx, &mut ui, cli.command, mode).await;

    // Cache and UI state are saved even when the command failed
    ctx.persist_cache();
    if saves_ui {
        if let Err(e) = ui.save() {
            log::warn!("Failed to save UI state: {:#}", e);
        }
    }

    match result {
        Ok(Some(value)) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            log::info!("Exiting gl-board");
            Ok(())
        }
        Ok(None) => {
            log::info!("Exiting gl-board");
            Ok(())
        }
        Err(e) => {
            log::error!("Command failed: {:#}", e);
            Err(e)
        }
    }
}
