//! termijob: record freelance job postings, let a local LLM structure them,
//! keep them in SQLite and browse them from the terminal.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub mod core;
pub mod error;
pub mod intake;
pub mod parsing;
pub mod tui;
pub mod types;
pub mod utils;

use crate::core::{ConfigManager, Database, OllamaClient};
use crate::intake::JobIntake;

/// Open storage, build the extraction client and hand control to the TUI
pub async fn run(config: ConfigManager) -> Result<()> {
    let database = Database::new(&config.storage.database_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.storage.database_path.display()
            )
        })?;
    database.health_check().await?;

    let ollama = OllamaClient::new(&config.ollama)?;
    info!("Using model {} at {}", ollama.model(), ollama.base_url());

    let intake = JobIntake::new(Arc::new(ollama.clone()), database.jobs());
    let result = tui::run(database.jobs(), intake, ollama).await;

    database.pool().close().await;
    result
}
