use anyhow::Result;
use clap::Parser;
use termijob::core::{ConfigManager, FsOps};
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Record freelance job postings and organize them with a local LLM
#[derive(Parser)]
#[command(name = "termijob", version, about)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();

    let config = ConfigManager::load()?;
    config.ensure_directories().await?;

    // The TUI owns stdout, so logs go to a file that is cleared on startup
    let file = FsOps::create_log_file(&config.storage.log_path)?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termijob=info")))
        .init();

    info!("Starting termijob {}", env!("CARGO_PKG_VERSION"));
    info!("Data dir: {}", config.storage.data_dir.display());
    info!("Database: {}", config.storage.database_path.display());
    info!("Ollama: {} (model: {})", config.ollama.base_url, config.ollama.model);

    termijob::run(config).await
}
