use models::{CliApp, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod crawler;
mod error;
mod extractors;
mod models;
mod report;
mod search;

use config::{load_config, Config};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    let directive = format!("contact_harvester={}", config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&directive)),
        )
        .init();

    tokio::fs::create_dir_all(&config.output.directory).await?;

    let app = CliApp::new(config)?;

    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
