use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocalis::integration::{AppConfig, Orchestrator};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vocalis=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vocalis voice assistant");

    let config = AppConfig::load();
    let state = Orchestrator::new(config)
        .start()
        .context("Failed to start Vocalis")?;

    vocalis::ui::run(state).map_err(|e| anyhow::anyhow!("GUI error: {}", e))?;

    Ok(())
}
