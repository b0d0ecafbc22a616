mod bootstrap;

use anyhow::Result;
use pokedict_core::config::{AppConfig, LoadOptions, LoggingConfig};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) {
    use pokedict_core::config::LogFormat::*;

    // RUST_LOG, when set, takes precedence over POKEDICT_LOG_LEVEL.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            init_logging(&LoggingConfig::default());
            tracing::error!(
                event_name = "system.config.invalid",
                error = %error,
                "refusing to start with invalid configuration"
            );
            return Err(error.into());
        }
    };
    init_logging(&config.logging);

    let app = bootstrap::bootstrap_with_config(config)?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        lookup_base_url = %app.config.lookup.base_url,
        "pokedict started"
    );

    tokio::select! {
        result = app.runner.start() => {
            result?;
            tracing::warn!(
                event_name = "system.server.runner_stopped",
                correlation_id = "shutdown",
                "socket mode runner stopped; exiting"
            );
        }
        signal = wait_for_shutdown() => {
            signal?;
            tracing::info!(
                event_name = "system.server.stopping",
                correlation_id = "shutdown",
                "pokedict stopping"
            );
        }
    }

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
