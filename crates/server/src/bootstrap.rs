use std::sync::Arc;

use pokedict_core::config::AppConfig;
use pokedict_lookup::{HttpPokemonLookup, LookupClientError};
use pokedict_slack::{
    api::{SlackApiClient, SlackApiError},
    handler::MessageHandler,
    socket::{ReconnectPolicy, SocketModeRunner},
    transport::SlackSocketTransport,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runner: SocketModeRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    LookupClient(#[from] LookupClientError),
    #[error(transparent)]
    SlackApi(#[from] SlackApiError),
}

/// Wires lookup, Slack Web API, transport and handler into a runner. No
/// network traffic happens until the runner is started.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let lookup = HttpPokemonLookup::from_config(&config.lookup)?;
    let api = SlackApiClient::from_config(&config.slack)?;
    let transport = SlackSocketTransport::new(api.clone());
    let handler = MessageHandler::new(lookup, api);

    let runner = SocketModeRunner::new(
        Arc::new(transport),
        Arc::new(handler),
        ReconnectPolicy::from(&config.socket),
    );

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        max_retries = config.socket.max_retries,
        "socket mode runner assembled"
    );

    Ok(Application { config, runner })
}

#[cfg(test)]
mod tests {
    use pokedict_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::bootstrap_with_config;

    fn load(overrides: ConfigOverrides) -> AppConfig {
        AppConfig::load(LoadOptions {
            skip_env: true,
            overrides: ConfigOverrides {
                slack_app_token: Some("xapp-test".to_string()),
                slack_bot_token: Some("xoxb-test".to_string()),
                ..overrides
            },
        })
        .expect("valid config")
    }

    #[test]
    fn bootstrap_assembles_runner_from_loaded_config() {
        let app = bootstrap_with_config(load(ConfigOverrides {
            socket_max_retries: Some(3),
            ..ConfigOverrides::default()
        }))
        .expect("bootstrap should succeed with valid config");

        assert_eq!(app.config.socket.max_retries, 3);
        assert_eq!(app.config.lookup.base_url, "https://zukan.pokemon.co.jp");
    }

    #[test]
    fn bootstrap_keeps_overridden_endpoints() {
        let app = bootstrap_with_config(load(ConfigOverrides {
            slack_api_base_url: Some("http://127.0.0.1:9/api".to_string()),
            lookup_base_url: Some("http://127.0.0.1:9".to_string()),
            ..ConfigOverrides::default()
        }))
        .expect("bootstrap");

        assert_eq!(app.config.slack.api_base_url, "http://127.0.0.1:9/api");
        assert_eq!(app.config.lookup.base_url, "http://127.0.0.1:9");
    }
}
