//! Slack Web API calls used by Socket Mode startup and replies.

use std::time::Duration;

use async_trait::async_trait;
use pokedict_core::config::SlackConfig;
use pokedict_core::OutboundReply;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::handler::{ReplyError, Responder};

#[derive(Debug, Error)]
pub enum SlackApiError {
    #[error("could not build slack http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("slack {method} request failed: {reason}")]
    Http { method: &'static str, reason: String },
    #[error("slack {method} failed: {error}")]
    Api { method: &'static str, error: String },
    #[error("slack {method} did not return `{field}`")]
    MissingField { method: &'static str, field: &'static str },
}

#[derive(Debug, Deserialize)]
struct OpenConnectionResponse {
    ok: bool,
    url: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    app_token: SecretString,
    bot_token: SecretString,
}

impl SlackApiClient {
    pub fn new(
        api_base: &str,
        app_token: SecretString,
        bot_token: SecretString,
        request_timeout: Duration,
    ) -> Result<Self, SlackApiError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(SlackApiError::Build)?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            app_token,
            bot_token,
        })
    }

    pub fn from_config(config: &SlackConfig) -> Result<Self, SlackApiError> {
        Self::new(
            &config.api_base_url,
            config.app_token.clone(),
            config.bot_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Asks Slack for a fresh Socket Mode WebSocket URL (app-level token).
    pub async fn open_connection(&self) -> Result<String, SlackApiError> {
        const METHOD: &str = "apps.connections.open";

        let response = self
            .http
            .post(format!("{}/{METHOD}", self.api_base))
            .bearer_auth(self.app_token.expose_secret())
            .send()
            .await
            .map_err(|error| SlackApiError::Http { method: METHOD, reason: error.to_string() })?
            .json::<OpenConnectionResponse>()
            .await
            .map_err(|error| SlackApiError::Http { method: METHOD, reason: error.to_string() })?;

        if !response.ok {
            return Err(SlackApiError::Api {
                method: METHOD,
                error: response.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        response
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or(SlackApiError::MissingField { method: METHOD, field: "url" })
    }

    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackApiError> {
        const METHOD: &str = "chat.postMessage";

        let payload = json!({
            "channel": channel,
            "text": text,
            "mrkdwn": false,
        });

        let response = self
            .http
            .post(format!("{}/{METHOD}", self.api_base))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|error| SlackApiError::Http { method: METHOD, reason: error.to_string() })?
            .json::<PostMessageResponse>()
            .await
            .map_err(|error| SlackApiError::Http { method: METHOD, reason: error.to_string() })?;

        if !response.ok {
            return Err(SlackApiError::Api {
                method: METHOD,
                error: response.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Responder for SlackApiClient {
    async fn reply(&self, reply: &OutboundReply) -> Result<(), ReplyError> {
        self.post_message(&reply.channel_id, &reply.text).await.map_err(|error| match error {
            SlackApiError::Api { error, .. } => ReplyError::Rejected(error),
            other => ReplyError::Transport(other.to_string()),
        })
    }
}
