use std::time::Duration;

use async_trait::async_trait;
use pokedict_core::config::LookupConfig;
use pokedict_core::{LookupError, LookupResult, PokemonLookup};
use thiserror::Error;
use tracing::{debug, warn};

use crate::html::{decode_dict_data, extract_json_data};

#[derive(Debug, Error)]
pub enum LookupClientError {
    #[error("could not build pokedex http client: {0}")]
    Build(#[source] reqwest::Error),
}

/// `{base}/detail/{id}` with the id zero-padded to at least three digits.
pub fn detail_url(base_url: &str, id: u32) -> String {
    format!("{}/detail/{id:03}", base_url.trim_end_matches('/'))
}

#[derive(Clone)]
pub struct HttpPokemonLookup {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPokemonLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LookupClientError::Build)?;
        Ok(Self { http, base_url: base_url.into() })
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupClientError> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    async fn fetch_page(&self, url: &str) -> Result<String, LookupError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| LookupError::Network(error.to_string()))?;

        // The page is parsed whatever the status; an error page simply lacks the blob.
        let status = response.status();
        if !status.is_success() {
            debug!(
                event_name = "lookup.http.non_success_status",
                url = %url,
                status = status.as_u16(),
                "pokedex responded with non-success status"
            );
        }

        let body =
            response.bytes().await.map_err(|error| LookupError::Network(error.to_string()))?;
        // Stray invalid bytes become U+FFFD, as an HTML parser would treat them.
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl PokemonLookup for HttpPokemonLookup {
    async fn lookup(&self, id: u32) -> Result<LookupResult, LookupError> {
        let url = detail_url(&self.base_url, id);
        debug!(
            event_name = "lookup.http.request",
            pokemon_id = id,
            url = %url,
            "fetching pokedex page"
        );

        let result = match self.fetch_page(&url).await {
            Ok(body) => extract_json_data(&body).and_then(|raw| decode_dict_data(&raw)),
            Err(error) => Err(error),
        };

        match result {
            Ok(data) => Ok(LookupResult::from(data)),
            Err(error) => {
                warn!(
                    event_name = "lookup.http.failed",
                    pokemon_id = id,
                    url = %url,
                    error_kind = error.kind(),
                    error = %error,
                    "pokedex lookup failed"
                );
                Err(error)
            }
        }
    }
}
