use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pokemon::LookupResult;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("pokedex request failed: {0}")]
    Network(String),
    #[error("pokedex page could not be parsed: {0}")]
    Parse(String),
    #[error("pokedex page has no `#{0}` element")]
    NotFound(String),
    #[error("pokedex data blob could not be decoded: {0}")]
    Decode(String),
}

impl LookupError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::NotFound(_) => "not_found",
            Self::Decode(_) => "decode",
        }
    }
}

/// Resolves a pokedex number to the image URL shown on its detail page.
#[async_trait]
pub trait PokemonLookup: Send + Sync {
    async fn lookup(&self, id: u32) -> Result<LookupResult, LookupError>;
}
