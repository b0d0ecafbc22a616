use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExtractedQuery {
    pub numeric_id: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupResult {
    pub image_url: String,
}

/// Blob embedded in the `json-data` element of a pokedex detail page.
///
/// Only the small image is surfaced today, but all three sizes are decoded so
/// the shape stays stable if larger variants are ever needed. The larger ones
/// default to empty when a page omits them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PokemonDictData {
    pub pokemon: PokemonImages,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PokemonImages {
    #[serde(rename = "image_l", default)]
    pub image_large: String,
    #[serde(rename = "image_m", default)]
    pub image_medium: String,
    #[serde(rename = "image_s")]
    pub image_small: String,
}

impl From<PokemonDictData> for LookupResult {
    fn from(data: PokemonDictData) -> Self {
        Self { image_url: data.pokemon.image_small }
    }
}
