use pokedict_core::{LookupError, PokemonDictData};
use scraper::{Html, Selector};

pub const JSON_DATA_ELEMENT_ID: &str = "json-data";

/// Returns the text content of the first `#json-data` element.
///
/// Parsing is lenient the way browsers are: malformed markup still yields a
/// tree, so a page without the element surfaces as `NotFound` rather than a
/// parse failure.
pub fn extract_json_data(body: &str) -> Result<String, LookupError> {
    let selector = Selector::parse(&format!("#{JSON_DATA_ELEMENT_ID}"))
        .map_err(|error| LookupError::Parse(error.to_string()))?;
    let document = Html::parse_document(body);

    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| LookupError::NotFound(JSON_DATA_ELEMENT_ID.to_owned()))?;

    Ok(element.text().collect())
}

pub fn decode_dict_data(raw: &str) -> Result<PokemonDictData, LookupError> {
    serde_json::from_str::<PokemonDictData>(raw.trim())
        .map_err(|error| LookupError::Decode(error.to_string()))
}
