//! Pokedex lookup over the public zukan site.
//!
//! The detail page for each pokemon hydrates itself from a JSON blob embedded
//! in an element with id `json-data`; this crate fetches that page, pulls the
//! blob out of the document tree, and hands back the small image URL.

pub mod html;
pub mod http;

pub use html::{decode_dict_data, extract_json_data, JSON_DATA_ELEMENT_ID};
pub use http::{detail_url, HttpPokemonLookup, LookupClientError};
