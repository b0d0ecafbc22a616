pub mod config;
pub mod domain;
pub mod lookup;
pub mod query;

pub use domain::message::{EventKind, InboundMessage, OutboundReply};
pub use domain::pokemon::{ExtractedQuery, LookupResult, PokemonDictData, PokemonImages};
pub use lookup::{LookupError, PokemonLookup};
pub use query::{classify, extract_query, log_outcome, QueryOutcome};
