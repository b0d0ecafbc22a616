//! Message processing: decides whether an inbound message asks for a lookup
//! and pulls the pokedex number out of its text.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::domain::message::InboundMessage;
use crate::domain::pokemon::ExtractedQuery;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryOutcome {
    Query(ExtractedQuery),
    FromBot,
    NoDigits,
    Unparseable { digits: String, reason: String },
}

impl QueryOutcome {
    pub fn query(&self) -> Option<ExtractedQuery> {
        match self {
            Self::Query(query) => Some(*query),
            _ => None,
        }
    }
}

/// Classifies a message without side effects.
pub fn classify(message: &InboundMessage) -> QueryOutcome {
    if message.sender_is_bot {
        return QueryOutcome::FromBot;
    }

    let cleaned = strip_markup_tokens(&message.text);
    let Some(digits) = first_digit_run(&cleaned) else {
        return QueryOutcome::NoDigits;
    };

    match digits.parse::<u32>() {
        Ok(numeric_id) => QueryOutcome::Query(ExtractedQuery { numeric_id }),
        Err(error) => {
            QueryOutcome::Unparseable { digits: digits.to_owned(), reason: error.to_string() }
        }
    }
}

pub fn extract_query(message: &InboundMessage) -> Option<ExtractedQuery> {
    let outcome = classify(message);
    log_outcome(message, &outcome);
    outcome.query()
}

pub fn log_outcome(message: &InboundMessage, outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Query(query) => {
            debug!(
                event_name = "pipeline.query.extracted",
                channel_id = %message.channel_id,
                pokemon_id = query.numeric_id,
                "extracted pokedex number from message"
            );
        }
        QueryOutcome::Unparseable { digits, reason } => {
            warn!(
                event_name = "pipeline.query.unparseable",
                channel_id = %message.channel_id,
                digits = %digits,
                error = %reason,
                "digit run could not be parsed; ignoring message"
            );
        }
        QueryOutcome::FromBot | QueryOutcome::NoDigits => {}
    }
}

fn markup_token() -> &'static Regex {
    static MARKUP_TOKEN: OnceLock<Regex> = OnceLock::new();
    MARKUP_TOKEN.get_or_init(|| Regex::new(r"<.*?>").expect("valid regex"))
}

fn digit_run() -> &'static Regex {
    static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();
    DIGIT_RUN.get_or_init(|| Regex::new(r"[0-9]+").expect("valid regex"))
}

/// Removes `<...>` tokens (mentions, channel refs, links). A token never spans
/// a line break; an unmatched `<` is kept as-is.
pub fn strip_markup_tokens(text: &str) -> String {
    markup_token().replace_all(text, "").into_owned()
}

fn first_digit_run(text: &str) -> Option<&str> {
    digit_run().find(text).map(|found| found.as_str())
}
