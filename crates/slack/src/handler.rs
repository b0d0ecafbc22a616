use async_trait::async_trait;
use pokedict_core::{
    classify, log_outcome, EventKind, InboundMessage, LookupError, OutboundReply, PokemonLookup,
    QueryOutcome,
};
use thiserror::Error;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    FromBot,
    NoQuery,
    NotAMessage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    Replied(OutboundReply),
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("reply transport failed: {0}")]
    Transport(String),
    #[error("slack rejected reply: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Posts a plain-text reply. One attempt; callers log failures.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, reply: &OutboundReply) -> Result<(), ReplyError>;
}

#[async_trait]
pub trait MessageService: Send + Sync {
    async fn handle_message(
        &self,
        message: &InboundMessage,
        ctx: &EventContext,
    ) -> Result<HandleOutcome, HandlerError>;
}

/// Message → pokedex number → image URL → reply in the same channel.
pub struct MessageHandler<L, R> {
    lookup: L,
    responder: R,
}

impl<L, R> MessageHandler<L, R>
where
    L: PokemonLookup,
    R: Responder,
{
    pub fn new(lookup: L, responder: R) -> Self {
        Self { lookup, responder }
    }
}

#[async_trait]
impl<L, R> MessageService for MessageHandler<L, R>
where
    L: PokemonLookup + 'static,
    R: Responder + 'static,
{
    async fn handle_message(
        &self,
        message: &InboundMessage,
        ctx: &EventContext,
    ) -> Result<HandleOutcome, HandlerError> {
        // Channel mentions also arrive as plain `message` events.
        if message.kind != EventKind::Message {
            return Ok(HandleOutcome::Ignored(IgnoreReason::NotAMessage));
        }

        let outcome = classify(message);
        log_outcome(message, &outcome);
        let query = match outcome {
            QueryOutcome::Query(query) => query,
            QueryOutcome::FromBot => return Ok(HandleOutcome::Ignored(IgnoreReason::FromBot)),
            QueryOutcome::NoDigits | QueryOutcome::Unparseable { .. } => {
                return Ok(HandleOutcome::Ignored(IgnoreReason::NoQuery))
            }
        };

        let result = self.lookup.lookup(query.numeric_id).await?;
        let reply = OutboundReply::to_origin(message, result.image_url);
        self.responder.reply(&reply).await?;

        info!(
            event_name = "pipeline.reply.sent",
            correlation_id = %ctx.correlation_id,
            channel_id = %reply.channel_id,
            pokemon_id = query.numeric_id,
            "posted pokedex image"
        );
        Ok(HandleOutcome::Replied(reply))
    }
}
