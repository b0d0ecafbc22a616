#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    AppMention,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::AppMention => "app_mention",
        }
    }
}

/// A chat message as seen by the processor, stripped of transport details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    pub channel_id: String,
    pub sender_is_bot: bool,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundReply {
    pub channel_id: String,
    pub text: String,
}

impl OutboundReply {
    /// Replies always land in the channel the triggering message came from.
    pub fn to_origin(message: &InboundMessage, text: impl Into<String>) -> Self {
        Self { channel_id: message.channel_id.clone(), text: text.into() }
    }
}
