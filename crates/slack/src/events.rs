use pokedict_core::{EventKind, InboundMessage};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Everything the runner can observe on a Socket Mode connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketEvent {
    Connecting,
    Connected,
    ConnectionError(String),
    Disconnected { reason: String },
    EventsApi(SlackEnvelope),
    Unrecognized { kind: String },
}

impl SocketEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::ConnectionError(_) => "connection_error",
            Self::Disconnected { .. } => "disconnect",
            Self::EventsApi(_) => "events_api",
            Self::Unrecognized { kind } => kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub payload: Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    Message(MessageEvent),
    Unsupported { event_type: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub kind: EventKind,
    pub channel_id: String,
    pub user_id: Option<String>,
    pub bot_id: Option<String>,
    pub subtype: Option<String>,
    pub text: String,
}

impl MessageEvent {
    pub fn sender_is_bot(&self) -> bool {
        let has_bot_id = self.bot_id.as_deref().is_some_and(|id| !id.trim().is_empty());
        has_bot_id || self.subtype.as_deref() == Some("bot_message")
    }

    pub fn to_inbound(&self) -> InboundMessage {
        InboundMessage {
            text: self.text.clone(),
            channel_id: self.channel_id.clone(),
            sender_is_bot: self.sender_is_bot(),
            kind: self.kind,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EventDecodeError {
    #[error("socket frame is not valid json: {0}")]
    Frame(String),
    #[error("`{frame_type}` frame has no envelope_id")]
    MissingEnvelopeId { frame_type: String },
    #[error("events api payload has unexpected shape: {0}")]
    Payload(String),
    #[error("`{event_type}` event is missing `{field}`")]
    MissingField { event_type: String, field: &'static str },
}

#[derive(Debug, Deserialize)]
struct SocketFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    envelope_id: Option<String>,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    reason: Option<String>,
}

/// Decodes one text frame received over the Socket Mode WebSocket.
pub fn parse_socket_frame(raw: &str) -> Result<SocketEvent, EventDecodeError> {
    let frame = serde_json::from_str::<SocketFrame>(raw)
        .map_err(|error| EventDecodeError::Frame(error.to_string()))?;

    let frame_type = frame.frame_type.clone();
    match frame_type.as_str() {
        "hello" => Ok(SocketEvent::Connected),
        "disconnect" => Ok(SocketEvent::Disconnected {
            reason: frame.reason.unwrap_or_else(|| "unspecified".to_owned()),
        }),
        "events_api" => {
            let envelope_id = frame
                .envelope_id
                .filter(|id| !id.trim().is_empty())
                .ok_or(EventDecodeError::MissingEnvelopeId { frame_type: frame.frame_type })?;
            Ok(SocketEvent::EventsApi(SlackEnvelope { envelope_id, payload: frame.payload }))
        }
        _ => Ok(SocketEvent::Unrecognized { kind: frame.frame_type }),
    }
}

#[derive(Debug, Deserialize)]
struct EventCallback {
    #[serde(rename = "type")]
    callback_type: String,
    #[serde(default)]
    event: Option<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    channel: Option<String>,
}

impl SlackEnvelope {
    pub fn decode_event(&self) -> Result<SlackEvent, EventDecodeError> {
        let callback = serde_json::from_value::<EventCallback>(self.payload.clone())
            .map_err(|error| EventDecodeError::Payload(error.to_string()))?;
        if callback.callback_type != "event_callback" {
            return Ok(SlackEvent::Unsupported { event_type: callback.callback_type });
        }

        let event = callback.event.ok_or_else(|| EventDecodeError::MissingField {
            event_type: callback.callback_type.clone(),
            field: "event",
        })?;

        let kind = match event.event_type.as_str() {
            "message" => Some(EventKind::Message),
            "app_mention" => Some(EventKind::AppMention),
            _ => None,
        };
        let Some(kind) = kind else {
            return Ok(SlackEvent::Unsupported { event_type: event.event_type });
        };

        let channel_id = match event.channel {
            Some(channel) if !channel.trim().is_empty() => channel,
            _ => {
                return Err(EventDecodeError::MissingField {
                    event_type: event.event_type,
                    field: "channel",
                })
            }
        };

        Ok(SlackEvent::Message(MessageEvent {
            kind,
            channel_id,
            user_id: event.user,
            bot_id: event.bot_id,
            subtype: event.subtype,
            text: event.text.unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use pokedict_core::EventKind;
    use serde_json::json;

    use super::{parse_socket_frame, EventDecodeError, SlackEnvelope, SlackEvent, SocketEvent};

    fn envelope(payload: serde_json::Value) -> SlackEnvelope {
        SlackEnvelope { envelope_id: "env-1".to_owned(), payload }
    }

    #[test]
    fn hello_and_disconnect_frames_are_lifecycle_events() {
        assert_eq!(
            parse_socket_frame(r#"{"type":"hello","num_connections":1}"#),
            Ok(SocketEvent::Connected)
        );
        assert_eq!(
            parse_socket_frame(r#"{"type":"disconnect","reason":"refresh_requested"}"#),
            Ok(SocketEvent::Disconnected { reason: "refresh_requested".to_owned() })
        );
    }

    #[test]
    fn events_api_frame_keeps_envelope_id_and_payload() {
        let raw = json!({
            "envelope_id": "57d6a792-4d35-4d0b-b6aa-3361493e1caf",
            "type": "events_api",
            "accepts_response_payload": false,
            "payload": { "type": "event_callback", "event": { "type": "message" } }
        })
        .to_string();

        let Ok(SocketEvent::EventsApi(envelope)) = parse_socket_frame(&raw) else {
            panic!("expected events api envelope");
        };
        assert_eq!(envelope.envelope_id, "57d6a792-4d35-4d0b-b6aa-3361493e1caf");
        assert_eq!(envelope.payload["type"], "event_callback");
    }

    #[test]
    fn other_envelope_types_are_unrecognized() {
        let event =
            parse_socket_frame(r#"{"type":"slash_commands","envelope_id":"e1","payload":{}}"#)
                .expect("frame decodes");
        assert_eq!(event, SocketEvent::Unrecognized { kind: "slash_commands".to_owned() });
    }

    #[test]
    fn events_api_without_envelope_id_is_rejected() {
        assert!(matches!(
            parse_socket_frame(r#"{"type":"events_api","payload":{}}"#),
            Err(EventDecodeError::MissingEnvelopeId { .. })
        ));
        assert!(matches!(parse_socket_frame("not json"), Err(EventDecodeError::Frame(_))));
    }

    #[test]
    fn decodes_user_message() {
        let event = envelope(json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "channel": "C024BE91L",
                "user": "U2147483697",
                "text": "<@U0LAN0Z89> 025",
                "ts": "1355517523.000005"
            }
        }))
        .decode_event()
        .expect("message decodes");

        let SlackEvent::Message(message) = event else {
            panic!("expected message event");
        };
        let inbound = message.to_inbound();
        assert_eq!(inbound.channel_id, "C024BE91L");
        assert_eq!(inbound.text, "<@U0LAN0Z89> 025");
        assert_eq!(inbound.kind, EventKind::Message);
        assert!(!inbound.sender_is_bot);
    }

    #[test]
    fn bot_id_or_bot_subtype_marks_sender_as_bot() {
        for event in [
            json!({ "type": "message", "channel": "C1", "bot_id": "B1", "text": "025" }),
            json!({ "type": "message", "channel": "C1", "subtype": "bot_message", "text": "025" }),
        ] {
            let decoded = envelope(json!({ "type": "event_callback", "event": event }))
                .decode_event()
                .expect("message decodes");
            let SlackEvent::Message(message) = decoded else {
                panic!("expected message event");
            };
            assert!(message.sender_is_bot());
        }
    }

    #[test]
    fn app_mentions_decode_with_their_own_kind() {
        let decoded = envelope(json!({
            "type": "event_callback",
            "event": { "type": "app_mention", "channel": "C1", "user": "U1", "text": "<@UB> 1" }
        }))
        .decode_event()
        .expect("mention decodes");

        assert!(matches!(decoded, SlackEvent::Message(ref m) if m.kind == EventKind::AppMention));
    }

    #[test]
    fn unrelated_events_are_unsupported() {
        let decoded = envelope(json!({
            "type": "event_callback",
            "event": { "type": "reaction_added", "reaction": "thumbsup" }
        }))
        .decode_event()
        .expect("payload decodes");
        assert_eq!(decoded, SlackEvent::Unsupported { event_type: "reaction_added".to_owned() });

        let decoded = envelope(json!({ "type": "url_verification" })).decode_event().expect("ok");
        assert_eq!(decoded, SlackEvent::Unsupported { event_type: "url_verification".to_owned() });
    }

    #[test]
    fn message_without_channel_is_a_decode_error() {
        let error = envelope(json!({
            "type": "event_callback",
            "event": { "type": "message", "text": "025" }
        }))
        .decode_event()
        .expect_err("channel is required");

        assert!(matches!(error, EventDecodeError::MissingField { field: "channel", .. }));
        assert!(envelope(json!("just a string")).decode_event().is_err());
    }
}
