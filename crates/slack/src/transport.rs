use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};

use crate::api::SlackApiClient;
use crate::events::{parse_socket_frame, SocketEvent};
use crate::socket::{SocketTransport, TransportError};

type SocketStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Socket Mode over a real WebSocket. Each `connect` opens a fresh URL from
/// `apps.connections.open`; the stream is dropped whenever Slack closes it.
pub struct SlackSocketTransport {
    api: SlackApiClient,
    stream: Mutex<Option<SocketStream>>,
}

impl SlackSocketTransport {
    pub fn new(api: SlackApiClient) -> Self {
        Self { api, stream: Mutex::new(None) }
    }
}

enum Incoming {
    Text(String),
    Closed,
    Skip,
}

fn classify_message(message: WsMessage) -> Incoming {
    match message {
        WsMessage::Text(text) => Incoming::Text(text.as_str().to_owned()),
        WsMessage::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Incoming::Text(text),
            Err(error) => {
                warn!(error = %error, "dropping non utf-8 socket mode frame");
                Incoming::Skip
            }
        },
        WsMessage::Close(_) => Incoming::Closed,
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => Incoming::Skip,
    }
}

#[async_trait]
impl SocketTransport for SlackSocketTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        let url = self
            .api
            .open_connection()
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;

        *self.stream.lock().await = Some(stream);
        Ok(())
    }

    async fn next_event(&self) -> Result<Option<SocketEvent>, TransportError> {
        let mut guard = self.stream.lock().await;

        loop {
            let next = match guard.as_mut() {
                Some(stream) => stream.next().await,
                None => return Err(TransportError::Receive("socket is not connected".to_owned())),
            };

            let message = match next {
                None => {
                    *guard = None;
                    return Ok(None);
                }
                Some(Err(error)) => {
                    *guard = None;
                    return Err(TransportError::Receive(error.to_string()));
                }
                Some(Ok(message)) => message,
            };

            let text = match classify_message(message) {
                Incoming::Text(text) => text,
                Incoming::Closed => {
                    *guard = None;
                    return Ok(None);
                }
                Incoming::Skip => continue,
            };

            match parse_socket_frame(&text) {
                Ok(event) => return Ok(Some(event)),
                Err(error) => {
                    warn!(
                        event_name = "ingress.slack.frame_decode_failed",
                        error = %error,
                        "ignoring undecodable socket mode frame"
                    );
                }
            }
        }
    }

    async fn acknowledge(&self, envelope_id: &str) -> Result<(), TransportError> {
        let mut guard = self.stream.lock().await;
        let Some(stream) = guard.as_mut() else {
            return Err(TransportError::Acknowledge("socket is not connected".to_owned()));
        };

        let ack = json!({ "envelope_id": envelope_id }).to_string();
        stream
            .send(WsMessage::Text(ack.into()))
            .await
            .map_err(|error| TransportError::Acknowledge(error.to_string()))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let Some(mut stream) = self.stream.lock().await.take() else {
            debug!("socket mode transport already closed");
            return Ok(());
        };

        stream.close(None).await.map_err(|error| TransportError::Disconnect(error.to_string()))
    }
}
