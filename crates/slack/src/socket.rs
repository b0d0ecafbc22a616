use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use pokedict_core::config::SocketConfig;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{SlackEnvelope, SlackEvent, SocketEvent};
use crate::handler::{EventContext, HandleOutcome, MessageService};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport ack failed: {0}")]
    Acknowledge(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 10, base_delay_ms: 500, max_delay_ms: 30_000 }
    }
}

impl From<&SocketConfig> for ReconnectPolicy {
    fn from(config: &SocketConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// One Socket Mode connection at a time. `next_event` returns `Ok(None)`
/// once the stream has ended; a new `connect` is needed after that.
#[async_trait]
pub trait SocketTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_event(&self) -> Result<Option<SocketEvent>, TransportError>;
    async fn acknowledge(&self, envelope_id: &str) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

pub struct SocketModeRunner {
    transport: Arc<dyn SocketTransport>,
    service: Arc<dyn MessageService>,
    reconnect_policy: ReconnectPolicy,
}

impl SocketModeRunner {
    pub fn new(
        transport: Arc<dyn SocketTransport>,
        service: Arc<dyn MessageService>,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, service, reconnect_policy }
    }

    /// Runs until connection attempts are exhausted. A stream that closes
    /// cleanly (Slack refreshes connections periodically) is reopened at once.
    /// Any successful `connect` resets the failure count, so only back-to-back
    /// failures stop the runner.
    pub async fn start(&self) -> Result<()> {
        let mut consecutive_failures = 0_u32;

        loop {
            let transport_error = match self.connect_and_pump(consecutive_failures).await {
                SessionEnd::Closed => {
                    consecutive_failures = 0;
                    info!("socket mode session ended; reconnecting");
                    continue;
                }
                SessionEnd::Dropped(error) => {
                    consecutive_failures = 0;
                    error
                }
                SessionEnd::ConnectFailed(error) => error,
            };

            warn!(
                attempt = consecutive_failures,
                max_retries = self.reconnect_policy.max_retries,
                error = %transport_error,
                "socket mode transport failed"
            );

            if consecutive_failures >= self.reconnect_policy.max_retries {
                warn!(
                    max_retries = self.reconnect_policy.max_retries,
                    "socket mode retries exhausted; stopping runner"
                );
                return Ok(());
            }

            let delay = self.reconnect_policy.backoff(consecutive_failures);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            consecutive_failures += 1;
        }
    }

    async fn connect_and_pump(&self, attempt: u32) -> SessionEnd {
        log_lifecycle(&SocketEvent::Connecting, attempt);
        if let Err(error) = self.transport.connect().await {
            log_lifecycle(&SocketEvent::ConnectionError(error.to_string()), attempt);
            return SessionEnd::ConnectFailed(error);
        }

        match self.pump(attempt).await {
            Ok(()) => SessionEnd::Closed,
            Err(error) => SessionEnd::Dropped(error),
        }
    }

    async fn pump(&self, attempt: u32) -> Result<(), TransportError> {
        loop {
            let Some(event) = self.transport.next_event().await? else {
                info!(attempt, "socket mode transport stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            match event {
                SocketEvent::EventsApi(envelope) => self.handle_envelope(&envelope).await,
                SocketEvent::Disconnected { reason } => {
                    info!(attempt, reason = %reason, "slack requested socket disconnect");
                    self.transport.disconnect().await?;
                    return Ok(());
                }
                SocketEvent::ConnectionError(reason) => {
                    log_lifecycle(&SocketEvent::ConnectionError(reason.clone()), attempt);
                    if let Err(error) = self.transport.disconnect().await {
                        debug!(error = %error, "disconnect after connection error failed");
                    }
                    return Err(TransportError::Receive(reason));
                }
                SocketEvent::Unrecognized { kind } => {
                    debug!(kind = %kind, "ignoring unrecognized socket mode frame");
                }
                lifecycle @ (SocketEvent::Connecting | SocketEvent::Connected) => {
                    log_lifecycle(&lifecycle, attempt)
                }
            }
        }
    }

    /// Acks first so a slow lookup never makes Slack redeliver the envelope.
    async fn handle_envelope(&self, envelope: &SlackEnvelope) {
        info!(
            event_name = "ingress.slack.envelope_received",
            envelope_id = %envelope.envelope_id,
            correlation_id = %envelope.envelope_id,
            "received slack envelope"
        );

        if let Err(error) = self.transport.acknowledge(&envelope.envelope_id).await {
            warn!(
                event_name = "ingress.slack.ack_sent",
                envelope_id = %envelope.envelope_id,
                correlation_id = %envelope.envelope_id,
                error = %error,
                "failed to acknowledge slack envelope"
            );
        } else {
            debug!(
                event_name = "ingress.slack.ack_sent",
                envelope_id = %envelope.envelope_id,
                correlation_id = %envelope.envelope_id,
                "acknowledged slack envelope"
            );
        }

        let message = match envelope.decode_event() {
            Ok(SlackEvent::Message(message)) => message,
            Ok(SlackEvent::Unsupported { event_type }) => {
                debug!(
                    envelope_id = %envelope.envelope_id,
                    event_type = %event_type,
                    "ignoring unsupported slack event"
                );
                return;
            }
            Err(error) => {
                warn!(
                    event_name = "ingress.slack.event_decode_failed",
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    error = %error,
                    "ignoring undecodable slack event"
                );
                return;
            }
        };

        let context = EventContext { correlation_id: envelope.envelope_id.clone() };
        match self.service.handle_message(&message.to_inbound(), &context).await {
            Ok(HandleOutcome::Replied(_)) => {}
            Ok(HandleOutcome::Ignored(reason)) => {
                debug!(
                    envelope_id = %envelope.envelope_id,
                    channel_id = %message.channel_id,
                    user_id = message.user_id.as_deref().unwrap_or("unknown"),
                    event_kind = message.kind.as_str(),
                    reason = ?reason,
                    "message ignored"
                );
            }
            Err(error) => {
                warn!(
                    envelope_id = %envelope.envelope_id,
                    correlation_id = %envelope.envelope_id,
                    channel_id = %message.channel_id,
                    error = %error,
                    "message handling failed; continuing socket loop"
                );
            }
        }
    }
}

enum SessionEnd {
    /// The stream ended or Slack asked for a reconnect.
    Closed,
    /// Connected, then lost the stream.
    Dropped(TransportError),
    ConnectFailed(TransportError),
}

fn log_lifecycle(event: &SocketEvent, attempt: u32) {
    match event {
        SocketEvent::Connecting => info!(attempt, "connecting to slack with socket mode"),
        SocketEvent::Connected => info!(attempt, "connected to slack with socket mode"),
        SocketEvent::ConnectionError(reason) => {
            warn!(attempt, error = %reason, "socket mode connection failed; retrying later")
        }
        other => debug!(attempt, kind = other.kind(), "socket mode event"),
    }
}
