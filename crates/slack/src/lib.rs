//! Slack integration - Socket Mode ingestion and replies
//!
//! - **Socket Mode** (`socket`, `transport`) - WebSocket connection to Slack, acks, reconnects
//! - **Events** (`events`) - decoding of Socket Mode frames and events-API payloads
//! - **Handler** (`handler`) - message → pokedex lookup → reply pipeline
//! - **Web API** (`api`) - `apps.connections.open` and `chat.postMessage`
//!
//! # Architecture
//!
//! ```text
//! Slack Socket Mode → SocketModeRunner → MessageHandler → PokemonLookup
//!                          ↓ ack                ↓
//!                                      Responder (chat.postMessage)
//! ```

pub mod api;
pub mod events;
pub mod handler;
pub mod socket;
pub mod transport;
