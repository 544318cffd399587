//! Multi-client TCP Chat Relay Library
//!
//! Accepts any number of TCP connections, names each one from its first
//! line, and relays every later line to all other connected participants.
//!
//! # Protocol
//! - Newline-delimited UTF-8 text, one message per line.
//! - The first line a client sends is its display name.
//! - The server answers with a welcome line and the online count, then
//!   relays chat as `name: text` plus join/leave notices.
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the participant `Registry`
//! - Each connection has a `handler` task plus a read task and a write task
//! - Each participant has a bounded outbound queue; a full queue drops the
//!   message instead of blocking the broadcaster
//!
//! # Example
//! ```ignore
//! use chat_relay::{Config, Relay};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let relay = Relay::bind(Config::default()).await?;
//!     relay.run_until_ctrl_c().await;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod participant;
pub mod registry;
pub mod relay;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use broadcast::{broadcast, Delivery};
pub use codec::LineCodec;
pub use config::Config;
pub use error::{EnqueueError, RelayError};
pub use handler::handle_connection;
pub use message::ServerMessage;
pub use participant::Participant;
pub use registry::Registry;
pub use relay::Relay;
pub use server::{ChatServer, ServerCommand};
pub use types::ParticipantId;
