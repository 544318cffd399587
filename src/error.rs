//! Error types for the chat relay
//!
//! Defines per-connection errors and outbound queue errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Connection-level errors
///
/// Every variant is contained to the connection that produced it: the
/// handler logs it and tears that one session down.
#[derive(Debug, Error)]
pub enum RelayError {
    /// IO error on the socket
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound line could not be decoded (too long or not UTF-8)
    #[error("Line decode error: {0}")]
    Codec(#[from] LinesCodecError),

    /// Peer closed the connection before sending its name line
    #[error("Connection closed before a name was received")]
    ClosedBeforeName,

    /// Peer did not send its name line within the idle timeout
    #[error("Timed out waiting for a name")]
    NameTimeout,

    /// The ChatServer actor is gone (server shutting down)
    #[error("Chat server closed")]
    ServerClosed,
}

/// Outbound queue errors
///
/// Returned by a non-blocking enqueue. Neither variant is fatal for the
/// broadcaster; the message is simply not delivered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// The queue is at capacity; the message was dropped
    #[error("Outbound queue full")]
    Full,

    /// The writer side has gone away (participant is tearing down)
    #[error("Outbound queue closed")]
    Closed,
}
