//! Participant struct definition
//!
//! Represents one connected, named chat session and the producer side of
//! its bounded outbound queue.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::EnqueueError;
use crate::message::ServerMessage;
use crate::types::ParticipantId;

/// Recommended outbound queue capacity (pending messages per participant)
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Connected participant information
///
/// The registry holds the only long-lived copy of this struct, so removing
/// a participant from the registry drops the last queue sender and closes
/// the queue. The consumer side belongs to that participant's writer task.
#[derive(Debug)]
pub struct Participant {
    /// Unique identifier for this session
    pub id: ParticipantId,
    /// Display name from the first line the peer sent (trimmed, not unique)
    pub name: String,
    /// Server → Participant outbound queue
    sender: mpsc::Sender<ServerMessage>,
}

impl Participant {
    /// Create a participant around an existing queue sender
    pub fn new(id: ParticipantId, name: String, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, name, sender }
    }

    /// Create a participant with a fresh bounded queue
    ///
    /// Returns the participant and the receiver its writer should drain.
    pub fn with_queue(name: String, capacity: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(ParticipantId::new(), name, tx), rx)
    }

    /// Queue a message for this participant without waiting
    ///
    /// A full queue drops the message and logs it; the caller is never
    /// blocked and never needs to react.
    pub fn enqueue(&self, msg: ServerMessage) -> Result<(), EnqueueError> {
        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Outbound queue full for {}, dropping message", self.name);
                Err(EnqueueError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Outbound queue closed for {} ({})", self.name, self.id);
                Err(EnqueueError::Closed)
            }
        }
    }

    /// Check whether the writer side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
