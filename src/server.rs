//! ChatServer Actor implementation
//!
//! The central actor that owns the participant registry. Connection
//! handlers never touch the registry directly; they send `ServerCommand`s
//! and the actor applies them one at a time, so joins, leaves and
//! broadcasts never observe a half-applied membership change.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::broadcast::broadcast;
use crate::message::ServerMessage;
use crate::participant::Participant;
use crate::registry::Registry;
use crate::types::ParticipantId;

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Participant read its name and is ready to go Active
    Join { participant: Participant },
    /// Chat line from a registered participant
    Chat { id: ParticipantId, text: String },
    /// Participant's session ended (EOF, IO error, or writer failure)
    Leave { id: ParticipantId },
    /// Server is shutting down: close every queue and stop
    Shutdown,
}

/// The main ChatServer actor
///
/// Processes commands from connection handlers until every sender is
/// dropped or a `Shutdown` arrives.
pub struct ChatServer {
    /// Currently connected participants
    registry: Registry,
    /// Online count published for concurrent readers
    online: watch::Sender<usize>,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        let (online, _) = watch::channel(0);
        Self {
            registry: Registry::new(),
            online,
            receiver,
        }
    }

    /// Subscribe to the online count
    ///
    /// The value is updated after every membership change. Readers may see
    /// it lag slightly behind the registry, never run ahead of it.
    pub fn online_count(&self) -> watch::Receiver<usize> {
        self.online.subscribe()
    }

    /// Run the ChatServer event loop
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            if !self.handle_command(cmd) {
                break;
            }
        }

        // Dropping the registry closes any queues still open
        let remaining = self.registry.clear();
        self.publish_count();
        info!("ChatServer shutting down ({} participants released)", remaining);
    }

    /// Process a single command, returning false when the actor should stop
    fn handle_command(&mut self, cmd: ServerCommand) -> bool {
        match cmd {
            ServerCommand::Join { participant } => self.handle_join(participant),
            ServerCommand::Chat { id, text } => self.handle_chat(id, text),
            ServerCommand::Leave { id } => self.handle_leave(id),
            ServerCommand::Shutdown => return false,
        }
        true
    }

    /// Register a participant and announce it
    fn handle_join(&mut self, participant: Participant) {
        let id = participant.id;
        let name = participant.name.clone();
        let count = self.registry.register(participant);
        self.publish_count();

        info!("{} joined ({}), online: {}", name, id, count);

        // Welcome and count go straight to the newcomer
        if let Some(newcomer) = self.registry.get(id) {
            let _ = newcomer.enqueue(ServerMessage::Welcome { name: name.clone() });
            let _ = newcomer.enqueue(ServerMessage::OnlineCount(count));
        }

        broadcast(&self.registry, &ServerMessage::Joined { name }, Some(id));
        broadcast(&self.registry, &ServerMessage::OnlineCount(count), Some(id));
    }

    /// Relay a chat line to everyone but its sender
    fn handle_chat(&mut self, id: ParticipantId, text: String) {
        let Some(sender) = self.registry.get(id) else {
            debug!("Chat from unregistered participant {} ignored", id);
            return;
        };

        let from = sender.name.clone();
        info!("{}: {}", from, text);

        let delivery = broadcast(
            &self.registry,
            &ServerMessage::Chat { from, text },
            Some(id),
        );
        if delivery.dropped > 0 {
            debug!(
                "Chat from {} queued to {}, dropped for {}",
                id, delivery.queued, delivery.dropped
            );
        }
    }

    /// Deregister a participant and announce the departure
    ///
    /// Only an actual removal announces, so a repeated `Leave` is a no-op.
    fn handle_leave(&mut self, id: ParticipantId) {
        let Some(participant) = self.registry.remove(id) else {
            debug!("Leave for {} ignored, not registered", id);
            return;
        };
        let count = self.registry.count();
        self.publish_count();

        info!("{} left ({}), online: {}", participant.name, id, count);

        // Closes the queue; the writer drains what is left and exits
        let name = participant.name.clone();
        drop(participant);

        broadcast(&self.registry, &ServerMessage::Left { name }, None);
        broadcast(&self.registry, &ServerMessage::OnlineCount(count), None);
    }

    fn publish_count(&self) {
        self.online.send_replace(self.registry.count());
    }
}
