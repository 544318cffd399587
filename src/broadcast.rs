//! Fan-out of one message to every participant but one
//!
//! Delivery is best-effort: each recipient gets exactly one non-blocking
//! enqueue attempt, and a full queue only costs that recipient the message.

use crate::message::ServerMessage;
use crate::registry::Registry;
use crate::types::ParticipantId;

/// Outcome of one broadcast call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Recipients whose queue accepted the message
    pub queued: usize,
    /// Recipients whose queue was full or already closed
    pub dropped: usize,
}

impl Delivery {
    /// Total enqueue attempts made
    pub fn attempted(&self) -> usize {
        self.queued + self.dropped
    }
}

/// Enqueue `msg` to every registered participant except `excluded`
///
/// `excluded = None` reaches everyone (system-wide announcements).
pub fn broadcast(
    registry: &Registry,
    msg: &ServerMessage,
    excluded: Option<ParticipantId>,
) -> Delivery {
    let mut delivery = Delivery::default();
    registry.for_each_except(excluded, |participant| {
        match participant.enqueue(msg.clone()) {
            Ok(()) => delivery.queued += 1,
            Err(_) => delivery.dropped += 1,
        }
    });
    delivery
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::participant::Participant;

    fn join(
        registry: &mut Registry,
        name: &str,
        capacity: usize,
    ) -> (ParticipantId, mpsc::Receiver<ServerMessage>) {
        let (participant, rx) = Participant::with_queue(name.to_string(), capacity);
        let id = participant.id;
        registry.register(participant);
        (id, rx)
    }

    #[tokio::test]
    async fn test_sender_is_excluded() {
        let mut registry = Registry::new();
        let (alice, mut alice_rx) = join(&mut registry, "alice", 8);
        let (_, mut bob_rx) = join(&mut registry, "bob", 8);
        let (_, mut carol_rx) = join(&mut registry, "carol", 8);

        let msg = ServerMessage::Chat {
            from: "alice".to_string(),
            text: "hi".to_string(),
        };
        let delivery = broadcast(&registry, &msg, Some(alice));

        assert_eq!(delivery, Delivery { queued: 2, dropped: 0 });
        assert_eq!(bob_rx.try_recv().ok(), Some(msg.clone()));
        assert_eq!(carol_rx.try_recv().ok(), Some(msg));
        assert!(alice_rx.try_recv().is_err());

        // At most one copy each
        assert!(bob_rx.try_recv().is_err());
        assert!(carol_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_no_exclusion_reaches_everyone() {
        let mut registry = Registry::new();
        let (_, mut alice_rx) = join(&mut registry, "alice", 8);
        let (_, mut bob_rx) = join(&mut registry, "bob", 8);

        let delivery = broadcast(&registry, &ServerMessage::OnlineCount(2), None);

        assert_eq!(delivery.attempted(), 2);
        assert_eq!(alice_rx.try_recv().ok(), Some(ServerMessage::OnlineCount(2)));
        assert_eq!(bob_rx.try_recv().ok(), Some(ServerMessage::OnlineCount(2)));
    }

    #[tokio::test]
    async fn test_slow_recipient_does_not_affect_fast_one() {
        let mut registry = Registry::new();
        let (_, _slow_rx) = join(&mut registry, "slow", 1);
        let (_, mut fast_rx) = join(&mut registry, "fast", 16);

        let mut dropped = 0;
        for i in 0..5 {
            dropped += broadcast(&registry, &ServerMessage::OnlineCount(i), None).dropped;
        }

        // slow accepted only the first message
        assert_eq!(dropped, 4);
        for i in 0..5 {
            assert_eq!(fast_rx.try_recv().ok(), Some(ServerMessage::OnlineCount(i)));
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        let delivery = broadcast(&registry, &ServerMessage::OnlineCount(0), None);
        assert_eq!(delivery.attempted(), 0);
    }
}
