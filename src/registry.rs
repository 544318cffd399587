//! Participant registry
//!
//! The set of currently connected participants. Owned and mutated by the
//! `ChatServer` actor only, which is what makes every membership change
//! atomic with respect to broadcasts and count reads.

use std::collections::HashMap;

use crate::participant::Participant;
use crate::types::ParticipantId;

/// Membership set keyed by participant identity
///
/// Insertion order is irrelevant. The online count is the number of
/// entries, so it can never go negative.
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ParticipantId, Participant>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant
    ///
    /// Returns the new online count.
    pub fn register(&mut self, participant: Participant) -> usize {
        self.participants.insert(participant.id, participant);
        self.count()
    }

    /// Remove a participant
    ///
    /// Idempotent: removing a non-member returns None and changes nothing.
    pub fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    /// Call `f` for every registered participant except `excluded`
    ///
    /// `None` excludes nobody. Order is unspecified.
    pub fn for_each_except<F>(&self, excluded: Option<ParticipantId>, f: F)
    where
        F: FnMut(&Participant),
    {
        self.participants
            .values()
            .filter(|p| Some(p.id) != excluded)
            .for_each(f);
    }

    /// Look up a participant
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Check if a participant is registered
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    /// Current online count
    pub fn count(&self) -> usize {
        self.participants.len()
    }

    /// Check if nobody is connected
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Drop every participant, closing all outbound queues
    ///
    /// Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.participants.len();
        self.participants.clear();
        removed
    }
}
