//! Basic type definitions for the chat relay
//!
//! Provides newtype wrappers for type safety:
//! - `ParticipantId`: UUID-based identity of one connected session

use uuid::Uuid;

/// Unique participant identifier (newtype pattern)
///
/// Wraps a UUID v4. Display names are not unique, so this is the only
/// identity the registry keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    /// Create a new random participant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
