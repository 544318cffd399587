//! Outbound message definitions
//!
//! Everything the relay sends to a participant is one `ServerMessage`.
//! The writer task renders it with `Display` and the codec appends the
//! newline delimiter, so none of these renderings contain `\n`.

use std::fmt;

/// Server → Participant message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Greeting sent to a participant right after it joins
    Welcome { name: String },
    /// Current number of connected participants
    OnlineCount(usize),
    /// System notice: someone joined
    Joined { name: String },
    /// System notice: someone left
    Left { name: String },
    /// Chat line relayed from another participant
    Chat { from: String, text: String },
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Welcome { name } => {
                write!(f, "Welcome to the chat room! Your name is: {}", name)
            }
            ServerMessage::OnlineCount(count) => write!(f, "Online: {}", count),
            ServerMessage::Joined { name } => write!(f, "System: {} joined the chat room", name),
            ServerMessage::Left { name } => write!(f, "System: {} left the chat room", name),
            ServerMessage::Chat { from, text } => write!(f, "{}: {}", from, text),
        }
    }
}
