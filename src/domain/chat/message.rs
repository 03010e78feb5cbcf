//! Chat message entity and ordering rules.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{BookingId, MessageId, Timestamp, UserId, ValidationError};

/// Kind of payload a chat message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::File => "file",
        };
        write!(f, "{}", s)
    }
}

/// A normalized (unordered) pair of users identifying one conversation.
///
/// `(a, b)` and `(b, a)` produce the same key, so sequence counters and
/// history lookups agree regardless of who sent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey(UserId, UserId);

impl ConversationKey {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn users(&self) -> (UserId, UserId) {
        (self.0, self.1)
    }
}

/// A persisted chat message between two users.
///
/// `sequence` is monotonic per conversation and is the authoritative
/// tiebreaker when two messages share a creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: UserId,
    pub receiver: UserId,
    pub body: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub booking_id: Option<BookingId>,
    pub sequence: u64,
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Creates a message ready to persist. The store assigns `sequence`.
    pub fn new(
        sender: UserId,
        receiver: UserId,
        body: impl Into<String>,
        message_type: MessageType,
        booking_id: Option<BookingId>,
    ) -> Result<Self, ValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        if sender == receiver {
            return Err(ValidationError::invalid_format(
                "receiver",
                "sender and receiver must differ",
            ));
        }
        Ok(Self {
            id: MessageId::new(),
            sender,
            receiver,
            body,
            message_type,
            is_read: false,
            booking_id,
            sequence: 0,
            created_at: Timestamp::now(),
        })
    }

    /// Total-order key within a conversation: `(created_at, sequence)`.
    pub fn ordering_key(&self) -> (Timestamp, u64) {
        (self.created_at, self.sequence)
    }

    /// Conversation this message belongs to.
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::new(self.sender, self.receiver)
    }

    /// Flips the read flag. One-way: a read message never becomes unread.
    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}
