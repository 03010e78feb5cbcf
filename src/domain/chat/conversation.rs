//! Derived conversation view: last message and unread count per counterpart.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

use super::message::ChatMessage;

/// Materialized view of one conversation from a viewer's perspective.
///
/// Not stored: computed from the message log by the message store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The other participant.
    pub counterpart: UserId,
    pub last_message: ChatMessage,
    /// Messages addressed to the viewer that are still unread.
    pub unread_count: u64,
}

impl ConversationSummary {
    /// Builds a summary from a viewer's messages with one counterpart.
    ///
    /// Returns `None` for an empty slice. Messages may arrive in any order;
    /// the `(created_at, sequence)` key picks the latest.
    pub fn from_messages(
        viewer: &UserId,
        counterpart: UserId,
        messages: &[ChatMessage],
    ) -> Option<Self> {
        let last_message = messages.iter().max_by_key(|m| m.ordering_key())?.clone();
        let unread_count = messages
            .iter()
            .filter(|m| m.receiver == *viewer && !m.is_read)
            .count() as u64;
        Some(Self {
            counterpart,
            last_message,
            unread_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::MessageType;

    #[test]
    fn empty_slice_yields_no_summary() {
        let viewer = UserId::new();
        assert!(ConversationSummary::from_messages(&viewer, UserId::new(), &[]).is_none());
    }

    #[test]
    fn summary_picks_latest_message_and_counts_unread() {
        let viewer = UserId::new();
        let other = UserId::new();

        let mut m1 = ChatMessage::new(other, viewer, "first", MessageType::Text, None).unwrap();
        m1.sequence = 1;
        let mut m2 = ChatMessage::new(viewer, other, "reply", MessageType::Text, None).unwrap();
        m2.sequence = 2;
        m2.created_at = m1.created_at;
        let mut m3 = ChatMessage::new(other, viewer, "latest", MessageType::Text, None).unwrap();
        m3.sequence = 3;
        m3.created_at = m1.created_at;

        let summary =
            ConversationSummary::from_messages(&viewer, other, &[m1, m2, m3.clone()]).unwrap();
        assert_eq!(summary.last_message, m3);
        // m1 and m3 target the viewer and are unread; m2 was sent by the viewer.
        assert_eq!(summary.unread_count, 2);
        assert_eq!(summary.counterpart, other);
    }
}
