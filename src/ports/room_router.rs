//! Room router port: live delivery to a user's connected sessions.
//!
//! A "room" is the logical destination for all live sessions belonging to
//! one user, whatever the transport underneath (websockets today). Keeping
//! this behind a trait means the dispatcher and the booking handlers never
//! touch connection mechanics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::booking::BookingStatus;
use crate::domain::chat::ChatMessage;
use crate::domain::foundation::{BookingId, UserId};

/// An event routed to one user's room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A chat message addressed to the room's user.
    NewMessage { message: ChatMessage },

    /// Typing indicator from a counterpart. Ephemeral, never persisted.
    Typing { sender: UserId, is_typing: bool },

    /// A booking the user is party to changed status.
    BookingUpdate {
        booking_id: BookingId,
        status: BookingStatus,
        version: u64,
    },
}

/// Port for broadcasting live events to user rooms.
#[async_trait]
pub trait RoomRouter: Send + Sync {
    /// Deliver the event to every live session of `user`.
    ///
    /// Returns `true` when at least one session received it ("was online").
    /// Callers use the return value to decide whether a push notification
    /// is the only remaining channel.
    async fn broadcast_to_user(&self, user: &UserId, event: LiveEvent) -> bool;

    /// Whether the user currently has at least one live session.
    async fn is_online(&self, user: &UserId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_router_is_object_safe() {
        fn _accepts_dyn(_router: &dyn RoomRouter) {}
    }

    #[test]
    fn live_event_serializes_with_kind_tag() {
        let event = LiveEvent::Typing {
            sender: UserId::new(),
            is_typing: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "typing");
        assert_eq!(json["is_typing"], true);
    }
}
