//! Typing-indicator relay.
//!
//! Purely ephemeral: nothing is persisted, nothing is retried, and a
//! dropped indicator is an acceptable loss.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::ports::{LiveEvent, RoomRouter};

/// Relays typing indicators between live users.
pub struct PresenceTracker {
    router: Arc<dyn RoomRouter>,
}

impl PresenceTracker {
    pub fn new(router: Arc<dyn RoomRouter>) -> Self {
        Self { router }
    }

    /// Forward a typing state change to the target's room.
    pub async fn set_typing(&self, from: &UserId, to: &UserId, is_typing: bool) {
        self.router
            .broadcast_to_user(
                to,
                LiveEvent::Typing {
                    sender: *from,
                    is_typing,
                },
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::{SessionId, UserRooms};

    #[tokio::test]
    async fn typing_events_reach_the_target_room_only() {
        let rooms = Arc::new(UserRooms::with_default_capacity());
        let presence = PresenceTracker::new(rooms.clone());

        let from = UserId::new();
        let to = UserId::new();
        let mut rx = rooms.join(&to, SessionId::new()).await;

        presence.set_typing(&from, &to, true).await;
        match rx.recv().await.unwrap() {
            LiveEvent::Typing { sender, is_typing } => {
                assert_eq!(sender, from);
                assert!(is_typing);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn typing_to_offline_user_is_silently_dropped() {
        let rooms = Arc::new(UserRooms::with_default_capacity());
        let presence = PresenceTracker::new(rooms);
        // No receiver anywhere; must not error or panic.
        presence.set_typing(&UserId::new(), &UserId::new(), true).await;
    }
}
