//! Per-user rooms over tokio broadcast channels.
//!
//! `UserRooms` is both the connection registry (which sessions belong to
//! which user) and the live router (fan-out to every session of a user).
//! A user with three devices has three receivers on one channel.
//!
//! Both maps live behind one `RwLock`: joins and leaves always mutate them
//! together, and a single writer makes session removal and room
//! reclamation atomic. Broadcasts only take the read side.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::domain::foundation::UserId;
use crate::ports::{LiveEvent, RoomRouter};

/// Unique identifier for one live connection, generated server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct Registry {
    /// Map of user → broadcast sender for that user's room.
    rooms: HashMap<UserId, broadcast::Sender<LiveEvent>>,

    /// Map of session → user for O(1) cleanup on disconnect.
    sessions: HashMap<SessionId, UserId>,
}

/// Connection registry and room router over in-process broadcast channels.
pub struct UserRooms {
    registry: RwLock<Registry>,

    /// Channel capacity for each room.
    channel_capacity: usize,
}

impl UserRooms {
    /// Create a new registry with the given per-room channel capacity.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            channel_capacity,
        }
    }

    /// Create with default capacity (128 events).
    pub fn with_default_capacity() -> Self {
        Self::new(128)
    }

    /// Bind a session to a user's room, creating the room on first join.
    ///
    /// Returns a receiver carrying every event routed to that user.
    pub async fn join(&self, user: &UserId, session: SessionId) -> broadcast::Receiver<LiveEvent> {
        let mut registry = self.registry.write().await;
        registry.sessions.insert(session, *user);
        let sender = registry.rooms.entry(*user).or_insert_with(|| {
            let (tx, _) = broadcast::channel(self.channel_capacity);
            tx
        });
        sender.subscribe()
    }

    /// Remove a session. Safe to call redundantly; the user's room is
    /// reclaimed as soon as its last receiver is gone, so no entry
    /// outlives its sessions. The zero-receiver check and the removal
    /// run under the same write lock as `join`, so a concurrent join
    /// can never subscribe to a sender about to be evicted.
    pub async fn leave(&self, session: &SessionId) {
        let mut registry = self.registry.write().await;
        if let Some(user) = registry.sessions.remove(session) {
            if let Some(sender) = registry.rooms.get(&user) {
                if sender.receiver_count() == 0 {
                    registry.rooms.remove(&user);
                }
            }
        }
    }

    /// Number of live sessions for a user.
    pub async fn session_count(&self, user: &UserId) -> usize {
        self.registry
            .read()
            .await
            .rooms
            .get(user)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    /// Total live sessions across all users.
    pub async fn total_sessions(&self) -> usize {
        self.registry.read().await.sessions.len()
    }
}

impl Default for UserRooms {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl RoomRouter for UserRooms {
    async fn broadcast_to_user(&self, user: &UserId, event: LiveEvent) -> bool {
        let registry = self.registry.read().await;
        match registry.rooms.get(user) {
            // send fails exactly when no receiver is subscribed.
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    async fn is_online(&self, user: &UserId) -> bool {
        self.session_count(user).await > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn ping(user: UserId) -> LiveEvent {
        LiveEvent::Typing {
            sender: user,
            is_typing: true,
        }
    }

    #[tokio::test]
    async fn join_creates_room_and_receives_broadcast() {
        let rooms = UserRooms::with_default_capacity();
        let user = UserId::new();
        let mut rx = rooms.join(&user, SessionId::new()).await;

        assert!(rooms.broadcast_to_user(&user, ping(user)).await);
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn broadcast_reports_offline_when_nobody_joined() {
        let rooms = UserRooms::with_default_capacity();
        let user = UserId::new();
        assert!(!rooms.broadcast_to_user(&user, ping(user)).await);
        assert!(!rooms.is_online(&user).await);
    }

    #[tokio::test]
    async fn multi_device_fan_out_delivers_to_every_session() {
        let rooms = UserRooms::with_default_capacity();
        let user = UserId::new();
        let mut rx1 = rooms.join(&user, SessionId::new()).await;
        let mut rx2 = rooms.join(&user, SessionId::new()).await;
        let mut rx3 = rooms.join(&user, SessionId::new()).await;

        assert!(rooms.broadcast_to_user(&user, ping(user)).await);
        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
        assert!(rx3.recv().await.is_ok());
    }

    #[tokio::test]
    async fn rooms_are_isolated_per_user() {
        let rooms = UserRooms::with_default_capacity();
        let a = UserId::new();
        let b = UserId::new();
        let mut rx_a = rooms.join(&a, SessionId::new()).await;
        let _rx_b = rooms.join(&b, SessionId::new()).await;

        rooms.broadcast_to_user(&a, ping(a)).await;
        assert!(rx_a.recv().await.is_ok());
        assert_eq!(rooms.session_count(&a).await, 1);
        assert_eq!(rooms.session_count(&b).await, 1);
    }

    #[tokio::test]
    async fn leave_is_idempotent_and_reclaims_empty_rooms() {
        let rooms = UserRooms::with_default_capacity();
        let user = UserId::new();
        let session = SessionId::new();

        {
            let _rx = rooms.join(&user, session).await;
            // receiver dropped here, simulating a closed socket
        }
        rooms.leave(&session).await;
        rooms.leave(&session).await;

        assert_eq!(rooms.total_sessions().await, 0);
        assert!(!rooms.is_online(&user).await);
        assert!(!rooms.broadcast_to_user(&user, ping(user)).await);
    }

    #[tokio::test]
    async fn stale_session_does_not_duplicate_delivery() {
        let rooms = UserRooms::with_default_capacity();
        let user = UserId::new();
        let gone = SessionId::new();

        {
            let _rx = rooms.join(&user, gone).await;
        }
        rooms.leave(&gone).await;

        let mut rx = rooms.join(&user, SessionId::new()).await;
        rooms.broadcast_to_user(&user, ping(user)).await;
        assert!(rx.recv().await.is_ok());
        // Exactly one live receiver remains.
        assert_eq!(rooms.session_count(&user).await, 1);
    }

    #[tokio::test]
    async fn concurrent_joins_and_leaves_do_not_lose_updates() {
        let rooms = Arc::new(UserRooms::with_default_capacity());
        let user = UserId::new();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let rooms = rooms.clone();
            handles.push(tokio::spawn(async move {
                let session = SessionId::new();
                let _rx = rooms.join(&user, session).await;
                drop(_rx);
                rooms.leave(&session).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(rooms.total_sessions().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn join_and_leave_make_progress_across_worker_threads() {
        let rooms = Arc::new(UserRooms::with_default_capacity());
        let shared = UserId::new();

        let mut handles = Vec::new();
        for i in 0..8 {
            let rooms = rooms.clone();
            // Half the tasks churn one shared room, half their own.
            let user = if i % 2 == 0 { shared } else { UserId::new() };
            handles.push(tokio::spawn(async move {
                for _ in 0..2_000 {
                    let session = SessionId::new();
                    let rx = rooms.join(&user, session).await;
                    drop(rx);
                    rooms.leave(&session).await;
                }
            }));
        }

        let all = async {
            for handle in handles {
                handle.await.unwrap();
            }
        };
        tokio::time::timeout(Duration::from_secs(30), all)
            .await
            .expect("join/leave stalled under concurrent load");

        assert_eq!(rooms.total_sessions().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn join_racing_reclamation_still_receives_broadcasts() {
        let rooms = Arc::new(UserRooms::with_default_capacity());
        let user = UserId::new();

        for _ in 0..500 {
            // A dead session whose leave races the next join.
            let dead = SessionId::new();
            {
                let _rx = rooms.join(&user, dead).await;
            }
            let reclaim = {
                let rooms = rooms.clone();
                tokio::spawn(async move { rooms.leave(&dead).await })
            };

            let live = SessionId::new();
            let mut rx = rooms.join(&user, live).await;
            reclaim.await.unwrap();

            assert!(rooms.broadcast_to_user(&user, ping(user)).await);
            assert!(rx.recv().await.is_ok());
            rooms.leave(&live).await;
        }

        assert_eq!(rooms.total_sessions().await, 0);
    }
}
