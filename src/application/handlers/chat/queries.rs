//! Chat read-side queries: history, conversation list, unread count.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::chat::{ChatMessage, ConversationSummary};
use crate::domain::foundation::UserId;
use crate::ports::MessageStore;

/// Errors that can occur on chat queries.
#[derive(Debug, Clone, Error)]
pub enum ChatQueryError {
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Read-side queries over the message store.
pub struct ChatQueries {
    store: Arc<dyn MessageStore>,
}

impl ChatQueries {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Full history between the viewer and a counterpart, ascending by
    /// `(created_at, sequence)`. Stable across repeated calls.
    pub async fn history(
        &self,
        viewer: &UserId,
        counterpart: &UserId,
    ) -> Result<Vec<ChatMessage>, ChatQueryError> {
        self.store
            .history(viewer, counterpart)
            .await
            .map_err(|e| ChatQueryError::Repository(e.to_string()))
    }

    /// One entry per counterpart, most-recently-active first.
    pub async fn conversations(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<ConversationSummary>, ChatQueryError> {
        self.store
            .conversations(viewer)
            .await
            .map_err(|e| ChatQueryError::Repository(e.to_string()))
    }

    /// Unread messages addressed to the viewer, across all conversations.
    pub async fn unread_count(&self, viewer: &UserId) -> Result<u64, ChatQueryError> {
        self.store
            .unread_count(viewer)
            .await
            .map_err(|e| ChatQueryError::Repository(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMessageStore;
    use crate::domain::chat::MessageType;

    async fn send(store: &InMemoryMessageStore, from: UserId, to: UserId, body: &str) {
        let msg = ChatMessage::new(from, to, body, MessageType::Text, None).unwrap();
        store.append(msg).await.unwrap();
    }

    #[tokio::test]
    async fn history_is_symmetric_between_the_two_users() {
        let store = Arc::new(InMemoryMessageStore::new());
        let queries = ChatQueries::new(store.clone());
        let a = UserId::new();
        let b = UserId::new();

        send(&store, a, b, "one").await;
        send(&store, b, a, "two").await;

        let from_a = queries.history(&a, &b).await.unwrap();
        let from_b = queries.history(&b, &a).await.unwrap();
        assert_eq!(from_a, from_b);
        assert_eq!(from_a.len(), 2);
        assert_eq!(from_a[0].body, "one");
    }

    #[tokio::test]
    async fn conversations_are_grouped_and_ordered_by_recency() {
        let store = Arc::new(InMemoryMessageStore::new());
        let queries = ChatQueries::new(store.clone());
        let viewer = UserId::new();
        let first = UserId::new();
        let second = UserId::new();

        send(&store, first, viewer, "early").await;
        send(&store, second, viewer, "late").await;

        let convs = queries.conversations(&viewer).await.unwrap();
        assert_eq!(convs.len(), 2);
        assert_eq!(convs[0].counterpart, second);
        assert_eq!(convs[0].unread_count, 1);
        assert_eq!(convs[1].counterpart, first);
    }

    #[tokio::test]
    async fn unread_count_spans_all_conversations() {
        let store = Arc::new(InMemoryMessageStore::new());
        let queries = ChatQueries::new(store.clone());
        let viewer = UserId::new();

        send(&store, UserId::new(), viewer, "a").await;
        send(&store, UserId::new(), viewer, "b").await;
        send(&store, viewer, UserId::new(), "sent, not received").await;

        assert_eq!(queries.unread_count(&viewer).await.unwrap(), 2);
    }
}
