//! In-memory message store.
//!
//! Sequence counters and the message log live behind one write lock, so
//! a sequence number is assigned and the message appended atomically.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chat::{ChatMessage, ConversationKey, ConversationSummary};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::MessageStore;

#[derive(Default)]
struct Inner {
    messages: Vec<ChatMessage>,
    sequences: HashMap<ConversationKey, u64>,
}

/// Vec-backed message store with per-conversation sequence counters.
pub struct InMemoryMessageStore {
    inner: RwLock<Inner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Total stored messages (for test assertions).
    pub async fn len(&self) -> usize {
        self.inner.read().await.messages.len()
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, mut message: ChatMessage) -> Result<ChatMessage, DomainError> {
        let mut inner = self.inner.write().await;
        let key = message.conversation_key();
        let next = inner.sequences.entry(key).or_insert(0);
        *next += 1;
        message.sequence = *next;
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn history(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, DomainError> {
        let key = ConversationKey::new(*a, *b);
        let inner = self.inner.read().await;
        let mut result: Vec<ChatMessage> = inner
            .messages
            .iter()
            .filter(|m| m.conversation_key() == key)
            .cloned()
            .collect();
        result.sort_by_key(|m| m.ordering_key());
        Ok(result)
    }

    async fn conversations(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<ConversationSummary>, DomainError> {
        let inner = self.inner.read().await;
        let mut by_counterpart: HashMap<UserId, Vec<ChatMessage>> = HashMap::new();
        for message in &inner.messages {
            let counterpart = if message.sender == *viewer {
                message.receiver
            } else if message.receiver == *viewer {
                message.sender
            } else {
                continue;
            };
            by_counterpart
                .entry(counterpart)
                .or_default()
                .push(message.clone());
        }

        let mut summaries: Vec<ConversationSummary> = by_counterpart
            .into_iter()
            .filter_map(|(counterpart, messages)| {
                ConversationSummary::from_messages(viewer, counterpart, &messages)
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.last_message
                .ordering_key()
                .cmp(&a.last_message.ordering_key())
        });
        Ok(summaries)
    }

    async fn mark_read(
        &self,
        viewer: &UserId,
        counterpart: &UserId,
    ) -> Result<u64, DomainError> {
        let mut inner = self.inner.write().await;
        let mut updated = 0;
        for message in inner.messages.iter_mut() {
            if message.receiver == *viewer && message.sender == *counterpart && !message.is_read
            {
                message.mark_read();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn unread_count(&self, viewer: &UserId) -> Result<u64, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .messages
            .iter()
            .filter(|m| m.receiver == *viewer && !m.is_read)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::MessageType;

    fn msg(from: UserId, to: UserId, body: &str) -> ChatMessage {
        ChatMessage::new(from, to, body, MessageType::Text, None).unwrap()
    }

    #[tokio::test]
    async fn append_assigns_increasing_sequences_per_conversation() {
        let store = InMemoryMessageStore::new();
        let a = UserId::new();
        let b = UserId::new();
        let c = UserId::new();

        let m1 = store.append(msg(a, b, "1")).await.unwrap();
        let m2 = store.append(msg(b, a, "2")).await.unwrap();
        let m3 = store.append(msg(a, c, "other pair")).await.unwrap();

        assert_eq!(m1.sequence, 1);
        // Both directions share the conversation counter.
        assert_eq!(m2.sequence, 2);
        // A different pair starts its own counter.
        assert_eq!(m3.sequence, 1);
    }

    #[tokio::test]
    async fn history_orders_by_timestamp_then_sequence() {
        let store = InMemoryMessageStore::new();
        let a = UserId::new();
        let b = UserId::new();

        // Force identical timestamps so only the sequence can order them.
        let shared = crate::domain::foundation::Timestamp::now();
        for body in ["first", "second", "third"] {
            let mut m = msg(a, b, body);
            m.created_at = shared;
            store.append(m).await.unwrap();
        }

        let history = store.history(&a, &b).await.unwrap();
        let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);

        // Stable across repeated calls.
        assert_eq!(store.history(&a, &b).await.unwrap(), history);
        assert_eq!(store.history(&b, &a).await.unwrap(), history);
    }

    #[tokio::test]
    async fn mark_read_flips_only_the_matching_direction() {
        let store = InMemoryMessageStore::new();
        let viewer = UserId::new();
        let other = UserId::new();

        store.append(msg(other, viewer, "to viewer")).await.unwrap();
        store.append(msg(viewer, other, "from viewer")).await.unwrap();

        assert_eq!(store.mark_read(&viewer, &other).await.unwrap(), 1);
        assert_eq!(store.unread_count(&viewer).await.unwrap(), 0);
        // The viewer's own outbound message is untouched (still unread for
        // the counterpart).
        assert_eq!(store.unread_count(&other).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_never_duplicate_sequences() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let store = Arc::new(InMemoryMessageStore::new());
        let a = UserId::new();
        let b = UserId::new();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(msg(a, b, &format!("m{}", i))).await.unwrap()
            }));
        }
        let mut seen = HashSet::new();
        for handle in handles {
            let stored = handle.await.unwrap();
            assert!(seen.insert(stored.sequence), "duplicate sequence");
        }
        assert_eq!(seen.len(), 16);
    }
}
