//! Message store port: persistence and derived views for chat.
//!
//! The store owns sequence assignment: `append` takes a message with
//! `sequence == 0` and returns it with the next number for its conversation.
//! All reads are ordered by `(created_at, sequence)` so repeated calls
//! return identical orderings even when timestamps collide.

use async_trait::async_trait;

use crate::domain::chat::{ChatMessage, ConversationSummary};
use crate::domain::foundation::{DomainError, UserId};

/// Persistence port for chat messages and conversation aggregates.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message, assigning the next sequence number for the
    /// (sender, receiver) conversation. Returns the stored message.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn append(&self, message: ChatMessage) -> Result<ChatMessage, DomainError>;

    /// Full history between two users, ascending by `(created_at, sequence)`.
    async fn history(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, DomainError>;

    /// One summary per counterpart the viewer has exchanged messages with,
    /// most-recently-active first.
    async fn conversations(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<ConversationSummary>, DomainError>;

    /// Mark every unread message from `counterpart` to `viewer` as read.
    ///
    /// Returns the number of messages updated; zero matches is a no-op,
    /// not an error.
    async fn mark_read(&self, viewer: &UserId, counterpart: &UserId)
        -> Result<u64, DomainError>;

    /// Count of unread messages addressed to the user, across all
    /// conversations.
    async fn unread_count(&self, viewer: &UserId) -> Result<u64, DomainError>;
}
