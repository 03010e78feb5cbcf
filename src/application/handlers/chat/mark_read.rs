//! MarkRead command handler.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::UserId;
use crate::ports::MessageStore;

/// Errors that can occur when marking messages read.
#[derive(Debug, Clone, Error)]
pub enum MarkReadError {
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Marks every unread message from one counterpart as read.
pub struct MarkReadHandler {
    store: Arc<dyn MessageStore>,
}

impl MarkReadHandler {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Returns the number of messages flipped. Zero is a no-op, not an
    /// error.
    pub async fn execute(
        &self,
        viewer: &UserId,
        counterpart: &UserId,
    ) -> Result<u64, MarkReadError> {
        let updated = self
            .store
            .mark_read(viewer, counterpart)
            .await
            .map_err(|e| MarkReadError::Repository(e.to_string()))?;
        if updated > 0 {
            tracing::debug!(%viewer, %counterpart, updated, "messages marked read");
        }
        Ok(updated)
    }
}
