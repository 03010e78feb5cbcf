//! PostgreSQL implementation of MessageStore.
//!
//! Sequence numbers are assigned inside the INSERT with a subselect over
//! the normalized user pair, so both directions of a conversation share
//! one counter. A unique index on the pair plus sequence rejects the rare
//! duplicate from a concurrent insert; `append` recomputes the sequence
//! and retries a bounded number of times when that happens.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::chat::{ChatMessage, ConversationSummary, MessageType};
use crate::domain::foundation::{BookingId, DomainError, ErrorCode, MessageId, Timestamp, UserId};
use crate::ports::MessageStore;

/// Attempts before a racing send gives up on claiming a sequence.
const APPEND_ATTEMPTS: u32 = 3;

/// PostgreSQL implementation of MessageStore.
#[derive(Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    /// Creates a new PostgresMessageStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One insert attempt; the computed sequence comes back from the row.
    async fn try_append(&self, message: &ChatMessage) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            INSERT INTO chat_messages (
                id, sender_id, receiver_id, body, message_type, is_read,
                booking_id, sequence, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                (
                    SELECT COALESCE(MAX(sequence), 0) + 1
                    FROM chat_messages
                    WHERE LEAST(sender_id, receiver_id) = LEAST($2, $3)
                      AND GREATEST(sender_id, receiver_id) = GREATEST($2, $3)
                ),
                $8
            )
            RETURNING sequence
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.sender.as_uuid())
        .bind(message.receiver.as_uuid())
        .bind(&message.body)
        .bind(message.message_type.to_string())
        .bind(message.is_read)
        .bind(message.booking_id.map(|id| *id.as_uuid()))
        .bind(message.created_at.as_datetime())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("sequence"))
    }
}

/// True when the unique index on the conversation pair plus sequence
/// rejected the insert, i.e. a concurrent append claimed the same number.
fn is_sequence_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn append(&self, message: ChatMessage) -> Result<ChatMessage, DomainError> {
        let mut attempt = 1;
        loop {
            match self.try_append(&message).await {
                Ok(sequence) => {
                    let mut stored = message;
                    stored.sequence = sequence as u64;
                    return Ok(stored);
                }
                Err(e) if is_sequence_conflict(&e) && attempt < APPEND_ATTEMPTS => {
                    tracing::debug!(attempt, "sequence taken by a concurrent send, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to insert message: {}", e),
                    ));
                }
            }
        }
    }

    async fn history(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, body, message_type, is_read,
                   booking_id, sequence, created_at
            FROM chat_messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC, sequence ASC
            "#,
        )
        .bind(a.as_uuid())
        .bind(b.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to fetch history: {}", e))
        })?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn conversations(
        &self,
        viewer: &UserId,
    ) -> Result<Vec<ConversationSummary>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, body, message_type, is_read,
                   booking_id, sequence, created_at
            FROM chat_messages
            WHERE sender_id = $1 OR receiver_id = $1
            "#,
        )
        .bind(viewer.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch conversations: {}", e),
            )
        })?;

        let mut by_counterpart: HashMap<UserId, Vec<ChatMessage>> = HashMap::new();
        for row in rows {
            let message = row_to_message(row)?;
            let counterpart = if message.sender == *viewer {
                message.receiver
            } else {
                message.sender
            };
            by_counterpart.entry(counterpart).or_default().push(message);
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
        let result = sqlx::query(
            r#"
            UPDATE chat_messages SET is_read = TRUE
            WHERE receiver_id = $1 AND sender_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(viewer.as_uuid())
        .bind(counterpart.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to mark messages read: {}", e),
            )
        })?;

        Ok(result.rows_affected())
    }

    async fn unread_count(&self, viewer: &UserId) -> Result<u64, DomainError> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chat_messages WHERE receiver_id = $1 AND is_read = FALSE",
        )
        .bind(viewer.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to count unread messages: {}", e),
            )
        })?;

        Ok(result.0 as u64)
    }
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<ChatMessage, DomainError> {
    let id: Uuid = row.get("id");
    let sender_id: Uuid = row.get("sender_id");
    let receiver_id: Uuid = row.get("receiver_id");
    let message_type: String = row.get("message_type");
    let booking_id: Option<Uuid> = row.get("booking_id");
    let sequence: i64 = row.get("sequence");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    Ok(ChatMessage {
        id: MessageId::from_uuid(id),
        sender: UserId::from_uuid(sender_id),
        receiver: UserId::from_uuid(receiver_id),
        body: row.get("body"),
        message_type: str_to_message_type(&message_type)?,
        is_read: row.get("is_read"),
        booking_id: booking_id.map(BookingId::from_uuid),
        sequence: sequence as u64,
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn str_to_message_type(s: &str) -> Result<MessageType, DomainError> {
    match s {
        "text" => Ok(MessageType::Text),
        "image" => Ok(MessageType::Image),
        "file" => Ok(MessageType::File),
        _ => Err(DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid message type: {}", s),
        )),
    }
}
