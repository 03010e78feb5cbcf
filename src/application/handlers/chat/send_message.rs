//! SendMessage command handler (the message dispatcher).
//!
//! Orchestrates one send: validate the receiver, persist through the
//! message store (which assigns the conversation sequence), deliver to the
//! receiver's live room, then raise a push notification per policy. The
//! push runs off the critical path; the sender's response reflects only
//! validation and persistence.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use crate::application::notify::{spawn_push, DeliveryPolicy};
use crate::domain::chat::{ChatMessage, MessageType};
use crate::domain::foundation::{BookingId, UserId, ValidationError};
use crate::ports::{
    LiveEvent, MessageStore, NotificationEvent, NotificationGateway, RoomRouter, UserDirectory,
};

/// Longest body excerpt carried in a push notification.
const PUSH_PREVIEW_LEN: usize = 80;

/// Command to send a chat message.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    /// Sender from the auth context.
    pub sender: UserId,
    pub receiver: UserId,
    pub body: String,
    pub message_type: MessageType,
    /// Booking this conversation is about, when known.
    pub booking_id: Option<BookingId>,
}

/// Errors that can occur when sending a message.
#[derive(Debug, Clone, Error)]
pub enum SendMessageError {
    /// The receiver does not exist in the directory.
    #[error("Receiver not found: {0}")]
    ReceiverNotFound(UserId),

    /// Empty body or sender == receiver.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(String),
}

/// Dispatches chat messages: persistence, live delivery, push fallback.
pub struct MessageDispatcher {
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn MessageStore>,
    router: Arc<dyn RoomRouter>,
    gateway: Arc<dyn NotificationGateway>,
    policy: DeliveryPolicy,
}

impl MessageDispatcher {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn MessageStore>,
        router: Arc<dyn RoomRouter>,
        gateway: Arc<dyn NotificationGateway>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            users,
            store,
            router,
            gateway,
            policy,
        }
    }

    /// Sends a message and returns it as stored (sequence assigned,
    /// unread).
    pub async fn send(
        &self,
        command: SendMessageCommand,
    ) -> Result<ChatMessage, SendMessageError> {
        let message = ChatMessage::new(
            command.sender,
            command.receiver,
            command.body,
            command.message_type,
            command.booking_id,
        )?;

        if !self
            .users
            .exists(&command.receiver)
            .await
            .map_err(|e| SendMessageError::Repository(e.to_string()))?
        {
            return Err(SendMessageError::ReceiverNotFound(command.receiver));
        }

        let stored = self
            .store
            .append(message)
            .await
            .map_err(|e| SendMessageError::Repository(e.to_string()))?;

        let was_online = self
            .router
            .broadcast_to_user(
                &stored.receiver,
                LiveEvent::NewMessage {
                    message: stored.clone(),
                },
            )
            .await;

        tracing::debug!(
            message_id = %stored.id,
            sender = %stored.sender,
            receiver = %stored.receiver,
            sequence = stored.sequence,
            was_online,
            "message dispatched"
        );

        if self.policy.should_push(was_online) {
            let sender_name = self
                .users
                .find(&stored.sender)
                .await
                .ok()
                .flatten()
                .map(|u| u.name)
                .unwrap_or_else(|| "Someone".to_string());
            spawn_push(
                self.gateway.clone(),
                self.policy,
                NotificationEvent::new(
                    stored.receiver,
                    format!("New message from {}", sender_name),
                    push_preview(&stored),
                    json!({
                        "messageId": stored.id.to_string(),
                        "senderId": stored.sender.to_string(),
                        "bookingId": stored.booking_id.map(|b| b.to_string()),
                    }),
                ),
            );
        }

        Ok(stored)
    }
}

fn push_preview(message: &ChatMessage) -> String {
    match message.message_type {
        MessageType::Image => "Sent you an image".to_string(),
        MessageType::File => "Sent you a file".to_string(),
        MessageType::Text => {
            let body = message.body.trim();
            if body.chars().count() > PUSH_PREVIEW_LEN {
                let cut: String = body.chars().take(PUSH_PREVIEW_LEN).collect();
                format!("{}…", cut)
            } else {
                body.to_string()
            }
        }
    }
}
