//! WebSocket message types for the chat connection.
//!
//! Defines the protocol between server and connected clients:
//! - Client → Server: join, send_message, typing/stop_typing, pings
//! - Server → Client: joined, new_message, user_typing, booking_update,
//!   errors, pongs

use serde::{Deserialize, Serialize};

use crate::domain::chat::MessageType;
use crate::domain::foundation::Timestamp;
use crate::ports::LiveEvent;

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Bind this connection to the user's room.
    Join { user_id: String },

    /// Send a chat message to another user.
    SendMessage {
        receiver_id: String,
        message: String,
        #[serde(default)]
        message_type: MessageType,
        booking_id: Option<String>,
    },

    /// The user started typing to `receiver_id`.
    Typing { receiver_id: String },

    /// The user stopped typing to `receiver_id`.
    StopTyping { receiver_id: String },

    /// Heartbeat request.
    Ping,
}

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection bound to the user's room.
    Joined(JoinedMessage),

    /// A chat message addressed to this user.
    NewMessage(NewMessageEvent),

    /// A counterpart's typing state changed.
    UserTyping(UserTypingEvent),

    /// A booking this user is party to changed status.
    BookingUpdate(BookingUpdateEvent),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

/// Sent when a client successfully joins its room.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedMessage {
    pub user_id: String,
    pub session_id: String,
    pub timestamp: String,
}

/// Live chat message payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub id: String,
    pub sender_id: String,
    pub message: String,
    pub message_type: MessageType,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    pub sequence: u64,
    pub timestamp: String,
}

/// Typing indicator payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingEvent {
    pub sender_id: String,
    pub is_typing: bool,
}

/// Booking status change payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdateEvent {
    pub booking_id: String,
    pub status: crate::domain::booking::BookingStatus,
    pub version: u64,
}

/// Error message sent to a client.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorMessage {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }
}

/// Heartbeat response.
#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl From<LiveEvent> for ServerMessage {
    fn from(event: LiveEvent) -> Self {
        match event {
            LiveEvent::NewMessage { message } => ServerMessage::NewMessage(NewMessageEvent {
                id: message.id.to_string(),
                sender_id: message.sender.to_string(),
                message: message.body,
                message_type: message.message_type,
                is_read: message.is_read,
                booking_id: message.booking_id.map(|b| b.to_string()),
                sequence: message.sequence,
                timestamp: message.created_at.to_rfc3339(),
            }),
            LiveEvent::Typing { sender, is_typing } => {
                ServerMessage::UserTyping(UserTypingEvent {
                    sender_id: sender.to_string(),
                    is_typing,
                })
            }
            LiveEvent::BookingUpdate {
                booking_id,
                status,
                version,
            } => ServerMessage::BookingUpdate(BookingUpdateEvent {
                booking_id: booking_id.to_string(),
                status,
                version,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::ChatMessage;
    use crate::domain::foundation::UserId;

    #[test]
    fn client_join_deserializes() {
        let json = r#"{"type": "join", "user_id": "8f14e45f-ea4c-4f2d-91f4-1f8a3b1c2d3e"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Join { .. }));
    }

    #[test]
    fn client_send_message_defaults_to_text() {
        let json = r#"{
            "type": "send_message",
            "receiver_id": "8f14e45f-ea4c-4f2d-91f4-1f8a3b1c2d3e",
            "message": "hello"
        }"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::SendMessage {
                message_type,
                booking_id,
                ..
            } => {
                assert_eq!(message_type, MessageType::Text);
                assert!(booking_id.is_none());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn live_message_converts_to_new_message_event() {
        let chat =
            ChatMessage::new(UserId::new(), UserId::new(), "hi", MessageType::Text, None)
                .unwrap();
        let server: ServerMessage = LiveEvent::NewMessage {
            message: chat.clone(),
        }
        .into();
        let json = serde_json::to_value(&server).unwrap();
        assert_eq!(json["type"], "new_message");
        assert_eq!(json["senderId"], chat.sender.to_string());
        assert_eq!(json["message"], "hi");
    }

    #[test]
    fn typing_event_serializes_with_snake_case_tag() {
        let server: ServerMessage = LiveEvent::Typing {
            sender: UserId::new(),
            is_typing: false,
        }
        .into();
        let json = serde_json::to_value(&server).unwrap();
        assert_eq!(json["type"], "user_typing");
        assert_eq!(json["isTyping"], false);
    }
}
