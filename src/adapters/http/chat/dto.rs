//! HTTP DTOs for chat endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::chat::{ChatMessage, ConversationSummary, MessageType};

/// Request to send a chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: String,
    pub message: String,
    #[serde(default)]
    pub message_type: MessageType,
    pub booking_id: Option<String>,
}

/// Response for a single message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub booking_id: Option<String>,
    pub sequence: u64,
    /// RFC 3339.
    pub created_at: String,
}

impl From<ChatMessage> for MessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender.to_string(),
            receiver_id: message.receiver.to_string(),
            message: message.body,
            message_type: message.message_type,
            is_read: message.is_read,
            booking_id: message.booking_id.map(|id| id.to_string()),
            sequence: message.sequence,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Response for message history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<MessageResponse>,
}

/// One conversation in the inbox view.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub counterpart_id: String,
    pub last_message: MessageResponse,
    pub unread_count: u64,
}

impl From<ConversationSummary> for ConversationResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            counterpart_id: summary.counterpart.to_string(),
            last_message: MessageResponse::from(summary.last_message),
            unread_count: summary.unread_count,
        }
    }
}

/// Response for the conversation list.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
}

/// Response for the unread counter.
#[derive(Debug, Clone, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Response after marking a conversation read.
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[test]
    fn send_message_request_defaults_to_text() {
        let json = r#"{"receiver_id": "8b5e6e1c-93d4-4f73-a1cb-1a2b3c4d5e6f", "message": "hi"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.message_type, MessageType::Text);
        assert!(req.booking_id.is_none());
    }

    #[test]
    fn message_response_carries_sequence_and_read_flag() {
        let message =
            ChatMessage::new(UserId::new(), UserId::new(), "hello", MessageType::Text, None)
                .unwrap();
        let response = MessageResponse::from(message);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"is_read\":false"));
        assert!(json.contains("\"message_type\":\"text\""));
    }
}
