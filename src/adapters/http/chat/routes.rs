//! Route configuration for chat endpoints.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers::{
    get_history, list_conversations, mark_read, send_message, unread_count, ChatAppState,
};

/// Creates the chat router.
///
/// Routes:
/// - `POST /api/messages` - Send a message
/// - `GET /api/messages/unread/count` - Unread total
/// - `GET /api/messages/:user_id` - History with one counterpart
/// - `PUT /api/messages/:user_id/read` - Mark a conversation read
/// - `GET /api/conversations` - Inbox view
pub fn chat_router() -> Router<ChatAppState> {
    Router::new()
        .route("/api/messages", post(send_message))
        .route("/api/messages/unread/count", get(unread_count))
        .route("/api/messages/:user_id", get(get_history))
        .route("/api/messages/:user_id/read", put(mark_read))
        .route("/api/conversations", get(list_conversations))
}
