//! HTTP handlers for chat endpoints.
//!
//! REST mirror of the websocket send path: messages sent here flow through
//! the same dispatcher, so live delivery and push fallback behave
//! identically regardless of transport.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::chat::{
    ChatQueries, ChatQueryError, MarkReadError, MarkReadHandler, MessageDispatcher,
    SendMessageCommand, SendMessageError,
};
use crate::application::notify::DeliveryPolicy;
use crate::domain::foundation::{BookingId, UserId};
use crate::ports::{MessageStore, NotificationGateway, RoomRouter, UserDirectory};

use super::super::middleware::RequireAuth;
use super::super::{ApiEnvelope, ErrorEnvelope};
use super::dto::{
    ConversationListResponse, ConversationResponse, HistoryResponse, MarkReadResponse,
    MessageResponse, SendMessageRequest, UnreadCountResponse,
};

/// Shared state for chat endpoints.
#[derive(Clone)]
pub struct ChatAppState {
    pub users: Arc<dyn UserDirectory>,
    pub store: Arc<dyn MessageStore>,
    pub router: Arc<dyn RoomRouter>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub policy: DeliveryPolicy,
}

impl ChatAppState {
    pub fn dispatcher(&self) -> MessageDispatcher {
        MessageDispatcher::new(
            self.users.clone(),
            self.store.clone(),
            self.router.clone(),
            self.gateway.clone(),
            self.policy,
        )
    }

    pub fn queries(&self) -> ChatQueries {
        ChatQueries::new(self.store.clone())
    }

    pub fn mark_read_handler(&self) -> MarkReadHandler {
        MarkReadHandler::new(self.store.clone())
    }
}

/// POST /api/messages - Send a message.
pub async fn send_message(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let receiver: UserId = request
        .receiver_id
        .parse()
        .map_err(|_| ChatApiError::BadRequest("Invalid receiver ID format".to_string()))?;
    let booking_id: Option<BookingId> = request
        .booking_id
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|_| ChatApiError::BadRequest("Invalid booking ID format".to_string()))?;

    let command = SendMessageCommand {
        sender: user.id,
        receiver,
        body: request.message,
        message_type: request.message_type,
        booking_id,
    };

    let stored = state.dispatcher().send(command).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok("Message sent", MessageResponse::from(stored))),
    ))
}

/// GET /api/messages/:user_id - History with one counterpart.
pub async fn get_history(
    State(state): State<ChatAppState>,
    Path(counterpart): Path<String>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ChatApiError> {
    let counterpart: UserId = counterpart
        .parse()
        .map_err(|_| ChatApiError::BadRequest("Invalid user ID format".to_string()))?;

    let messages = state.queries().history(&user.id, &counterpart).await?;
    Ok(Json(ApiEnvelope::ok(
        "Success",
        HistoryResponse {
            messages: messages.into_iter().map(MessageResponse::from).collect(),
        },
    )))
}

/// GET /api/conversations - Inbox view, most-recently-active first.
pub async fn list_conversations(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ChatApiError> {
    let conversations = state.queries().conversations(&user.id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Success",
        ConversationListResponse {
            conversations: conversations
                .into_iter()
                .map(ConversationResponse::from)
                .collect(),
        },
    )))
}

/// PUT /api/messages/:user_id/read - Mark a conversation read.
pub async fn mark_read(
    State(state): State<ChatAppState>,
    Path(counterpart): Path<String>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ChatApiError> {
    let counterpart: UserId = counterpart
        .parse()
        .map_err(|_| ChatApiError::BadRequest("Invalid user ID format".to_string()))?;

    let updated = state
        .mark_read_handler()
        .execute(&user.id, &counterpart)
        .await?;
    Ok(Json(ApiEnvelope::ok(
        "Messages marked read",
        MarkReadResponse { updated },
    )))
}

/// GET /api/messages/unread/count - Unread total across conversations.
pub async fn unread_count(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ChatApiError> {
    let count = state.queries().unread_count(&user.id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Success",
        UnreadCountResponse { count },
    )))
}

/// API error type that converts handler errors to HTTP responses.
#[derive(Debug)]
pub enum ChatApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SendMessageError> for ChatApiError {
    fn from(err: SendMessageError) -> Self {
        match err {
            SendMessageError::ReceiverNotFound(id) => {
                ChatApiError::NotFound(format!("Receiver not found: {}", id))
            }
            SendMessageError::Validation(e) => ChatApiError::BadRequest(e.to_string()),
            SendMessageError::Repository(msg) => ChatApiError::Internal(msg),
        }
    }
}

impl From<ChatQueryError> for ChatApiError {
    fn from(err: ChatQueryError) -> Self {
        match err {
            ChatQueryError::Repository(msg) => ChatApiError::Internal(msg),
        }
    }
}

impl From<MarkReadError> for ChatApiError {
    fn from(err: MarkReadError) -> Self {
        match err {
            MarkReadError::Repository(msg) => ChatApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ChatApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ChatApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ChatApiError::Internal(msg) => {
                tracing::error!("chat endpoint failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorEnvelope::failure(message))).into_response()
    }
}
