//! WebSocket upgrade handler for real-time chat connections.
//!
//! Connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Wait for the client's `join` event binding the connection to a user
//! 3. Subscribe to the user's room; forward room events to the socket
//! 4. Process client events (send_message, typing, pings) until disconnect
//! 5. Remove the session from the registry

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::application::handlers::chat::{MessageDispatcher, PresenceTracker, SendMessageCommand};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::LiveEvent;

use super::messages::{ClientMessage, ErrorMessage, JoinedMessage, PongMessage, ServerMessage};
use super::rooms::{SessionId, UserRooms};

/// Outgoing queue depth per connection.
const OUTBOUND_BUFFER: usize = 64;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct ChatSocketState {
    pub rooms: Arc<UserRooms>,
    pub dispatcher: Arc<MessageDispatcher>,
    pub presence: Arc<PresenceTracker>,
}

impl ChatSocketState {
    pub fn new(
        rooms: Arc<UserRooms>,
        dispatcher: Arc<MessageDispatcher>,
        presence: Arc<PresenceTracker>,
    ) -> Self {
        Self {
            rooms,
            dispatcher,
            presence,
        }
    }
}

/// Handle WebSocket upgrade requests for the chat connection.
///
/// Route: `GET /chat/live`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ChatSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs for the lifetime of one connection.
async fn handle_socket(socket: WebSocket, state: ChatSocketState) {
    let (mut sink, mut stream) = socket.split();
    let session = SessionId::new();

    // The connection is anonymous until the client joins.
    let user = match wait_for_join(&mut stream).await {
        Some(user) => user,
        None => {
            let err = ServerMessage::Error(ErrorMessage::new(
                "JOIN_REQUIRED",
                "first event must be join with a valid user id",
            ));
            let _ = send_json(&mut sink, &err).await;
            return;
        }
    };

    let mut room_rx = state.rooms.join(&user, session).await;
    tracing::debug!(%user, %session, "chat session joined");

    // Single writer over the sink: room events and direct replies both go
    // through this queue.
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_BUFFER);

    let joined = ServerMessage::Joined(JoinedMessage {
        user_id: user.to_string(),
        session_id: session.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });
    if out_tx.send(joined).await.is_err() {
        state.rooms.leave(&session).await;
        return;
    }

    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if send_json(&mut sink, &msg).await.is_err() {
                break;
            }
        }
    });

    // Forward room broadcasts into the outgoing queue.
    let forward_tx = out_tx.clone();
    let mut forward_task = tokio::spawn(async move {
        while let Ok(event) = room_rx.recv().await {
            if forward_tx.send(event.into()).await.is_err() {
                break;
            }
        }
    });

    // Process client events until the socket closes.
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        handle_client_message(&recv_state, &user, client_msg, &out_tx).await;
                    }
                    Err(e) => {
                        let err = ServerMessage::Error(ErrorMessage::new(
                            "BAD_EVENT",
                            format!("unparseable event: {}", e),
                        ));
                        if out_tx.send(err).await.is_err() {
                            break;
                        }
                    }
                },
                Ok(Message::Close(_)) | Err(_) => break,
                // Protocol pings/pongs are handled by axum; binary is ignored.
                Ok(_) => {}
            }
        }
    });

    // The aborted tasks must be awaited before `leave`: the forward task
    // owns the room receiver, and the registry's zero-receiver check only
    // sees the true count once that receiver is dropped.
    tokio::select! {
        _ = &mut write_task => {
            forward_task.abort();
            recv_task.abort();
            let _ = forward_task.await;
            let _ = recv_task.await;
        }
        _ = &mut forward_task => {
            write_task.abort();
            recv_task.abort();
            let _ = write_task.await;
            let _ = recv_task.await;
        }
        _ = &mut recv_task => {
            write_task.abort();
            forward_task.abort();
            let _ = write_task.await;
            let _ = forward_task.await;
        }
    }

    state.rooms.leave(&session).await;
    tracing::debug!(%user, %session, "chat session closed");
}

/// Reads frames until a valid `join` arrives; returns `None` if the
/// connection closes or the first event is not a valid join.
async fn wait_for_join(
    stream: &mut futures::stream::SplitStream<WebSocket>,
) -> Option<UserId> {
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                return match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join { user_id }) => user_id.parse().ok(),
                    _ => None,
                };
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

async fn handle_client_message(
    state: &ChatSocketState,
    user: &UserId,
    message: ClientMessage,
    out_tx: &mpsc::Sender<ServerMessage>,
) {
    match message {
        ClientMessage::Join { .. } => {
            // Already joined; redundant joins are ignored.
        }
        ClientMessage::SendMessage {
            receiver_id,
            message,
            message_type,
            booking_id,
        } => {
            let receiver = match receiver_id.parse() {
                Ok(id) => id,
                Err(_) => {
                    let _ = out_tx
                        .send(ServerMessage::Error(ErrorMessage::new(
                            "BAD_RECEIVER",
                            "receiver_id is not a valid user id",
                        )))
                        .await;
                    return;
                }
            };
            let booking_id = booking_id.and_then(|b| b.parse().ok());
            let command = SendMessageCommand {
                sender: *user,
                receiver,
                body: message,
                message_type,
                booking_id,
            };
            if let Err(e) = state.dispatcher.send(command).await {
                let _ = out_tx
                    .send(ServerMessage::Error(ErrorMessage::new(
                        "SEND_FAILED",
                        e.to_string(),
                    )))
                    .await;
            }
        }
        ClientMessage::Typing { receiver_id } => {
            if let Ok(receiver) = receiver_id.parse() {
                state.presence.set_typing(user, &receiver, true).await;
            }
        }
        ClientMessage::StopTyping { receiver_id } => {
            if let Ok(receiver) = receiver_id.parse() {
                state.presence.set_typing(user, &receiver, false).await;
            }
        }
        ClientMessage::Ping => {
            let _ = out_tx
                .send(ServerMessage::Pong(PongMessage {
                    timestamp: Timestamp::now().to_rfc3339(),
                }))
                .await;
        }
    }
}

/// Send a JSON message over the WebSocket.
async fn send_json(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).expect("ServerMessage serialization should not fail");
    sink.send(Message::Text(json)).await
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<ChatSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/chat/live", get(ws_handler))
}
