//! WebSocket adapter: per-user rooms, wire protocol, connection handler.

mod handler;
mod messages;
mod rooms;

pub use handler::{ws_handler, websocket_router, ChatSocketState};
pub use messages::{ClientMessage, ErrorMessage, ServerMessage};
pub use rooms::{SessionId, UserRooms};
