//! Chat command and query handlers.

mod mark_read;
mod presence;
mod queries;
mod send_message;

pub use mark_read::{MarkReadError, MarkReadHandler};
pub use presence::PresenceTracker;
pub use queries::{ChatQueries, ChatQueryError};
pub use send_message::{MessageDispatcher, SendMessageCommand, SendMessageError};
