//! Chat domain: messages and derived conversation views.

mod conversation;
mod message;

pub use conversation::ConversationSummary;
pub use message::{ChatMessage, ConversationKey, MessageType};
