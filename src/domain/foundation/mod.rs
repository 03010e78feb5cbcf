//! Shared domain primitives: identifiers, timestamps, errors, state machine.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{BookingId, MessageId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
