//! Booking command and query handlers.

mod attach_feedback;
mod create_booking;
mod list_bookings;
mod transition_status;

pub use attach_feedback::{AttachFeedbackCommand, AttachFeedbackError, AttachFeedbackHandler};
pub use create_booking::{CreateBookingCommand, CreateBookingError, CreateBookingHandler};
pub use list_bookings::{BookingQueries, ListBookingsError};
pub use transition_status::{
    TransitionBookingCommand, TransitionBookingError, TransitionBookingHandler,
};
