//! Booking domain: lifecycle state machine, aggregate, feedback.

mod booking;
mod feedback;
mod status;

pub use booking::{Booking, ServiceDetails};
pub use feedback::{Feedback, Rating};
pub use status::BookingStatus;
