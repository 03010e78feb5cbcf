//! Booking HTTP endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BookingAppState;
pub use routes::booking_router;
