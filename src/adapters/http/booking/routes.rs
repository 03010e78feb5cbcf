//! Route configuration for booking endpoints.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers::{
    create_booking, get_booking, list_agent_bookings, list_customer_bookings, submit_feedback,
    update_status, BookingAppState,
};

/// Creates the booking router.
///
/// Routes:
/// - `POST /api/bookings` - Create a booking
/// - `GET /api/bookings/customer` - Bookings the caller created
/// - `GET /api/bookings/agent` - Bookings assigned to the caller
/// - `GET /api/bookings/:id` - One booking
/// - `PUT /api/bookings/:id/status` - Apply a status transition
/// - `POST /api/bookings/:id/feedback` - Submit feedback
pub fn booking_router() -> Router<BookingAppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/customer", get(list_customer_bookings))
        .route("/api/bookings/agent", get(list_agent_bookings))
        .route("/api/bookings/:id", get(get_booking))
        .route("/api/bookings/:id/status", put(update_status))
        .route("/api/bookings/:id/feedback", post(submit_feedback))
}
