//! HTTP DTOs for booking endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingStatus};

/// Request to create a booking.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    /// The agent the customer picked.
    pub agent_id: String,
    pub service_type: String,
    pub description: Option<String>,
    /// RFC 3339 timestamp.
    pub appointment_date: DateTime<Utc>,
    pub location: String,
    pub appliance_type: Option<String>,
    pub preferred_time: Option<DateTime<Utc>>,
}

/// Request to move a booking to a new status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
    /// Version the caller last read.
    pub expected_version: u64,
}

/// Request to submit feedback for a completed booking.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    /// 1 to 5 inclusive.
    pub rating: u8,
    pub comment: Option<String>,
}

/// Response for a single booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub customer_id: String,
    pub agent_id: String,
    pub service_type: String,
    pub description: Option<String>,
    /// RFC 3339.
    pub appointment_date: String,
    pub location: String,
    pub appliance_type: Option<String>,
    pub preferred_time: Option<String>,
    pub status: BookingStatus,
    pub version: u64,
    pub rating: Option<u8>,
    pub feedback_comment: Option<String>,
    pub created_at: String,
    pub agent_response_time: Option<String>,
    pub updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            customer_id: booking.customer.to_string(),
            agent_id: booking.agent.to_string(),
            service_type: booking.details.service_type,
            description: booking.details.description,
            appointment_date: booking.details.appointment_date.to_rfc3339(),
            location: booking.details.location,
            appliance_type: booking.details.appliance_type,
            preferred_time: booking.details.preferred_time.map(|t| t.to_rfc3339()),
            status: booking.status,
            version: booking.version,
            rating: booking.feedback.as_ref().map(|f| f.rating.value()),
            feedback_comment: booking.feedback.and_then(|f| f.comment),
            created_at: booking.created_at.to_rfc3339(),
            agent_response_time: booking.agent_response_time.map(|t| t.to_rfc3339()),
            updated_at: booking.updated_at.to_rfc3339(),
        }
    }
}

/// Response for booking lists.
#[derive(Debug, Clone, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingResponse>,
}
