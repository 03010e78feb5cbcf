//! TransitionBooking command handler.
//!
//! The single serialized write of the system: a compare-and-swap on the
//! booking version turns concurrent status updates into one winner and
//! detectable losers. The counterparty hears about the change on its live
//! room and, per policy, via push.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use crate::application::notify::{spawn_push, DeliveryPolicy};
use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::foundation::{BookingId, ErrorCode, UserId};
use crate::ports::{
    BookingRepository, LiveEvent, NotificationEvent, NotificationGateway, RoomRouter,
};

/// Command to move a booking to a new status.
#[derive(Debug, Clone)]
pub struct TransitionBookingCommand {
    pub booking_id: BookingId,
    /// Version the caller last read; the write applies only if it still
    /// matches.
    pub expected_version: u64,
    pub target: BookingStatus,
    pub acting_user: UserId,
}

/// Errors that can occur when transitioning a booking.
#[derive(Debug, Clone, Error)]
pub enum TransitionBookingError {
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// Acting user is neither the customer nor the agent on the booking.
    #[error("Forbidden: user is not a party to this booking")]
    Forbidden,

    /// Invalid edge or stale version; caller should re-read and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

/// Handles booking status transitions.
pub struct TransitionBookingHandler {
    bookings: Arc<dyn BookingRepository>,
    router: Arc<dyn RoomRouter>,
    gateway: Arc<dyn NotificationGateway>,
    policy: DeliveryPolicy,
}

impl TransitionBookingHandler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        router: Arc<dyn RoomRouter>,
        gateway: Arc<dyn NotificationGateway>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            bookings,
            router,
            gateway,
            policy,
        }
    }

    /// Applies the transition and notifies the counterparty.
    pub async fn execute(
        &self,
        command: TransitionBookingCommand,
    ) -> Result<Booking, TransitionBookingError> {
        let mut booking = self
            .bookings
            .find_by_id(&command.booking_id)
            .await
            .map_err(|e| TransitionBookingError::Repository(e.to_string()))?
            .ok_or(TransitionBookingError::NotFound(command.booking_id))?;

        if !booking.is_party(&command.acting_user) {
            return Err(TransitionBookingError::Forbidden);
        }

        if booking.version != command.expected_version {
            return Err(TransitionBookingError::Conflict(format!(
                "stale version: expected {}, booking is at {}",
                command.expected_version, booking.version
            )));
        }

        booking
            .apply_transition(command.target)
            .map_err(|e| TransitionBookingError::Conflict(e.to_string()))?;

        self.bookings
            .update_versioned(&booking, command.expected_version)
            .await
            .map_err(|e| match e.code() {
                ErrorCode::StaleVersion => TransitionBookingError::Conflict(e.to_string()),
                ErrorCode::BookingNotFound => {
                    TransitionBookingError::NotFound(command.booking_id)
                }
                _ => TransitionBookingError::Repository(e.to_string()),
            })?;

        tracing::info!(
            booking_id = %booking.id,
            status = %booking.status,
            version = booking.version,
            acting_user = %command.acting_user,
            "booking status updated"
        );

        let counterparty = booking.counterparty(&command.acting_user);
        let was_online = self
            .router
            .broadcast_to_user(
                &counterparty,
                LiveEvent::BookingUpdate {
                    booking_id: booking.id,
                    status: booking.status,
                    version: booking.version,
                },
            )
            .await;

        if self.policy.should_push(was_online) {
            spawn_push(
                self.gateway.clone(),
                self.policy,
                NotificationEvent::new(
                    counterparty,
                    transition_title(booking.status),
                    transition_body(booking.status),
                    json!({ "bookingId": booking.id.to_string() }),
                ),
            );
        }

        Ok(booking)
    }
}

fn transition_title(status: BookingStatus) -> String {
    match status {
        BookingStatus::Accepted => "Booking Accepted".to_string(),
        BookingStatus::Rejected => "Booking Rejected".to_string(),
        BookingStatus::InProgress => "Booking In Progress".to_string(),
        BookingStatus::Completed => "Booking Completed".to_string(),
        BookingStatus::Cancelled => "Booking Cancelled".to_string(),
        BookingStatus::Pending => "Booking Updated".to_string(),
    }
}

fn transition_body(status: BookingStatus) -> String {
    match status {
        BookingStatus::Accepted | BookingStatus::Rejected => {
            format!("Your booking has been {} by the agent.", status)
        }
        other => format!("Your booking is now {}.", other),
    }
}
