//! AttachFeedback command handler.
//!
//! Only the booking's customer may leave feedback, only once, and only
//! after the work is completed.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::booking::{Booking, Feedback};
use crate::domain::foundation::{BookingId, ErrorCode, UserId, ValidationError};
use crate::ports::BookingRepository;

/// Command to attach feedback to a completed booking.
#[derive(Debug, Clone)]
pub struct AttachFeedbackCommand {
    pub booking_id: BookingId,
    pub acting_user: UserId,
    /// 1 to 5 inclusive.
    pub rating: u8,
    pub comment: Option<String>,
}

/// Errors that can occur when attaching feedback.
#[derive(Debug, Clone, Error)]
pub enum AttachFeedbackError {
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// Only the booking's customer may submit feedback.
    #[error("Forbidden: only the customer can submit feedback")]
    Forbidden,

    /// Rating out of range.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Booking not completed, feedback already present, or lost a
    /// concurrent write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

/// Handles feedback submission.
pub struct AttachFeedbackHandler {
    bookings: Arc<dyn BookingRepository>,
}

impl AttachFeedbackHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn execute(
        &self,
        command: AttachFeedbackCommand,
    ) -> Result<Booking, AttachFeedbackError> {
        let feedback = Feedback::new(command.rating, command.comment)?;

        let mut booking = self
            .bookings
            .find_by_id(&command.booking_id)
            .await
            .map_err(|e| AttachFeedbackError::Repository(e.to_string()))?
            .ok_or(AttachFeedbackError::NotFound(command.booking_id))?;

        if booking.customer != command.acting_user {
            return Err(AttachFeedbackError::Forbidden);
        }

        let loaded_version = booking.version;
        booking
            .attach_feedback(feedback)
            .map_err(|e| AttachFeedbackError::Conflict(e.to_string()))?;

        self.bookings
            .update_versioned(&booking, loaded_version)
            .await
            .map_err(|e| match e.code() {
                ErrorCode::StaleVersion => AttachFeedbackError::Conflict(e.to_string()),
                ErrorCode::BookingNotFound => AttachFeedbackError::NotFound(command.booking_id),
                _ => AttachFeedbackError::Repository(e.to_string()),
            })?;

        tracing::info!(
            booking_id = %booking.id,
            rating = command.rating,
            "feedback submitted"
        );

        Ok(booking)
    }
}
