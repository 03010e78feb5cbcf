//! CreateBooking command handler.
//!
//! A customer files a service request; the assigned agent gets a
//! best-effort push. Push failure never fails the creation.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use crate::application::notify::{spawn_push, DeliveryPolicy};
use crate::domain::booking::{Booking, ServiceDetails};
use crate::domain::foundation::UserId;
use crate::ports::{BookingRepository, NotificationEvent, NotificationGateway, UserDirectory};

/// Command to create a booking.
#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    /// Customer from the auth context.
    pub customer: UserId,
    /// Agent the customer picked.
    pub agent: UserId,
    pub details: ServiceDetails,
}

/// Errors that can occur when creating a booking.
#[derive(Debug, Clone, Error)]
pub enum CreateBookingError {
    /// The chosen agent does not exist in the directory.
    #[error("Agent not found: {0}")]
    AgentNotFound(UserId),

    /// Repository error during persistence.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Handles booking creation.
pub struct CreateBookingHandler {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserDirectory>,
    gateway: Arc<dyn NotificationGateway>,
    policy: DeliveryPolicy,
}

impl CreateBookingHandler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        users: Arc<dyn UserDirectory>,
        gateway: Arc<dyn NotificationGateway>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            bookings,
            users,
            gateway,
            policy,
        }
    }

    /// Creates the booking in `Pending` at version 0 and notifies the agent.
    pub async fn execute(
        &self,
        command: CreateBookingCommand,
    ) -> Result<Booking, CreateBookingError> {
        let agent = self
            .users
            .find(&command.agent)
            .await
            .map_err(|e| CreateBookingError::Repository(e.to_string()))?
            .ok_or(CreateBookingError::AgentNotFound(command.agent))?;

        let booking = Booking::new(command.customer, command.agent, command.details);
        self.bookings
            .insert(&booking)
            .await
            .map_err(|e| CreateBookingError::Repository(e.to_string()))?;

        tracing::info!(
            booking_id = %booking.id,
            customer = %booking.customer,
            agent = %booking.agent,
            "booking created"
        );

        let appliance = booking
            .details
            .appliance_type
            .as_deref()
            .unwrap_or(&booking.details.service_type)
            .to_string();
        spawn_push(
            self.gateway.clone(),
            self.policy,
            NotificationEvent::new(
                agent.id,
                "New Repair Request",
                format!("You have a new repair request for {}.", appliance),
                json!({ "bookingId": booking.id.to_string() }),
            ),
        );

        Ok(booking)
    }
}
