//! Booking list queries (read side).

use std::sync::Arc;

use thiserror::Error;

use crate::domain::booking::Booking;
use crate::domain::foundation::UserId;
use crate::ports::BookingRepository;

/// Errors that can occur when listing bookings.
#[derive(Debug, Clone, Error)]
pub enum ListBookingsError {
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Read-side queries over bookings.
pub struct BookingQueries {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingQueries {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    /// Bookings the customer created, newest first.
    pub async fn by_customer(&self, customer: &UserId) -> Result<Vec<Booking>, ListBookingsError> {
        self.bookings
            .find_by_customer(customer)
            .await
            .map_err(|e| ListBookingsError::Repository(e.to_string()))
    }

    /// Bookings assigned to the agent, newest first.
    pub async fn by_agent(&self, agent: &UserId) -> Result<Vec<Booking>, ListBookingsError> {
        self.bookings
            .find_by_agent(agent)
            .await
            .map_err(|e| ListBookingsError::Repository(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryBookingRepository;
    use crate::domain::booking::{Booking, ServiceDetails};
    use crate::domain::foundation::Timestamp;

    fn details() -> ServiceDetails {
        ServiceDetails {
            service_type: "microwave-repair".to_string(),
            description: None,
            appointment_date: Timestamp::now(),
            location: "1 Fir Court".to_string(),
            appliance_type: None,
            preferred_time: None,
        }
    }

    #[tokio::test]
    async fn lists_are_scoped_to_the_requesting_party() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let queries = BookingQueries::new(repo.clone());

        let customer = UserId::new();
        let agent = UserId::new();
        let other_agent = UserId::new();

        let b1 = Booking::new(customer, agent, details());
        let b2 = Booking::new(customer, other_agent, details());
        repo.insert(&b1).await.unwrap();
        repo.insert(&b2).await.unwrap();

        assert_eq!(queries.by_customer(&customer).await.unwrap().len(), 2);
        assert_eq!(queries.by_agent(&agent).await.unwrap().len(), 1);
        assert_eq!(queries.by_agent(&UserId::new()).await.unwrap().len(), 0);
    }
}
