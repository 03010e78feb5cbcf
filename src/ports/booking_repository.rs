//! Booking repository port (write side).
//!
//! Persists the Booking aggregate. The write path is compare-and-swap on the
//! aggregate's `version`: concurrent writers against the same version fail
//! fast with `StaleVersion` instead of overwriting each other.

use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, UserId};

/// Repository port for Booking aggregate persistence.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Save a newly created booking.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, booking: &Booking) -> Result<(), DomainError>;

    /// Find a booking by its ID.
    ///
    /// Returns `None` if not found. Bookings are never deleted, so `None`
    /// means the ID was never issued.
    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError>;

    /// Persist a mutated booking if the stored version still equals
    /// `expected_version`.
    ///
    /// The caller loads the aggregate, mutates it (which bumps its version),
    /// and passes the version it loaded. Exactly one of two concurrent
    /// writers with the same `expected_version` wins.
    ///
    /// # Errors
    ///
    /// - `StaleVersion` if the stored version no longer matches
    /// - `BookingNotFound` if the booking does not exist
    /// - `DatabaseError` on persistence failure
    async fn update_versioned(
        &self,
        booking: &Booking,
        expected_version: u64,
    ) -> Result<(), DomainError>;

    /// All bookings created by a customer, newest first.
    async fn find_by_customer(&self, customer: &UserId) -> Result<Vec<Booking>, DomainError>;

    /// All bookings assigned to an agent, newest first.
    async fn find_by_agent(&self, agent: &UserId) -> Result<Vec<Booking>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn BookingRepository) {}
    }
}
