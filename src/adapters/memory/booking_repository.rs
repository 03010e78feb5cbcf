//! In-memory booking repository.
//!
//! Backs the integration tests and database-less development runs. The
//! version check happens under the write lock, giving the same
//! one-winner guarantee as the SQL adapter's conditional UPDATE.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, ErrorCode, UserId};
use crate::ports::BookingRepository;

/// Map-backed booking repository.
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored bookings (for test assertions).
    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), DomainError> {
        self.bookings
            .write()
            .await
            .insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.bookings.read().await.get(id).cloned())
    }

    async fn update_versioned(
        &self,
        booking: &Booking,
        expected_version: u64,
    ) -> Result<(), DomainError> {
        let mut bookings = self.bookings.write().await;
        let stored = bookings.get_mut(&booking.id).ok_or_else(|| {
            DomainError::new(ErrorCode::BookingNotFound, "booking not found")
        })?;
        if stored.version != expected_version {
            return Err(DomainError::new(
                ErrorCode::StaleVersion,
                format!(
                    "expected version {}, booking is at {}",
                    expected_version, stored.version
                ),
            ));
        }
        *stored = booking.clone();
        Ok(())
    }

    async fn find_by_customer(&self, customer: &UserId) -> Result<Vec<Booking>, DomainError> {
        let mut result: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.customer == *customer)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_by_agent(&self, agent: &UserId) -> Result<Vec<Booking>, DomainError> {
        let mut result: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.agent == *agent)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}
