//! PostgreSQL implementation of BookingRepository.
//!
//! The versioned update is a conditional UPDATE on `(id, version)`; the
//! database decides the winner between concurrent writers.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus, Feedback, ServiceDetails};
use crate::domain::foundation::{BookingId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::BookingRepository;

/// PostgreSQL implementation of BookingRepository.
#[derive(Clone)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    /// Creates a new PostgresBookingRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_id, agent_id, service_type, description,
                appointment_date, location, appliance_type, preferred_time,
                status, version, rating, feedback_comment,
                created_at, agent_response_time, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.customer.as_uuid())
        .bind(booking.agent.as_uuid())
        .bind(&booking.details.service_type)
        .bind(booking.details.description.as_deref())
        .bind(booking.details.appointment_date.as_datetime())
        .bind(&booking.details.location)
        .bind(booking.details.appliance_type.as_deref())
        .bind(booking.details.preferred_time.map(|t| *t.as_datetime()))
        .bind(booking.status.to_string())
        .bind(booking.version as i64)
        .bind(booking.feedback.as_ref().map(|f| f.rating.value() as i16))
        .bind(booking.feedback.as_ref().and_then(|f| f.comment.as_deref()))
        .bind(booking.created_at.as_datetime())
        .bind(booking.agent_response_time.map(|t| *t.as_datetime()))
        .bind(booking.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to insert booking: {}", e))
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, agent_id, service_type, description,
                   appointment_date, location, appliance_type, preferred_time,
                   status, version, rating, feedback_comment,
                   created_at, agent_response_time, updated_at
            FROM bookings WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to fetch booking: {}", e))
        })?;

        row.map(row_to_booking).transpose()
    }

    async fn update_versioned(
        &self,
        booking: &Booking,
        expected_version: u64,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = $3,
                version = $4,
                rating = $5,
                feedback_comment = $6,
                agent_response_time = $7,
                updated_at = $8
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(expected_version as i64)
        .bind(booking.status.to_string())
        .bind(booking.version as i64)
        .bind(booking.feedback.as_ref().map(|f| f.rating.value() as i16))
        .bind(booking.feedback.as_ref().and_then(|f| f.comment.as_deref()))
        .bind(booking.agent_response_time.map(|t| *t.as_datetime()))
        .bind(booking.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update booking: {}", e))
        })?;

        if result.rows_affected() == 0 {
            // Distinguish a lost race from a booking that never existed.
            let stored: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM bookings WHERE id = $1")
                    .bind(booking.id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        DomainError::new(
                            ErrorCode::DatabaseError,
                            format!("Failed to re-check booking version: {}", e),
                        )
                    })?;

            return match stored {
                Some((version,)) => Err(DomainError::new(
                    ErrorCode::StaleVersion,
                    format!(
                        "expected version {}, booking is at {}",
                        expected_version, version
                    ),
                )),
                None => Err(DomainError::new(
                    ErrorCode::BookingNotFound,
                    format!("Booking not found: {}", booking.id),
                )),
            };
        }

        Ok(())
    }

    async fn find_by_customer(&self, customer: &UserId) -> Result<Vec<Booking>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, agent_id, service_type, description,
                   appointment_date, location, appliance_type, preferred_time,
                   status, version, rating, feedback_comment,
                   created_at, agent_response_time, updated_at
            FROM bookings
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to fetch bookings: {}", e))
        })?;

        rows.into_iter().map(row_to_booking).collect()
    }

    async fn find_by_agent(&self, agent: &UserId) -> Result<Vec<Booking>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, agent_id, service_type, description,
                   appointment_date, location, appliance_type, preferred_time,
                   status, version, rating, feedback_comment,
                   created_at, agent_response_time, updated_at
            FROM bookings
            WHERE agent_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(agent.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to fetch bookings: {}", e))
        })?;

        rows.into_iter().map(row_to_booking).collect()
    }
}

fn row_to_booking(row: sqlx::postgres::PgRow) -> Result<Booking, DomainError> {
    let id: Uuid = row.get("id");
    let customer_id: Uuid = row.get("customer_id");
    let agent_id: Uuid = row.get("agent_id");
    let status: String = row.get("status");
    let version: i64 = row.get("version");
    let rating: Option<i16> = row.get("rating");
    let feedback_comment: Option<String> = row.get("feedback_comment");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let agent_response_time: Option<chrono::DateTime<chrono::Utc>> =
        row.get("agent_response_time");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");
    let appointment_date: chrono::DateTime<chrono::Utc> = row.get("appointment_date");
    let preferred_time: Option<chrono::DateTime<chrono::Utc>> = row.get("preferred_time");

    let status: BookingStatus = status.parse()?;
    let feedback = rating
        .map(|r| Feedback::new(r as u8, feedback_comment))
        .transpose()?;

    Ok(Booking {
        id: BookingId::from_uuid(id),
        customer: UserId::from_uuid(customer_id),
        agent: UserId::from_uuid(agent_id),
        details: ServiceDetails {
            service_type: row.get("service_type"),
            description: row.get("description"),
            appointment_date: Timestamp::from_datetime(appointment_date),
            location: row.get("location"),
            appliance_type: row.get("appliance_type"),
            preferred_time: preferred_time.map(Timestamp::from_datetime),
        },
        status,
        version: version as u64,
        feedback,
        created_at: Timestamp::from_datetime(created_at),
        agent_response_time: agent_response_time.map(Timestamp::from_datetime),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
