//! HTTP handlers for booking endpoints.
//!
//! Connects axum routes to the booking command and query handlers. The
//! acting user always comes from the auth context, never the request body.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::booking::{
    AttachFeedbackCommand, AttachFeedbackError, AttachFeedbackHandler, BookingQueries,
    CreateBookingCommand, CreateBookingError, CreateBookingHandler, ListBookingsError,
    TransitionBookingCommand, TransitionBookingError, TransitionBookingHandler,
};
use crate::application::notify::DeliveryPolicy;
use crate::domain::booking::ServiceDetails;
use crate::domain::foundation::{BookingId, Timestamp, UserId};
use crate::ports::{BookingRepository, NotificationGateway, RoomRouter, UserDirectory, UserRole};

use super::super::middleware::RequireAuth;
use super::super::{ApiEnvelope, ErrorEnvelope};
use super::dto::{
    BookingListResponse, BookingResponse, CreateBookingRequest, FeedbackRequest,
    UpdateStatusRequest,
};

/// Shared state for booking endpoints.
#[derive(Clone)]
pub struct BookingAppState {
    pub bookings: Arc<dyn BookingRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub router: Arc<dyn RoomRouter>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub policy: DeliveryPolicy,
}

impl BookingAppState {
    pub fn create_booking_handler(&self) -> CreateBookingHandler {
        CreateBookingHandler::new(
            self.bookings.clone(),
            self.users.clone(),
            self.gateway.clone(),
            self.policy,
        )
    }

    pub fn transition_handler(&self) -> TransitionBookingHandler {
        TransitionBookingHandler::new(
            self.bookings.clone(),
            self.router.clone(),
            self.gateway.clone(),
            self.policy,
        )
    }

    pub fn feedback_handler(&self) -> AttachFeedbackHandler {
        AttachFeedbackHandler::new(self.bookings.clone())
    }

    pub fn queries(&self) -> BookingQueries {
        BookingQueries::new(self.bookings.clone())
    }
}

/// POST /api/bookings - Create a booking (customer only).
pub async fn create_booking(
    State(state): State<BookingAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, BookingApiError> {
    if user.role != UserRole::Customer {
        return Err(BookingApiError::Forbidden(
            "Only customers can create bookings".to_string(),
        ));
    }

    let agent: UserId = request
        .agent_id
        .parse()
        .map_err(|_| BookingApiError::BadRequest("Invalid agent ID format".to_string()))?;

    let command = CreateBookingCommand {
        customer: user.id,
        agent,
        details: ServiceDetails {
            service_type: request.service_type,
            description: request.description,
            appointment_date: Timestamp::from_datetime(request.appointment_date),
            location: request.location,
            appliance_type: request.appliance_type,
            preferred_time: request.preferred_time.map(Timestamp::from_datetime),
        },
    };

    let booking = state.create_booking_handler().execute(command).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(
            "Booking created",
            BookingResponse::from(booking),
        )),
    ))
}

/// GET /api/bookings/customer - Bookings the authenticated customer created.
pub async fn list_customer_bookings(
    State(state): State<BookingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BookingApiError> {
    let bookings = state.queries().by_customer(&user.id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Success",
        BookingListResponse {
            bookings: bookings.into_iter().map(BookingResponse::from).collect(),
        },
    )))
}

/// GET /api/bookings/agent - Bookings assigned to the authenticated agent.
pub async fn list_agent_bookings(
    State(state): State<BookingAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BookingApiError> {
    let bookings = state.queries().by_agent(&user.id).await?;
    Ok(Json(ApiEnvelope::ok(
        "Success",
        BookingListResponse {
            bookings: bookings.into_iter().map(BookingResponse::from).collect(),
        },
    )))
}

/// GET /api/bookings/:id - One booking, visible to its parties only.
pub async fn get_booking(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<String>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, BookingApiError> {
    let booking_id: BookingId = booking_id
        .parse()
        .map_err(|_| BookingApiError::BadRequest("Invalid booking ID format".to_string()))?;

    let booking = state
        .bookings
        .find_by_id(&booking_id)
        .await
        .map_err(|e| BookingApiError::Internal(e.to_string()))?
        .ok_or_else(|| BookingApiError::NotFound(format!("Booking not found: {}", booking_id)))?;

    if !booking.is_party(&user.id) {
        return Err(BookingApiError::Forbidden(
            "Not a party to this booking".to_string(),
        ));
    }

    Ok(Json(ApiEnvelope::ok(
        "Success",
        BookingResponse::from(booking),
    )))
}

/// PUT /api/bookings/:id/status - Apply a status transition.
pub async fn update_status(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<String>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, BookingApiError> {
    let booking_id: BookingId = booking_id
        .parse()
        .map_err(|_| BookingApiError::BadRequest("Invalid booking ID format".to_string()))?;

    let command = TransitionBookingCommand {
        booking_id,
        expected_version: request.expected_version,
        target: request.status,
        acting_user: user.id,
    };

    let booking = state.transition_handler().execute(command).await?;
    Ok(Json(ApiEnvelope::ok(
        "Booking status updated",
        BookingResponse::from(booking),
    )))
}

/// POST /api/bookings/:id/feedback - Submit feedback (customer only).
pub async fn submit_feedback(
    State(state): State<BookingAppState>,
    Path(booking_id): Path<String>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, BookingApiError> {
    let booking_id: BookingId = booking_id
        .parse()
        .map_err(|_| BookingApiError::BadRequest("Invalid booking ID format".to_string()))?;

    let command = AttachFeedbackCommand {
        booking_id,
        acting_user: user.id,
        rating: request.rating,
        comment: request.comment,
    };

    let booking = state.feedback_handler().execute(command).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(
            "Feedback submitted",
            BookingResponse::from(booking),
        )),
    ))
}

/// API error type that converts handler errors to HTTP responses.
#[derive(Debug)]
pub enum BookingApiError {
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl From<CreateBookingError> for BookingApiError {
    fn from(err: CreateBookingError) -> Self {
        match err {
            CreateBookingError::AgentNotFound(id) => {
                BookingApiError::NotFound(format!("Agent not found: {}", id))
            }
            CreateBookingError::Repository(msg) => BookingApiError::Internal(msg),
        }
    }
}

impl From<TransitionBookingError> for BookingApiError {
    fn from(err: TransitionBookingError) -> Self {
        match err {
            TransitionBookingError::NotFound(id) => {
                BookingApiError::NotFound(format!("Booking not found: {}", id))
            }
            TransitionBookingError::Forbidden => {
                BookingApiError::Forbidden("Not a party to this booking".to_string())
            }
            TransitionBookingError::Conflict(msg) => BookingApiError::Conflict(msg),
            TransitionBookingError::Repository(msg) => BookingApiError::Internal(msg),
        }
    }
}

impl From<AttachFeedbackError> for BookingApiError {
    fn from(err: AttachFeedbackError) -> Self {
        match err {
            AttachFeedbackError::NotFound(id) => {
                BookingApiError::NotFound(format!("Booking not found: {}", id))
            }
            AttachFeedbackError::Forbidden => {
                BookingApiError::Forbidden("Only the customer can submit feedback".to_string())
            }
            AttachFeedbackError::Validation(e) => BookingApiError::BadRequest(e.to_string()),
            AttachFeedbackError::Conflict(msg) => BookingApiError::Conflict(msg),
            AttachFeedbackError::Repository(msg) => BookingApiError::Internal(msg),
        }
    }
}

impl From<ListBookingsError> for BookingApiError {
    fn from(err: ListBookingsError) -> Self {
        match err {
            ListBookingsError::Repository(msg) => BookingApiError::Internal(msg),
        }
    }
}

impl IntoResponse for BookingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            BookingApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            BookingApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            BookingApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            BookingApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            BookingApiError::Internal(msg) => {
                tracing::error!("booking endpoint failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorEnvelope::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_bad_request_to_400() {
        let response = BookingApiError::BadRequest("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_not_found_to_404() {
        let response = BookingApiError::NotFound("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_conflict_to_409() {
        let response = BookingApiError::Conflict("stale".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_forbidden_to_403() {
        let response = BookingApiError::Forbidden("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn transition_conflict_converts_to_409_variant() {
        let err = BookingApiError::from(TransitionBookingError::Conflict("stale".to_string()));
        assert!(matches!(err, BookingApiError::Conflict(_)));
    }

    #[test]
    fn feedback_validation_converts_to_400_variant() {
        let err = BookingApiError::from(AttachFeedbackError::Validation(
            crate::domain::foundation::ValidationError::out_of_range("rating", 1, 5, 9),
        ));
        assert!(matches!(err, BookingApiError::BadRequest(_)));
    }
}
