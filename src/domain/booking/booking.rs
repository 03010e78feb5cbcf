//! Booking aggregate: the single write model for the booking lifecycle.
//!
//! All mutations go through [`Booking::apply_transition`] and
//! [`Booking::attach_feedback`]; both bump the `version` counter that the
//! repositories use for optimistic concurrency. Bookings are never deleted.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, StateMachine, Timestamp, UserId,
};

use super::feedback::Feedback;
use super::status::BookingStatus;

/// Service metadata captured when the customer files the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetails {
    pub service_type: String,
    pub description: Option<String>,
    pub appointment_date: Timestamp,
    pub location: String,
    pub appliance_type: Option<String>,
    pub preferred_time: Option<Timestamp>,
}

/// A service booking between a customer and a field agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub customer: UserId,
    pub agent: UserId,
    pub details: ServiceDetails,
    pub status: BookingStatus,
    /// Monotonic counter compared at write time (optimistic concurrency).
    pub version: u64,
    pub feedback: Option<Feedback>,
    pub created_at: Timestamp,
    /// Stamped the first time the booking leaves `Pending`.
    pub agent_response_time: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl Booking {
    /// Creates a new booking in `Pending` at version 0.
    pub fn new(customer: UserId, agent: UserId, details: ServiceDetails) -> Self {
        let now = Timestamp::now();
        Self {
            id: BookingId::new(),
            customer,
            agent,
            details,
            status: BookingStatus::Pending,
            version: 0,
            feedback: None,
            created_at: now,
            agent_response_time: None,
            updated_at: now,
        }
    }

    /// Returns true if the user is the customer or the agent on this booking.
    pub fn is_party(&self, user: &UserId) -> bool {
        self.customer == *user || self.agent == *user
    }

    /// Returns the other party relative to `user`.
    ///
    /// Callers must check `is_party` first; for a non-party this returns
    /// the customer.
    pub fn counterparty(&self, user: &UserId) -> UserId {
        if self.customer == *user {
            self.agent
        } else {
            self.customer
        }
    }

    /// Applies a status transition per the transition table.
    ///
    /// On success the version increments by 1 and `agent_response_time` is
    /// stamped when leaving `Pending`. An unlisted edge (including any exit
    /// from a terminal state) leaves the booking untouched.
    pub fn apply_transition(&mut self, target: BookingStatus) -> Result<(), DomainError> {
        let next = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("cannot transition booking from {} to {}", self.status, target),
            )
            .with_detail("current_status", self.status.to_string())
            .with_detail("target_status", target.to_string())
        })?;

        if self.status == BookingStatus::Pending {
            self.agent_response_time = Some(Timestamp::now());
        }
        self.status = next;
        self.version += 1;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Attaches customer feedback, at most once and only while `Completed`.
    pub fn attach_feedback(&mut self, feedback: Feedback) -> Result<(), DomainError> {
        if !self.status.accepts_feedback() {
            return Err(DomainError::new(
                ErrorCode::BookingNotCompleted,
                "feedback can only be submitted for completed bookings",
            )
            .with_detail("current_status", self.status.to_string()));
        }
        if self.feedback.is_some() {
            return Err(DomainError::new(
                ErrorCode::FeedbackAlreadySubmitted,
                "feedback has already been submitted for this booking",
            ));
        }
        self.feedback = Some(feedback);
        self.version += 1;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ServiceDetails {
        ServiceDetails {
            service_type: "refrigerator-repair".to_string(),
            description: Some("not cooling".to_string()),
            appointment_date: Timestamp::now(),
            location: "12 Hill Road".to_string(),
            appliance_type: Some("refrigerator".to_string()),
            preferred_time: None,
        }
    }

    fn booking() -> Booking {
        Booking::new(UserId::new(), UserId::new(), details())
    }

    #[test]
    fn new_booking_is_pending_at_version_zero() {
        let b = booking();
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.version, 0);
        assert!(b.feedback.is_none());
        assert!(b.agent_response_time.is_none());
    }

    #[test]
    fn accept_stamps_response_time_and_bumps_version() {
        let mut b = booking();
        b.apply_transition(BookingStatus::Accepted).unwrap();
        assert_eq!(b.status, BookingStatus::Accepted);
        assert_eq!(b.version, 1);
        assert!(b.agent_response_time.is_some());
    }

    #[test]
    fn response_time_only_stamped_when_leaving_pending() {
        let mut b = booking();
        b.apply_transition(BookingStatus::Accepted).unwrap();
        let stamped = b.agent_response_time;
        b.apply_transition(BookingStatus::InProgress).unwrap();
        assert_eq!(b.agent_response_time, stamped);
    }

    #[test]
    fn invalid_edge_leaves_booking_untouched() {
        let mut b = booking();
        let before = b.clone();
        let err = b.apply_transition(BookingStatus::Completed).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert_eq!(b, before);
    }

    #[test]
    fn terminal_state_rejects_all_exits() {
        let mut b = booking();
        b.apply_transition(BookingStatus::Rejected).unwrap();
        for target in BookingStatus::all() {
            assert!(b.clone().apply_transition(target).is_err());
        }
    }

    #[test]
    fn feedback_requires_completed_status() {
        let mut b = booking();
        b.apply_transition(BookingStatus::Accepted).unwrap();
        b.apply_transition(BookingStatus::InProgress).unwrap();

        let fb = Feedback::new(5, None).unwrap();
        let err = b.attach_feedback(fb.clone()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BookingNotCompleted);

        b.apply_transition(BookingStatus::Completed).unwrap();
        b.attach_feedback(fb).unwrap();
        assert!(b.feedback.is_some());
    }

    #[test]
    fn feedback_attaches_at_most_once() {
        let mut b = booking();
        b.apply_transition(BookingStatus::Accepted).unwrap();
        b.apply_transition(BookingStatus::InProgress).unwrap();
        b.apply_transition(BookingStatus::Completed).unwrap();

        b.attach_feedback(Feedback::new(4, None).unwrap()).unwrap();
        let err = b
            .attach_feedback(Feedback::new(2, None).unwrap())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FeedbackAlreadySubmitted);
        assert_eq!(b.feedback.unwrap().rating.value(), 4);
    }

    #[test]
    fn counterparty_flips_between_customer_and_agent() {
        let b = booking();
        assert_eq!(b.counterparty(&b.customer), b.agent);
        assert_eq!(b.counterparty(&b.agent), b.customer);
        assert!(b.is_party(&b.customer));
        assert!(!b.is_party(&UserId::new()));
    }
}
