//! BookingStatus enum and its transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a booking.
///
/// The wire format uses kebab-case (`in-progress`) to match the mobile
/// clients' existing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
}

impl StateMachine for BookingStatus {
    /// Valid transitions:
    /// - Pending -> Accepted | Rejected
    /// - Accepted -> InProgress | Cancelled
    /// - InProgress -> Completed | Cancelled
    ///
    /// Rejected, Completed and Cancelled are terminal.
    fn can_transition_to(&self, target: &Self) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Accepted, InProgress)
                | (Accepted, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use BookingStatus::*;
        match self {
            Pending => vec![Accepted, Rejected],
            Accepted => vec![InProgress, Cancelled],
            InProgress => vec![Completed, Cancelled],
            Rejected | Completed | Cancelled => vec![],
        }
    }
}

impl BookingStatus {
    /// Returns every status value, for exhaustive checks.
    pub fn all() -> [BookingStatus; 6] {
        use BookingStatus::*;
        [Pending, Accepted, Rejected, InProgress, Completed, Cancelled]
    }

    /// Returns true if feedback may be attached in this status.
    pub fn accepts_feedback(&self) -> bool {
        matches!(self, BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "rejected" => Ok(BookingStatus::Rejected),
            "in-progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    }

    #[test]
    fn pending_branches_to_accepted_or_rejected() {
        assert!(BookingStatus::Pending.can_transition_to(&BookingStatus::Accepted));
        assert!(BookingStatus::Pending.can_transition_to(&BookingStatus::Rejected));
        assert!(!BookingStatus::Pending.can_transition_to(&BookingStatus::Completed));
        assert!(!BookingStatus::Pending.can_transition_to(&BookingStatus::InProgress));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for terminal in [
            BookingStatus::Rejected,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            for target in BookingStatus::all() {
                assert!(!terminal.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn self_transitions_are_never_valid() {
        for status in BookingStatus::all() {
            assert!(!status.can_transition_to(&status));
        }
    }

    #[test]
    fn completed_cannot_be_reopened() {
        assert!(!BookingStatus::Completed.can_transition_to(&BookingStatus::Accepted));
        assert!(!BookingStatus::Completed.can_transition_to(&BookingStatus::Pending));
    }

    #[test]
    fn only_completed_accepts_feedback() {
        for status in BookingStatus::all() {
            assert_eq!(
                status.accepts_feedback(),
                status == BookingStatus::Completed
            );
        }
    }

    #[test]
    fn wire_format_is_kebab_case() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: BookingStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(back, BookingStatus::InProgress);
    }

    #[test]
    fn from_str_rejects_unknown_status() {
        assert!("done".parse::<BookingStatus>().is_err());
    }
}
