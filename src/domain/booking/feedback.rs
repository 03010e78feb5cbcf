//! Feedback value objects for completed bookings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Star rating from 1 (worst) to 5 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Creates a Rating from an integer, returning error if out of range.
    pub fn try_from_u8(value: u8) -> Result<Self, ValidationError> {
        if (1..=5).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(ValidationError::out_of_range("rating", 1, 5, value as i32))
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Customer feedback attached to a completed booking, at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: Rating,
    pub comment: Option<String>,
}

impl Feedback {
    /// Creates feedback, validating the rating range.
    pub fn new(rating: u8, comment: Option<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            rating: Rating::try_from_u8(rating)?,
            comment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_accepts_one_through_five() {
        for v in 1..=5 {
            assert_eq!(Rating::try_from_u8(v).unwrap().value(), v);
        }
    }

    #[test]
    fn rating_rejects_zero_and_six() {
        assert!(Rating::try_from_u8(0).is_err());
        assert!(Rating::try_from_u8(6).is_err());
    }

    #[test]
    fn feedback_carries_optional_comment() {
        let fb = Feedback::new(4, Some("quick and tidy".to_string())).unwrap();
        assert_eq!(fb.rating.value(), 4);
        assert_eq!(fb.comment.as_deref(), Some("quick and tidy"));

        let bare = Feedback::new(5, None).unwrap();
        assert!(bare.comment.is_none());
    }

    #[test]
    fn feedback_propagates_rating_validation() {
        assert!(Feedback::new(9, None).is_err());
    }
}
