//! Customer reviews of gigs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{GigId, ReviewId, UserId};

/// Validation errors for review values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    /// Star ratings must be between one and five.
    StarsOutOfRange(u8),
}

impl fmt::Display for ReviewValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StarsOutOfRange(stars) => {
                write!(f, "review rating must be between 1 and 5, got {stars}")
            }
        }
    }
}

impl std::error::Error for ReviewValidationError {}

/// Whole-star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
    /// Validate and construct a [`StarRating`].
    ///
    /// # Errors
    ///
    /// Returns [`ReviewValidationError::StarsOutOfRange`] outside `1..=5`.
    pub fn new(stars: u8) -> Result<Self, ReviewValidationError> {
        if (1..=5).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ReviewValidationError::StarsOutOfRange(stars))
        }
    }

    /// Number of stars.
    pub fn stars(self) -> u8 {
        self.0
    }
}

impl From<StarRating> for u8 {
    fn from(value: StarRating) -> Self {
        value.0
    }
}

impl TryFrom<u8> for StarRating {
    type Error = ReviewValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Review content submitted by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Star rating.
    pub rating: StarRating,
    /// Free-text comment.
    pub comment: String,
    /// Optional photo reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A stored review. Reviews are never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Stable identifier.
    pub id: ReviewId,
    /// Reviewed gig.
    pub gig_id: GigId,
    /// Author of the review.
    pub reviewer_id: UserId,
    /// Star rating.
    pub rating: StarRating,
    /// Free-text comment.
    pub comment: String,
    /// Optional photo reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Review {
    /// Assemble a review from assigned ids and submitted content.
    pub fn from_new(id: ReviewId, gig_id: GigId, reviewer_id: UserId, review: NewReview) -> Self {
        let NewReview {
            rating,
            comment,
            image_url,
        } = review;
        Self {
            id,
            gig_id,
            reviewer_id,
            rating,
            comment,
            image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for review values.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn star_rating_bounds(#[case] stars: u8, #[case] valid: bool) {
        assert_eq!(StarRating::new(stars).is_ok(), valid);
    }

    #[rstest]
    fn out_of_range_payload_fails_to_deserialise() {
        let result = serde_json::from_str::<NewReview>(r#"{"rating":9,"comment":"great"}"#);
        assert!(result.is_err());
    }
}
