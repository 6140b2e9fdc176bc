//! Gig listings offered by workers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{GigId, User, UserId};

/// Validation errors for gig values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GigValidationError {
    /// Prices cannot be negative.
    NegativePrice,
    /// A required text field was blank.
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The category name is not one of the fixed set.
    UnknownCategory(String),
}

impl fmt::Display for GigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativePrice => write!(f, "price must not be negative"),
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::UnknownCategory(raw) => write!(f, "unknown gig category: {raw}"),
        }
    }
}

impl std::error::Error for GigValidationError {}

/// Fixed set of service categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GigCategory {
    /// Plumbing, electrical, painting.
    #[serde(rename = "Home Repair")]
    HomeRepair,
    /// House cleaning.
    Cleaning,
    /// Cooking and catering.
    Cooking,
    /// Child care.
    #[serde(rename = "Child Care")]
    ChildCare,
    /// Deliveries and errands.
    Delivery,
    /// Lessons and tutoring.
    Tutoring,
}

impl GigCategory {
    /// Every category in display order.
    pub const ALL: [Self; 6] = [
        Self::HomeRepair,
        Self::Cleaning,
        Self::Cooking,
        Self::ChildCare,
        Self::Delivery,
        Self::Tutoring,
    ];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::HomeRepair => "Home Repair",
            Self::Cleaning => "Cleaning",
            Self::Cooking => "Cooking",
            Self::ChildCare => "Child Care",
            Self::Delivery => "Delivery",
            Self::Tutoring => "Tutoring",
        }
    }
}

impl fmt::Display for GigCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GigCategory {
    type Err = GigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GigValidationError::UnknownCategory(s.to_owned()))
    }
}

/// Non-negative listing price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Validate and construct a [`Price`].
    ///
    /// # Errors
    ///
    /// Returns [`GigValidationError::NegativePrice`] for negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, GigValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(GigValidationError::NegativePrice);
        }
        Ok(Self(amount))
    }

    /// The underlying amount.
    pub fn amount(self) -> Decimal {
        self.0
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = GigValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Listing content supplied by a worker; ids are assigned on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGig {
    /// Listing headline.
    pub title: String,
    /// Service category.
    pub category: GigCategory,
    /// Asking price.
    pub price: Price,
    /// Long-form description.
    pub description: String,
    /// Estimated arrival time, e.g. `30 mins`.
    pub eta: String,
    /// Distance label, e.g. `2km away`.
    pub distance: String,
    /// Cover image reference.
    pub image: String,
}

impl NewGig {
    /// Check that the text fields a listing cannot render without are filled.
    ///
    /// # Errors
    ///
    /// Returns [`GigValidationError::EmptyField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), GigValidationError> {
        for (field, value) in [("title", &self.title), ("description", &self.description)] {
            if value.trim().is_empty() {
                return Err(GigValidationError::EmptyField { field });
            }
        }
        Ok(())
    }
}

/// A service listing.
///
/// `worker_id` is a reference, not ownership: a gig whose worker no longer
/// exists is still a valid record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    /// Stable identifier.
    pub id: GigId,
    /// Worker offering the gig.
    pub worker_id: UserId,
    /// Listing headline.
    pub title: String,
    /// Service category.
    pub category: GigCategory,
    /// Asking price.
    pub price: Price,
    /// Long-form description.
    pub description: String,
    /// Estimated arrival time.
    pub eta: String,
    /// Distance label.
    pub distance: String,
    /// Cover image reference.
    pub image: String,
}

impl Gig {
    /// Assemble a gig from its assigned ids and the submitted content.
    pub fn from_new(id: GigId, worker_id: UserId, new_gig: NewGig) -> Self {
        let NewGig {
            title,
            category,
            price,
            description,
            eta,
            distance,
            image,
        } = new_gig;
        Self {
            id,
            worker_id,
            title,
            category,
            price,
            description,
            eta,
            distance,
            image,
        }
    }
}

/// Read-time projection of a gig joined with its worker.
///
/// The worker snapshot is informational; the authoritative link is
/// `gig.worker_id`. `worker` is `None` when the reference dangles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigListing {
    /// The listing.
    #[serde(flatten)]
    pub gig: Gig,
    /// Snapshot of the offering worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<User>,
}
