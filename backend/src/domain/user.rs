//! Marketplace user model.
//!
//! A user is either a customer or a worker. Worker-only attributes live in
//! [`WorkerProfile`] so a customer record can never carry them.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{FavoriteSet, GigId, UserId};

/// Validation errors returned by user value constructors and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The user name was blank.
    EmptyName,
    /// The aggregate rating fell outside `0..=5`.
    RatingOutOfRange,
    /// Worker attributes were supplied for a customer.
    WorkerFieldsOnCustomer,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::RatingOutOfRange => write!(f, "rating must be between 0 and 5"),
            Self::WorkerFieldsOnCustomer => {
                write!(f, "worker attributes cannot be set on a customer")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Role a user plays in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Books gigs and leaves reviews.
    Customer,
    /// Lists gigs and uses the assistive tools.
    Worker,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => f.write_str("CUSTOMER"),
            Self::Worker => f.write_str("WORKER"),
        }
    }
}

/// Name shown on listings, reviews, and the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::EmptyName`] for blank input.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self(name))
    }

    /// Case-insensitive comparison used when resolving logins.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.to_lowercase() == candidate.to_lowercase()
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Aggregate star rating in the inclusive range `0..=5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rating(Decimal);

impl Rating {
    /// Validate and construct a [`Rating`].
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::RatingOutOfRange`] outside `0..=5`.
    pub fn new(value: Decimal) -> Result<Self, UserValidationError> {
        if value < Decimal::ZERO || value > Decimal::from(5) {
            return Err(UserValidationError::RatingOutOfRange);
        }
        Ok(Self(value))
    }

    /// The underlying value.
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl From<Rating> for Decimal {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl TryFrom<Decimal> for Rating {
    type Error = UserValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Attributes only a worker carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    /// Advertised skills.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Portfolio image references in display order.
    #[serde(default)]
    pub portfolio_images: Vec<String>,
    /// Free-text availability, e.g. `Mon - Fri, 9am - 5pm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availabilities: Option<String>,
    /// Mobile payment account receiving booking payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moncash_id: Option<String>,
}

impl WorkerProfile {
    /// Starter attributes given to a worker created on first login.
    pub fn placeholder() -> Self {
        Self {
            skills: vec!["New Skill 1".to_owned(), "New Skill 2".to_owned()],
            portfolio_images: vec!["https://picsum.photos/seed/newwork1/400/300".to_owned()],
            availabilities: Some("Mon - Fri, 9am - 5pm".to_owned()),
            moncash_id: Some("509-zz-zzzz".to_owned()),
        }
    }

    fn apply(&mut self, update: WorkerProfileUpdate) {
        let WorkerProfileUpdate {
            skills,
            portfolio_images,
            availabilities,
            moncash_id,
        } = update;
        if let Some(skills) = skills {
            self.skills = skills;
        }
        if let Some(portfolio_images) = portfolio_images {
            self.portfolio_images = portfolio_images;
        }
        if let Some(availabilities) = availabilities {
            self.availabilities = Some(availabilities);
        }
        if let Some(moncash_id) = moncash_id {
            self.moncash_id = Some(moncash_id);
        }
    }
}

/// Role-specific part of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profile {
    /// A customer has no role-specific attributes.
    Customer,
    /// A worker and their public attributes.
    Worker(WorkerProfile),
}

impl Profile {
    /// Default profile for a user created on first login.
    pub fn for_new_user(role: UserRole) -> Self {
        match role {
            UserRole::Customer => Self::Customer,
            UserRole::Worker => Self::Worker(WorkerProfile::placeholder()),
        }
    }

    /// Role implied by the profile variant.
    pub fn role(&self) -> UserRole {
        match self {
            Self::Customer => UserRole::Customer,
            Self::Worker(_) => UserRole::Worker,
        }
    }

    /// Worker attributes, when this is a worker.
    pub fn worker(&self) -> Option<&WorkerProfile> {
        match self {
            Self::Customer => None,
            Self::Worker(profile) => Some(profile),
        }
    }
}

/// Partial worker attribute update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfileUpdate {
    /// Replacement skill list.
    pub skills: Option<Vec<String>>,
    /// Replacement portfolio.
    pub portfolio_images: Option<Vec<String>>,
    /// Replacement availability text.
    pub availabilities: Option<String>,
    /// Replacement payment account.
    pub moncash_id: Option<String>,
}

/// Partial profile edit shallow-merged into an existing user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// Replacement display name.
    pub name: Option<UserName>,
    /// Replacement avatar reference.
    pub avatar: Option<String>,
    /// Worker-only attribute changes.
    pub worker: Option<WorkerProfileUpdate>,
}

/// Marketplace user.
///
/// ## Invariants
/// - `favorites` never holds the same gig twice.
/// - Worker attributes exist only when `profile` is [`Profile::Worker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: UserName,
    avatar: String,
    #[serde(default)]
    rating: Rating,
    #[serde(default)]
    reviews_count: u32,
    #[serde(flatten)]
    profile: Profile,
    #[serde(default)]
    favorites: FavoriteSet,
}

impl User {
    /// Build a user with an avatar derived from the name, no reviews, and no
    /// favourites.
    pub fn new(id: UserId, name: UserName, profile: Profile) -> Self {
        let avatar = format!("https://picsum.photos/seed/{name}/200/200");
        Self {
            id,
            name,
            avatar,
            rating: Rating::default(),
            reviews_count: 0,
            profile,
            favorites: FavoriteSet::new(),
        }
    }

    /// Replace the avatar reference.
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    /// Replace the review aggregate.
    #[must_use]
    pub fn with_reviews(mut self, rating: Rating, reviews_count: u32) -> Self {
        self.rating = rating;
        self.reviews_count = reviews_count;
        self
    }

    /// Replace the favourite set.
    #[must_use]
    pub fn with_favorites(mut self, favorites: FavoriteSet) -> Self {
        self.favorites = favorites;
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Avatar reference.
    pub fn avatar(&self) -> &str {
        self.avatar.as_str()
    }

    /// Aggregate rating.
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Number of reviews behind the aggregate rating.
    pub fn reviews_count(&self) -> u32 {
        self.reviews_count
    }

    /// Role-specific attributes.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Role implied by the profile.
    pub fn role(&self) -> UserRole {
        self.profile.role()
    }

    /// Favourite gig ids.
    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    /// Mark `gig_id` as a favourite. Returns `false` when already present.
    pub fn add_favorite(&mut self, gig_id: GigId) -> bool {
        self.favorites.insert(gig_id)
    }

    /// Unmark `gig_id`. Returns `false` when it was not a favourite.
    pub fn remove_favorite(&mut self, gig_id: &GigId) -> bool {
        self.favorites.remove(gig_id)
    }

    /// Shallow-merge a profile edit.
    ///
    /// The update is validated before anything changes, so a rejected update
    /// leaves the user untouched.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::WorkerFieldsOnCustomer`] when worker
    /// attributes target a customer.
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<(), UserValidationError> {
        let ProfileUpdate {
            name,
            avatar,
            worker,
        } = update;

        match (&mut self.profile, worker) {
            (Profile::Customer, Some(_)) => {
                return Err(UserValidationError::WorkerFieldsOnCustomer);
            }
            (Profile::Worker(profile), Some(worker_update)) => profile.apply(worker_update),
            (_, None) => {}
        }

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(avatar) = avatar {
            self.avatar = avatar;
        }
        Ok(())
    }
}
