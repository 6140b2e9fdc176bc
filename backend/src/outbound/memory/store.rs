//! Canonical in-memory collections of users, gigs, and reviews.
//!
//! The store is a plain synchronous repository: it performs structural
//! mutations and existence checks only. Latency, authorization, and joins
//! belong to the facade that owns it.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;

use super::seed::{CatalogueError, SeedCatalogue};
use crate::domain::{
    Gig, GigCategory, GigId, GigListing, IdMinter, MessageId, NewGig, NewReview, Profile,
    ProfileUpdate, Review, ReviewId, User, UserId, UserName, UserRole, UserValidationError,
};

/// Users, gigs, and reviews owned by one marketplace instance.
#[derive(Debug)]
pub struct DomainStore {
    users: Vec<User>,
    gigs: Vec<Gig>,
    reviews: Vec<Review>,
    ids: IdMinter,
}

impl DomainStore {
    /// Empty store minting ids from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Vec::new(),
            gigs: Vec::new(),
            reviews: Vec::new(),
            ids: IdMinter::new(clock),
        }
    }

    /// Store preloaded with `catalogue`.
    pub fn with_catalogue(clock: Arc<dyn Clock>, catalogue: SeedCatalogue) -> Self {
        let SeedCatalogue {
            users,
            gigs,
            reviews,
        } = catalogue;
        Self {
            users,
            gigs,
            reviews,
            ids: IdMinter::new(clock),
        }
    }

    /// Store preloaded with the demonstration catalogue, using the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if the bundled catalogue fails to load.
    pub fn seeded() -> Result<Self, CatalogueError> {
        Ok(Self::with_catalogue(
            Arc::new(DefaultClock),
            SeedCatalogue::demo()?,
        ))
    }

    /// Look up a user.
    pub fn find_user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id() == user_id)
    }

    /// Look up a user by case-insensitive name and exact role.
    pub fn find_user_by_login(&self, name: &UserName, role: UserRole) -> Option<&User> {
        self.users
            .iter()
            .find(|user| user.role() == role && user.name().matches(name.as_ref()))
    }

    /// Look up a gig.
    pub fn find_gig(&self, gig_id: &GigId) -> Option<&Gig> {
        self.gigs.iter().find(|gig| gig.id == *gig_id)
    }

    /// Look up a review.
    pub fn find_review(&self, review_id: &ReviewId) -> Option<&Review> {
        self.reviews.iter().find(|review| review.id == *review_id)
    }

    /// Create a user with a fresh id and append it.
    ///
    /// New workers start with placeholder skills, portfolio, availability,
    /// and payment account.
    pub fn insert_user(&mut self, name: UserName, role: UserRole) -> User {
        let user = User::new(self.ids.user_id(), name, Profile::for_new_user(role));
        self.users.push(user.clone());
        user
    }

    /// Create a gig with a fresh id and put it at the front of the catalogue.
    pub fn insert_gig(&mut self, worker_id: UserId, new_gig: NewGig) -> Gig {
        let gig = Gig::from_new(self.ids.gig_id(), worker_id, new_gig);
        self.gigs.insert(0, gig.clone());
        gig
    }

    /// Create a review with a fresh id and append it.
    pub fn insert_review(
        &mut self,
        gig_id: GigId,
        reviewer_id: UserId,
        review: NewReview,
    ) -> Review {
        let review = Review::from_new(self.ids.review_id(), gig_id, reviewer_id, review);
        self.reviews.push(review.clone());
        review
    }

    /// Remove a gig, returning it. Removing an unknown id is a logged no-op.
    pub fn remove_gig(&mut self, gig_id: &GigId) -> Option<Gig> {
        let Some(position) = self.gigs.iter().position(|gig| gig.id == *gig_id) else {
            warn!(%gig_id, "gig not found for deletion");
            return None;
        };
        Some(self.gigs.remove(position))
    }

    /// Shallow-merge `update` into a user.
    ///
    /// Returns `Ok(None)` when the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError`] when the update does not fit the
    /// user's role; the stored user is left unchanged.
    pub fn update_user(
        &mut self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<Option<User>, UserValidationError> {
        let Some(user) = self.users.iter_mut().find(|user| user.id() == user_id) else {
            return Ok(None);
        };
        user.apply(update)?;
        Ok(Some(user.clone()))
    }

    /// Every gig, newest first.
    pub fn gigs(&self) -> &[Gig] {
        &self.gigs
    }

    /// Every gig joined with its worker, newest first.
    pub fn listings(&self) -> Vec<GigListing> {
        self.join(self.gigs.iter())
    }

    /// Gigs whose id is in `gig_ids`, in catalogue order, joined with workers.
    pub fn listings_by_ids(&self, gig_ids: &[GigId]) -> Vec<GigListing> {
        self.join(self.gigs.iter().filter(|gig| gig_ids.contains(&gig.id)))
    }

    /// Reviews of one gig, oldest first.
    pub fn reviews_for(&self, gig_id: &GigId) -> Vec<Review> {
        self.reviews
            .iter()
            .filter(|review| review.gig_id == *gig_id)
            .cloned()
            .collect()
    }

    /// Up to `limit` other gigs in `category`, joined with workers.
    pub fn similar_gigs(
        &self,
        gig_id: &GigId,
        category: GigCategory,
        limit: usize,
    ) -> Vec<GigListing> {
        self.join(
            self.gigs
                .iter()
                .filter(|gig| gig.id != *gig_id && gig.category == category)
                .take(limit),
        )
    }

    /// Favourite gig ids of a user; empty when the user is unknown.
    pub fn favorites(&self, user_id: &UserId) -> Vec<GigId> {
        self.find_user(user_id)
            .map(|user| user.favorites().as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Add a favourite. Returns `false` when the user is unknown.
    ///
    /// Adding a gig that is already a favourite leaves the set unchanged.
    pub fn add_favorite(&mut self, user_id: &UserId, gig_id: &GigId) -> bool {
        match self.user_mut(user_id) {
            Some(user) => {
                user.add_favorite(gig_id.clone());
                true
            }
            None => false,
        }
    }

    /// Remove a favourite. Returns `false` when the user is unknown.
    pub fn remove_favorite(&mut self, user_id: &UserId, gig_id: &GigId) -> bool {
        match self.user_mut(user_id) {
            Some(user) => {
                user.remove_favorite(gig_id);
                true
            }
            None => false,
        }
    }

    /// Mint an id for a chat message. Messages are not stored.
    pub fn mint_message_id(&self) -> MessageId {
        self.ids.message_id()
    }

    fn user_mut(&mut self, user_id: &UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id() == user_id)
    }

    fn join<'a>(&self, gigs: impl Iterator<Item = &'a Gig>) -> Vec<GigListing> {
        gigs.map(|gig| GigListing {
            gig: gig.clone(),
            worker: self.find_user(&gig.worker_id).cloned(),
        })
        .collect()
    }
}
