//! Driven port for the marketplace's remote boundary.
//!
//! Every operation is request/response. Lookups that find nothing resolve to
//! `Ok(None)` or an empty list; an `Err` means the call itself failed.
//! Adapters mutate their backing store in place with no transaction
//! boundary, so undoing an optimistic local change is the caller's job.

use async_trait::async_trait;

use crate::domain::{
    ChatMessage, Error, Gig, GigCategory, GigId, GigListing, NewGig, NewReview, PaymentReceipt,
    ProfileUpdate, Review, User, UserId, UserName, UserRole,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by marketplace adapters.
    pub enum MarketplaceApiError {
        /// The remote boundary could not be reached or timed out.
        Unavailable { message: String } => "marketplace unavailable: {message}",
        /// A write targeted a record that does not exist.
        NotFound { message: String } => "marketplace record not found: {message}",
        /// The caller may not perform the operation.
        Forbidden { message: String } => "marketplace operation forbidden: {message}",
        /// The payload was rejected.
        InvalidRequest { message: String } => "marketplace request rejected: {message}",
    }
}

impl From<MarketplaceApiError> for Error {
    fn from(error: MarketplaceApiError) -> Self {
        let message = error.to_string();
        match error {
            MarketplaceApiError::Unavailable { .. } => Error::service_unavailable(message),
            MarketplaceApiError::NotFound { .. } => Error::not_found(message),
            MarketplaceApiError::Forbidden { .. } => Error::forbidden(message),
            MarketplaceApiError::InvalidRequest { .. } => Error::invalid_request(message),
        }
    }
}

/// Asynchronous marketplace operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Resolve the user with this name and role, creating one when unknown.
    async fn login(&self, name: &UserName, role: UserRole) -> Result<User, MarketplaceApiError>;

    /// Every gig, newest first, joined with its worker.
    async fn list_gigs(&self) -> Result<Vec<GigListing>, MarketplaceApiError>;

    /// Look up one gig.
    async fn gig(&self, gig_id: &GigId) -> Result<Option<Gig>, MarketplaceApiError>;

    /// Gigs whose id is in `gig_ids`, in catalogue order, joined with workers.
    async fn gigs_by_ids(&self, gig_ids: &[GigId])
    -> Result<Vec<GigListing>, MarketplaceApiError>;

    /// Look up one user.
    async fn user(&self, user_id: &UserId) -> Result<Option<User>, MarketplaceApiError>;

    /// Shallow-merge a profile edit and return the updated user.
    async fn update_user(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, MarketplaceApiError>;

    /// Reviews left on a gig, oldest first.
    async fn reviews_for_gig(&self, gig_id: &GigId) -> Result<Vec<Review>, MarketplaceApiError>;

    /// Up to three other gigs in `category`.
    async fn similar_gigs(
        &self,
        gig_id: &GigId,
        category: GigCategory,
    ) -> Result<Vec<GigListing>, MarketplaceApiError>;

    /// Record a customer chat message about a gig.
    async fn post_message(
        &self,
        gig_id: &GigId,
        text: &str,
    ) -> Result<ChatMessage, MarketplaceApiError>;

    /// The worker's reply to a customer message.
    async fn worker_reply(
        &self,
        gig_id: &GigId,
        customer_text: &str,
    ) -> Result<ChatMessage, MarketplaceApiError>;

    /// Attempt payment for a booking.
    async fn process_payment(&self, gig_id: &GigId) -> Result<PaymentReceipt, MarketplaceApiError>;

    /// Publish a new gig owned by `worker_id`.
    async fn create_gig(
        &self,
        worker_id: &UserId,
        new_gig: NewGig,
    ) -> Result<Gig, MarketplaceApiError>;

    /// Store a review of `gig_id` written by `reviewer_id`.
    async fn create_review(
        &self,
        gig_id: &GigId,
        review: NewReview,
        reviewer_id: &UserId,
    ) -> Result<Review, MarketplaceApiError>;

    /// Delete a gig on behalf of `requester`.
    ///
    /// Deleting an id that does not exist succeeds without effect.
    async fn delete_gig(&self, gig_id: &GigId, requester: &UserId)
    -> Result<(), MarketplaceApiError>;

    /// Favourite gig ids of a user; empty for unknown users.
    async fn favorites(&self, user_id: &UserId) -> Result<Vec<GigId>, MarketplaceApiError>;

    /// Add a favourite. Adding an existing favourite is a no-op.
    async fn add_favorite(
        &self,
        user_id: &UserId,
        gig_id: &GigId,
    ) -> Result<bool, MarketplaceApiError>;

    /// Remove a favourite. Removing a missing favourite is a no-op.
    async fn remove_favorite(
        &self,
        user_id: &UserId,
        gig_id: &GigId,
    ) -> Result<bool, MarketplaceApiError>;
}

#[cfg(test)]
mod tests {
    //! Checks adapter errors map onto stable domain codes.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(MarketplaceApiError::unavailable("timeout"), ErrorCode::ServiceUnavailable)]
    #[case(MarketplaceApiError::not_found("user-9"), ErrorCode::NotFound)]
    #[case(MarketplaceApiError::forbidden("not owner"), ErrorCode::Forbidden)]
    #[case(MarketplaceApiError::invalid_request("blank title"), ErrorCode::InvalidRequest)]
    fn api_errors_map_to_domain_codes(
        #[case] error: MarketplaceApiError,
        #[case] expected: ErrorCode,
    ) {
        let mapped: Error = error.into();
        assert_eq!(mapped.code(), expected);
    }

    #[rstest]
    fn api_error_messages_include_context() {
        let error = MarketplaceApiError::forbidden("user-3 does not own gig-1");
        assert_eq!(
            error.to_string(),
            "marketplace operation forbidden: user-3 does not own gig-1"
        );
    }
}
