//! `MarketplaceApi` implementation over a process-local store.
//!
//! Every call first waits out its latency class, then takes the store lock,
//! acts, and releases it. The lock is never held across a suspension point,
//! so concurrent calls interleave only at their delays.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::latency::{LatencyProfile, LatencySleeper, TokioSleeper};
use super::payment::PaymentSimulator;
use super::seed::CatalogueError;
use super::store::DomainStore;
use crate::domain::chat::WORKER_ACKNOWLEDGEMENT;
use crate::domain::ports::{MarketplaceApi, MarketplaceApiError};
use crate::domain::{
    ChatMessage, ChatSender, Gig, GigCategory, GigId, GigListing, NewGig, NewReview,
    PaymentReceipt, ProfileUpdate, Review, User, UserId, UserName, UserRole,
};

/// Most similar gigs returned for one gig.
pub const SIMILAR_GIG_LIMIT: usize = 3;

/// Marketplace served from memory.
pub struct InMemoryMarketplace {
    store: Mutex<DomainStore>,
    sleeper: Arc<dyn LatencySleeper>,
    latency: LatencyProfile,
    payments: PaymentSimulator,
}

impl InMemoryMarketplace {
    /// Serve `store` with default latency, the Tokio sleeper, and the
    /// default payment success rate.
    pub fn new(store: DomainStore) -> Self {
        Self {
            store: Mutex::new(store),
            sleeper: Arc::new(TokioSleeper),
            latency: LatencyProfile::default(),
            payments: PaymentSimulator::default(),
        }
    }

    /// Serve the demonstration catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if the bundled catalogue fails to load.
    pub fn seeded() -> Result<Self, CatalogueError> {
        Ok(Self::new(DomainStore::seeded()?))
    }

    /// Replace the sleeper used for simulated delays.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn LatencySleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replace the latency profile.
    #[must_use]
    pub fn with_latency(mut self, latency: LatencyProfile) -> Self {
        self.latency = latency;
        self
    }

    /// Replace the payment simulator.
    #[must_use]
    pub fn with_payments(mut self, payments: PaymentSimulator) -> Self {
        self.payments = payments;
        self
    }

    async fn settle(&self, operation: &'static str, delay: Duration) {
        debug!(operation, ?delay, "marketplace call");
        self.sleeper.sleep(delay).await;
    }

    fn store(&self) -> MutexGuard<'_, DomainStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MarketplaceApi for InMemoryMarketplace {
    async fn login(&self, name: &UserName, role: UserRole) -> Result<User, MarketplaceApiError> {
        self.settle("login", self.latency.standard()).await;
        let mut store = self.store();
        if let Some(user) = store.find_user_by_login(name, role).cloned() {
            return Ok(user);
        }
        let user = store.insert_user(name.clone(), role);
        info!(user_id = %user.id(), ?role, "created user on first login");
        Ok(user)
    }

    async fn list_gigs(&self) -> Result<Vec<GigListing>, MarketplaceApiError> {
        self.settle("list_gigs", self.latency.standard()).await;
        Ok(self.store().listings())
    }

    async fn gig(&self, gig_id: &GigId) -> Result<Option<Gig>, MarketplaceApiError> {
        self.settle("gig", self.latency.standard()).await;
        Ok(self.store().find_gig(gig_id).cloned())
    }

    async fn gigs_by_ids(
        &self,
        gig_ids: &[GigId],
    ) -> Result<Vec<GigListing>, MarketplaceApiError> {
        self.settle("gigs_by_ids", self.latency.standard()).await;
        Ok(self.store().listings_by_ids(gig_ids))
    }

    async fn user(&self, user_id: &UserId) -> Result<Option<User>, MarketplaceApiError> {
        self.settle("user", self.latency.standard()).await;
        Ok(self.store().find_user(user_id).cloned())
    }

    async fn update_user(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, MarketplaceApiError> {
        self.settle("update_user", self.latency.standard()).await;
        self.store()
            .update_user(user_id, update)
            .map_err(|error| MarketplaceApiError::invalid_request(error.to_string()))?
            .ok_or_else(|| MarketplaceApiError::not_found(format!("user {user_id}")))
    }

    async fn reviews_for_gig(&self, gig_id: &GigId) -> Result<Vec<Review>, MarketplaceApiError> {
        self.settle("reviews_for_gig", self.latency.standard()).await;
        Ok(self.store().reviews_for(gig_id))
    }

    async fn similar_gigs(
        &self,
        gig_id: &GigId,
        category: GigCategory,
    ) -> Result<Vec<GigListing>, MarketplaceApiError> {
        self.settle("similar_gigs", self.latency.standard()).await;
        Ok(self
            .store()
            .similar_gigs(gig_id, category, SIMILAR_GIG_LIMIT))
    }

    async fn post_message(
        &self,
        gig_id: &GigId,
        text: &str,
    ) -> Result<ChatMessage, MarketplaceApiError> {
        self.settle("post_message", self.latency.quick()).await;
        debug!(%gig_id, "customer message posted");
        Ok(ChatMessage {
            id: self.store().mint_message_id(),
            sender: ChatSender::Customer,
            text: text.to_owned(),
        })
    }

    async fn worker_reply(
        &self,
        gig_id: &GigId,
        _customer_text: &str,
    ) -> Result<ChatMessage, MarketplaceApiError> {
        self.settle("worker_reply", self.latency.reply()).await;
        debug!(%gig_id, "worker reply sent");
        Ok(ChatMessage {
            id: self.store().mint_message_id(),
            sender: ChatSender::Worker,
            text: WORKER_ACKNOWLEDGEMENT.to_owned(),
        })
    }

    async fn process_payment(&self, gig_id: &GigId) -> Result<PaymentReceipt, MarketplaceApiError> {
        self.settle("process_payment", self.latency.payment()).await;
        let success = self.payments.charge();
        info!(%gig_id, success, "payment processed");
        Ok(PaymentReceipt { success })
    }

    async fn create_gig(
        &self,
        worker_id: &UserId,
        new_gig: NewGig,
    ) -> Result<Gig, MarketplaceApiError> {
        self.settle("create_gig", self.latency.standard()).await;
        new_gig
            .validate()
            .map_err(|error| MarketplaceApiError::invalid_request(error.to_string()))?;
        let gig = self.store().insert_gig(worker_id.clone(), new_gig);
        info!(gig_id = %gig.id, %worker_id, "gig created");
        Ok(gig)
    }

    async fn create_review(
        &self,
        gig_id: &GigId,
        review: NewReview,
        reviewer_id: &UserId,
    ) -> Result<Review, MarketplaceApiError> {
        self.settle("create_review", self.latency.standard()).await;
        let review = self
            .store()
            .insert_review(gig_id.clone(), reviewer_id.clone(), review);
        info!(review_id = %review.id, %gig_id, "review created");
        Ok(review)
    }

    async fn delete_gig(
        &self,
        gig_id: &GigId,
        requester: &UserId,
    ) -> Result<(), MarketplaceApiError> {
        self.settle("delete_gig", self.latency.standard()).await;
        let mut store = self.store();
        let Some(owner) = store.find_gig(gig_id).map(|gig| gig.worker_id.clone()) else {
            warn!(%gig_id, "gig not found for deletion");
            return Ok(());
        };
        if owner != *requester {
            return Err(MarketplaceApiError::forbidden(format!(
                "{requester} does not own {gig_id}"
            )));
        }
        store.remove_gig(gig_id);
        info!(%gig_id, "gig deleted");
        Ok(())
    }

    async fn favorites(&self, user_id: &UserId) -> Result<Vec<GigId>, MarketplaceApiError> {
        self.settle("favorites", self.latency.quick()).await;
        Ok(self.store().favorites(user_id))
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        gig_id: &GigId,
    ) -> Result<bool, MarketplaceApiError> {
        self.settle("add_favorite", self.latency.quick()).await;
        Ok(self.store().add_favorite(user_id, gig_id))
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        gig_id: &GigId,
    ) -> Result<bool, MarketplaceApiError> {
        self.settle("remove_favorite", self.latency.quick()).await;
        Ok(self.store().remove_favorite(user_id, gig_id))
    }
}

#[cfg(test)]
mod tests {
    //! Facade behaviour over the demonstration catalogue.
    use super::*;
    use crate::domain::{Price, StarRating};
    use crate::test_support::{ImmediateSleeper, RecordingSleeper};
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    #[fixture]
    fn marketplace() -> InMemoryMarketplace {
        InMemoryMarketplace::seeded()
            .expect("bundled catalogue parses")
            .with_sleeper(Arc::new(ImmediateSleeper))
    }

    fn gig_id(raw: &str) -> GigId {
        GigId::new(raw).expect("valid gig id")
    }

    fn user_id(raw: &str) -> UserId {
        UserId::new(raw).expect("valid user id")
    }

    fn name(raw: &str) -> UserName {
        UserName::new(raw).expect("valid name")
    }

    fn new_gig(title: &str) -> NewGig {
        NewGig {
            title: title.to_owned(),
            category: GigCategory::Delivery,
            price: Price::new(dec!(15)).expect("valid price"),
            description: "Same-day delivery across Port-au-Prince".to_owned(),
            eta: "20 mins".to_owned(),
            distance: "1km away".to_owned(),
            image: "https://picsum.photos/seed/delivery/400/300".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn login_finds_existing_user_ignoring_case(marketplace: InMemoryMarketplace) {
        let user = marketplace
            .login(&name("SAMUEL"), UserRole::Customer)
            .await
            .expect("login succeeds");
        assert_eq!(user.id().as_str(), "user-3");
    }

    #[rstest]
    #[tokio::test]
    async fn login_creates_and_persists_unknown_users(marketplace: InMemoryMarketplace) {
        let created = marketplace
            .login(&name("Samuel"), UserRole::Worker)
            .await
            .expect("login succeeds");
        assert_ne!(created.id().as_str(), "user-3");
        assert!(created.profile().worker().is_some());

        let again = marketplace
            .login(&name("samuel"), UserRole::Worker)
            .await
            .expect("login succeeds");
        assert_eq!(again.id(), created.id());
        assert_eq!(
            marketplace.user(created.id()).await.expect("lookup"),
            Some(created)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn update_user_reports_missing_and_invalid(marketplace: InMemoryMarketplace) {
        let missing = marketplace
            .update_user(&user_id("user-404"), ProfileUpdate::default())
            .await;
        assert!(matches!(missing, Err(MarketplaceApiError::NotFound { .. })));

        let update = ProfileUpdate {
            worker: Some(crate::domain::WorkerProfileUpdate::default()),
            ..ProfileUpdate::default()
        };
        let invalid = marketplace.update_user(&user_id("user-3"), update).await;
        assert!(matches!(
            invalid,
            Err(MarketplaceApiError::InvalidRequest { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn created_gigs_lead_the_listing(marketplace: InMemoryMarketplace) {
        let worker = user_id("user-2");
        let gig = marketplace
            .create_gig(&worker, new_gig("Courier"))
            .await
            .expect("gig created");

        let listings = marketplace.list_gigs().await.expect("listing");
        assert_eq!(listings.len(), 5);
        assert_eq!(listings[0].gig, gig);
        let joined = listings[0].worker.as_ref().expect("worker joined");
        assert_eq!(joined.id(), &worker);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_titles_are_rejected(marketplace: InMemoryMarketplace) {
        let result = marketplace
            .create_gig(&user_id("user-2"), new_gig("   "))
            .await;
        assert!(matches!(
            result,
            Err(MarketplaceApiError::InvalidRequest { .. })
        ));
        assert_eq!(marketplace.list_gigs().await.expect("listing").len(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn reviews_append_to_their_gig(marketplace: InMemoryMarketplace) {
        let review = marketplace
            .create_review(
                &gig_id("gig-3"),
                NewReview {
                    rating: StarRating::new(5).expect("valid stars"),
                    comment: "Beautiful finish".to_owned(),
                    image_url: None,
                },
                &user_id("user-3"),
            )
            .await
            .expect("review created");
        let reviews = marketplace
            .reviews_for_gig(&gig_id("gig-3"))
            .await
            .expect("reviews");
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews.last(), Some(&review));
    }

    #[rstest]
    #[tokio::test]
    async fn only_the_owner_may_delete(marketplace: InMemoryMarketplace) {
        let result = marketplace
            .delete_gig(&gig_id("gig-1"), &user_id("user-2"))
            .await;
        assert!(matches!(result, Err(MarketplaceApiError::Forbidden { .. })));
        assert!(marketplace.gig(&gig_id("gig-1")).await.expect("lookup").is_some());

        marketplace
            .delete_gig(&gig_id("gig-1"), &user_id("user-1"))
            .await
            .expect("owner deletes");
        assert!(marketplace.gig(&gig_id("gig-1")).await.expect("lookup").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_unknown_gig_succeeds(marketplace: InMemoryMarketplace) {
        marketplace
            .delete_gig(&gig_id("gig-404"), &user_id("user-1"))
            .await
            .expect("no-op delete");
        assert_eq!(marketplace.list_gigs().await.expect("listing").len(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn similar_gigs_are_capped(marketplace: InMemoryMarketplace) {
        for title in ["Courier", "Groceries", "Parcels", "Documents"] {
            marketplace
                .create_gig(&user_id("user-1"), new_gig(title))
                .await
                .expect("gig created");
        }
        let listings = marketplace.list_gigs().await.expect("listing");
        let reference = &listings[0].gig;
        let similar = marketplace
            .similar_gigs(&reference.id, GigCategory::Delivery)
            .await
            .expect("similar");
        assert_eq!(similar.len(), SIMILAR_GIG_LIMIT);
        assert!(similar.iter().all(|listing| listing.gig.id != reference.id));
    }

    #[rstest]
    #[tokio::test]
    async fn chat_echoes_then_acknowledges(marketplace: InMemoryMarketplace) {
        let posted = marketplace
            .post_message(&gig_id("gig-1"), "Are you free today?")
            .await
            .expect("posted");
        assert_eq!(posted.sender, ChatSender::Customer);
        assert_eq!(posted.text, "Are you free today?");
        assert!(posted.id.as_str().starts_with("msg-"));

        let reply = marketplace
            .worker_reply(&gig_id("gig-1"), "Are you free today?")
            .await
            .expect("reply");
        assert_eq!(reply.sender, ChatSender::Worker);
        assert_eq!(reply.text, WORKER_ACKNOWLEDGEMENT);
        assert_ne!(reply.id, posted.id);
    }

    #[rstest]
    #[case(0, false)]
    #[case(100, true)]
    #[tokio::test]
    async fn payment_outcome_follows_success_rate(
        marketplace: InMemoryMarketplace,
        #[case] percent: u8,
        #[case] expected: bool,
    ) {
        let marketplace = marketplace.with_payments(PaymentSimulator::new(percent, Some(1)));
        for _ in 0..5 {
            let receipt = marketplace
                .process_payment(&gig_id("gig-2"))
                .await
                .expect("payment call");
            assert_eq!(receipt.success, expected);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn favourite_writes_report_unknown_users(marketplace: InMemoryMarketplace) {
        let samuel = user_id("user-3");
        assert!(
            marketplace
                .add_favorite(&samuel, &gig_id("gig-2"))
                .await
                .expect("add")
        );
        assert_eq!(
            marketplace.favorites(&samuel).await.expect("favourites"),
            vec![gig_id("gig-2")]
        );
        assert!(
            !marketplace
                .add_favorite(&user_id("user-404"), &gig_id("gig-2"))
                .await
                .expect("add")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn operations_use_their_latency_class() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let marketplace = InMemoryMarketplace::seeded()
            .expect("bundled catalogue parses")
            .with_sleeper(sleeper.clone())
            .with_latency(LatencyProfile::new(Duration::from_millis(100)));
        let gig = gig_id("gig-1");
        let samuel = user_id("user-3");

        marketplace.list_gigs().await.expect("listing");
        marketplace.favorites(&samuel).await.expect("favourites");
        marketplace.post_message(&gig, "hi").await.expect("post");
        marketplace.worker_reply(&gig, "hi").await.expect("reply");
        marketplace.process_payment(&gig).await.expect("payment");

        let millis: Vec<u128> = sleeper
            .recorded()
            .iter()
            .map(Duration::as_millis)
            .collect();
        assert_eq!(millis, vec![100, 50, 50, 200, 400]);
    }
}
