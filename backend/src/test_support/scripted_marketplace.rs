//! Marketplace double whose favourite calls can be held and released.
//!
//! Only the favourites operations are scripted; every other call fails with
//! [`MarketplaceApiError::Unavailable`]. When holding is enabled each
//! favourites call parks until the test releases it, which lets tests pick
//! the order in which concurrent calls resolve.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{Notify, oneshot};

use crate::domain::ports::{MarketplaceApi, MarketplaceApiError};
use crate::domain::{
    ChatMessage, FavoriteSet, Gig, GigCategory, GigId, GigListing, NewGig, NewReview,
    PaymentReceipt, ProfileUpdate, Review, User, UserId, UserName, UserRole,
};

/// A favourites call parked by [`ScriptedMarketplace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeldCall {
    /// `favorites(user)`.
    Load(UserId),
    /// `add_favorite(user, gig)`.
    Add(UserId, GigId),
    /// `remove_favorite(user, gig)`.
    Remove(UserId, GigId),
}

/// How a held call resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Resolve normally against the scripted server state.
    Succeed,
    /// Reject with [`MarketplaceApiError::Unavailable`].
    Fail,
}

struct Parked {
    call: HeldCall,
    release: oneshot::Sender<Release>,
}

/// Scripted favourites backend.
#[derive(Default)]
pub struct ScriptedMarketplace {
    server: Mutex<HashMap<UserId, FavoriteSet>>,
    failing: Mutex<HashSet<GigId>>,
    holding: AtomicBool,
    parked: Mutex<Vec<Parked>>,
    arrivals: Notify,
}

impl ScriptedMarketplace {
    /// Empty backend that resolves every call immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the server-side favourites of `user_id`.
    #[must_use]
    pub fn with_favorites(self, user_id: &UserId, gig_ids: &[GigId]) -> Self {
        lock(&self.server).insert(user_id.clone(), gig_ids.iter().cloned().collect());
        self
    }

    /// Park every favourites call until [`Self::release`] is called for it.
    #[must_use]
    pub fn holding(self) -> Self {
        self.holding.store(true, Ordering::SeqCst);
        self
    }

    /// Make every write touching `gig_id` fail.
    pub fn fail_writes_for(&self, gig_id: &GigId) {
        lock(&self.failing).insert(gig_id.clone());
    }

    /// Server-side favourites of `user_id`.
    pub fn server_favorites(&self, user_id: &UserId) -> Vec<GigId> {
        lock(&self.server)
            .get(user_id)
            .map(|set| set.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Wait until `call` is parked.
    pub async fn wait_for(&self, call: &HeldCall) {
        loop {
            let arrived = self.arrivals.notified();
            if lock(&self.parked).iter().any(|parked| parked.call == *call) {
                return;
            }
            arrived.await;
        }
    }

    /// Resolve the oldest parked instance of `call`.
    ///
    /// Releasing a call whose caller has already gone away is not an error.
    ///
    /// # Panics
    ///
    /// Panics when no matching call is parked.
    pub fn release(&self, call: &HeldCall, outcome: Release) {
        let parked = {
            let mut parked = lock(&self.parked);
            let Some(position) = parked.iter().position(|entry| entry.call == *call) else {
                panic!("no parked call matching {call:?}");
            };
            parked.remove(position)
        };
        let _ignored = parked.release.send(outcome);
    }

    async fn gate(&self, call: HeldCall) -> Release {
        if !self.holding.load(Ordering::SeqCst) {
            return Release::Succeed;
        }
        let (release, outcome) = oneshot::channel();
        lock(&self.parked).push(Parked { call, release });
        self.arrivals.notify_waiters();
        outcome.await.unwrap_or(Release::Fail)
    }

    fn write_fails(&self, gig_id: &GigId) -> bool {
        lock(&self.failing).contains(gig_id)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("scripted marketplace mutex"),
    }
}

fn unscripted<T>(operation: &str) -> Result<T, MarketplaceApiError> {
    Err(MarketplaceApiError::unavailable(format!(
        "{operation} is not scripted"
    )))
}

#[async_trait]
impl MarketplaceApi for ScriptedMarketplace {
    async fn login(&self, _name: &UserName, _role: UserRole) -> Result<User, MarketplaceApiError> {
        unscripted("login")
    }

    async fn list_gigs(&self) -> Result<Vec<GigListing>, MarketplaceApiError> {
        unscripted("list_gigs")
    }

    async fn gig(&self, _gig_id: &GigId) -> Result<Option<Gig>, MarketplaceApiError> {
        unscripted("gig")
    }

    async fn gigs_by_ids(
        &self,
        _gig_ids: &[GigId],
    ) -> Result<Vec<GigListing>, MarketplaceApiError> {
        unscripted("gigs_by_ids")
    }

    async fn user(&self, _user_id: &UserId) -> Result<Option<User>, MarketplaceApiError> {
        unscripted("user")
    }

    async fn update_user(
        &self,
        _user_id: &UserId,
        _update: ProfileUpdate,
    ) -> Result<User, MarketplaceApiError> {
        unscripted("update_user")
    }

    async fn reviews_for_gig(&self, _gig_id: &GigId) -> Result<Vec<Review>, MarketplaceApiError> {
        unscripted("reviews_for_gig")
    }

    async fn similar_gigs(
        &self,
        _gig_id: &GigId,
        _category: GigCategory,
    ) -> Result<Vec<GigListing>, MarketplaceApiError> {
        unscripted("similar_gigs")
    }

    async fn post_message(
        &self,
        _gig_id: &GigId,
        _text: &str,
    ) -> Result<ChatMessage, MarketplaceApiError> {
        unscripted("post_message")
    }

    async fn worker_reply(
        &self,
        _gig_id: &GigId,
        _customer_text: &str,
    ) -> Result<ChatMessage, MarketplaceApiError> {
        unscripted("worker_reply")
    }

    async fn process_payment(
        &self,
        _gig_id: &GigId,
    ) -> Result<PaymentReceipt, MarketplaceApiError> {
        unscripted("process_payment")
    }

    async fn create_gig(
        &self,
        _worker_id: &UserId,
        _new_gig: NewGig,
    ) -> Result<Gig, MarketplaceApiError> {
        unscripted("create_gig")
    }

    async fn create_review(
        &self,
        _gig_id: &GigId,
        _review: NewReview,
        _reviewer_id: &UserId,
    ) -> Result<Review, MarketplaceApiError> {
        unscripted("create_review")
    }

    async fn delete_gig(
        &self,
        _gig_id: &GigId,
        _requester: &UserId,
    ) -> Result<(), MarketplaceApiError> {
        unscripted("delete_gig")
    }

    async fn favorites(&self, user_id: &UserId) -> Result<Vec<GigId>, MarketplaceApiError> {
        match self.gate(HeldCall::Load(user_id.clone())).await {
            Release::Succeed => Ok(self.server_favorites(user_id)),
            Release::Fail => Err(MarketplaceApiError::unavailable("favourites load failed")),
        }
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        gig_id: &GigId,
    ) -> Result<bool, MarketplaceApiError> {
        let outcome = self
            .gate(HeldCall::Add(user_id.clone(), gig_id.clone()))
            .await;
        if outcome == Release::Fail || self.write_fails(gig_id) {
            return Err(MarketplaceApiError::unavailable("add favourite failed"));
        }
        Ok(lock(&self.server)
            .entry(user_id.clone())
            .or_default()
            .insert(gig_id.clone()))
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        gig_id: &GigId,
    ) -> Result<bool, MarketplaceApiError> {
        let outcome = self
            .gate(HeldCall::Remove(user_id.clone(), gig_id.clone()))
            .await;
        if outcome == Release::Fail || self.write_fails(gig_id) {
            return Err(MarketplaceApiError::unavailable("remove favourite failed"));
        }
        Ok(lock(&self.server)
            .get_mut(user_id)
            .is_some_and(|set| set.remove(gig_id)))
    }
}
