//! Optimistic favourites synchronizer.
//!
//! Keeps a local copy of the active user's favourite gig ids convergent with
//! the marketplace. Toggles apply locally at once and are reconciled against
//! the remote outcome afterwards:
//!
//! - each pending command is an intent keyed by gig id, and only the latest
//!   intent for a key may change the local set;
//! - a failed latest intent restores the membership the server last
//!   confirmed, so an early failure never clobbers a later toggle;
//! - a session change discards in-flight loads and ignores every response
//!   issued under the previous session.
//!
//! Failures are logged and never surfaced to callers.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::ports::{MarketplaceApi, MarketplaceApiError};
use crate::domain::{GigId, GigListing, User, UserId};

pub use self::state::FavoritesPhase;
use self::state::{CommandTicket, FavoritesState, Intent};

/// Per-session favourites view backed by a [`MarketplaceApi`].
pub struct FavoritesSynchronizer<A> {
    api: Arc<A>,
    state: Mutex<FavoritesState>,
}

impl<A> FavoritesSynchronizer<A> {
    /// Build an uninitialised synchronizer.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(FavoritesState::default()),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> FavoritesPhase {
        self.lock().phase()
    }

    /// Whether the initial fetch for the active session is still running.
    pub fn is_loading(&self) -> bool {
        self.phase() == FavoritesPhase::Loading
    }

    /// Whether `gig_id` is currently shown as a favourite.
    pub fn is_favorite(&self, gig_id: &GigId) -> bool {
        self.lock().favorites().contains(gig_id)
    }

    /// Snapshot of the local favourite ids in insertion order.
    pub fn favorite_ids(&self) -> Vec<GigId> {
        self.lock().favorites().as_slice().to_vec()
    }

    /// User whose favourites are shown, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.lock().user_id().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, FavoritesState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: MarketplaceApi> FavoritesSynchronizer<A> {
    /// Re-key the synchronizer to `user_id` and load their favourites.
    ///
    /// `None` empties the set. A load whose session has been replaced by the
    /// time it resolves is discarded.
    pub async fn activate(&self, user_id: Option<UserId>) {
        let Some(ticket) = self.lock().begin_load(user_id) else {
            debug!("favourites cleared for signed-out session");
            return;
        };

        let ids = match self.api.favorites(&ticket.user_id).await {
            Ok(ids) => Some(ids),
            Err(error) => {
                warn!(user_id = %ticket.user_id, %error, "favourites could not be loaded");
                None
            }
        };

        if self.lock().finish_load(&ticket, ids) {
            debug!(user_id = %ticket.user_id, "favourites loaded");
        } else {
            debug!(user_id = %ticket.user_id, "discarded favourites for a replaced session");
        }
    }

    /// Drive [`Self::activate`] from session changes until the session
    /// sender is dropped.
    ///
    /// A load still in flight when the signed-in user changes is abandoned.
    /// Updates that keep the same user id (profile edits) do not reload.
    pub async fn follow(&self, mut session: watch::Receiver<Option<User>>) {
        let mut active = session_user_id(&mut session);
        loop {
            let load = self.activate(active.clone());
            tokio::pin!(load);
            let mut loaded = false;
            let next = loop {
                tokio::select! {
                    () = &mut load, if !loaded => loaded = true,
                    next = next_user_id(&mut session, &active) => break next,
                }
            };
            match next {
                Some(user_id) => active = user_id,
                None => return,
            }
        }
    }

    /// Mark `gig_id` as a favourite.
    ///
    /// Ignored unless favourites are loaded, or when the gig is already a
    /// favourite.
    pub async fn add(&self, gig_id: &GigId) {
        self.run(gig_id, Intent::Add).await;
    }

    /// Unmark `gig_id`.
    ///
    /// Ignored unless favourites are loaded, or when the gig is not a
    /// favourite.
    pub async fn remove(&self, gig_id: &GigId) {
        self.run(gig_id, Intent::Remove).await;
    }

    /// Resolve the current favourite ids to listings.
    ///
    /// Returns an empty list when the lookup fails.
    pub async fn favorite_gigs(&self) -> Vec<GigListing> {
        let ids = self.favorite_ids();
        if ids.is_empty() {
            return Vec::new();
        }
        match self.api.gigs_by_ids(&ids).await {
            Ok(listings) => listings,
            Err(error) => {
                warn!(%error, "favourite gigs could not be resolved");
                Vec::new()
            }
        }
    }

    async fn run(&self, gig_id: &GigId, intent: Intent) {
        let Some(ticket) = self.lock().begin_command(gig_id, intent) else {
            return;
        };

        let mut in_flight = InFlightCommand::new(&self.state, &ticket);
        let outcome = self.dispatch(&ticket).await;
        in_flight.complete();
        if let Err(error) = &outcome {
            warn!(
                user_id = %ticket.user_id,
                gig_id = %ticket.gig_id,
                ?intent,
                %error,
                "favourite update failed"
            );
        }

        if self.lock().finish_command(&ticket, outcome.is_ok()) {
            debug!(gig_id = %ticket.gig_id, ?intent, "favourite rolled back");
        }
    }

    async fn dispatch(&self, ticket: &CommandTicket) -> Result<bool, MarketplaceApiError> {
        match ticket.intent {
            Intent::Add => self.api.add_favorite(&ticket.user_id, &ticket.gig_id).await,
            Intent::Remove => {
                self.api
                    .remove_favorite(&ticket.user_id, &ticket.gig_id)
                    .await
            }
        }
    }
}

/// Settles a command as failed when its caller stops waiting for it.
struct InFlightCommand<'a> {
    state: &'a Mutex<FavoritesState>,
    ticket: &'a CommandTicket,
    completed: bool,
}

impl<'a> InFlightCommand<'a> {
    fn new(state: &'a Mutex<FavoritesState>, ticket: &'a CommandTicket) -> Self {
        Self {
            state,
            ticket,
            completed: false,
        }
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for InFlightCommand<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.finish_command(self.ticket, false) {
            debug!(gig_id = %self.ticket.gig_id, "abandoned favourite update rolled back");
        }
    }
}

fn session_user_id(session: &mut watch::Receiver<Option<User>>) -> Option<UserId> {
    session.borrow_and_update().as_ref().map(|user| user.id().clone())
}

/// Wait for the signed-in user id to differ from `active`.
///
/// Returns `None` once the session sender is gone.
async fn next_user_id(
    session: &mut watch::Receiver<Option<User>>,
    active: &Option<UserId>,
) -> Option<Option<UserId>> {
    loop {
        session.changed().await.ok()?;
        let user_id = session_user_id(session);
        if user_id != *active {
            return Some(user_id);
        }
    }
}

#[cfg(test)]
mod tests;
