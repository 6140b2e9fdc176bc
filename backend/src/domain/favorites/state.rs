//! Synchronous bookkeeping behind the favourites synchronizer.
//!
//! Every network call is bracketed by a `begin_*` and a `finish_*` call on
//! [`FavoritesState`]. The state decides what the local set looks like at
//! each step, so the async wrapper only moves data and the reconciliation
//! rules can be exercised without a runtime.

use std::collections::HashMap;

use crate::domain::{FavoriteSet, GigId, UserId};

/// Lifecycle of the favourites view for the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoritesPhase {
    /// No session has been observed yet.
    #[default]
    Uninitialized,
    /// The session user's favourites are being fetched.
    Loading,
    /// Favourites are loaded and commands are accepted.
    Ready,
    /// No session; the set is empty and commands are ignored.
    Empty,
}

/// Direction of a favourite command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Mark the gig as a favourite.
    Add,
    /// Unmark the gig.
    Remove,
}

impl Intent {
    fn membership(self) -> bool {
        matches!(self, Self::Add)
    }
}

/// Handle for an in-flight load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub(super) generation: u64,
    pub(super) user_id: UserId,
}

/// Handle for an in-flight add or remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTicket {
    pub(super) generation: u64,
    pub(super) seq: u64,
    pub(super) user_id: UserId,
    pub(super) gig_id: GigId,
    pub(super) intent: Intent,
}

/// Outstanding commands for one gig.
#[derive(Debug)]
struct PendingKey {
    /// Membership the server is known to hold, updated on each success.
    confirmed: bool,
    latest_seq: u64,
    latest_failed: bool,
    in_flight: usize,
}

#[derive(Debug, Default)]
pub(super) struct FavoritesState {
    phase: FavoritesPhase,
    generation: u64,
    next_seq: u64,
    user_id: Option<UserId>,
    favorites: FavoriteSet,
    pending: HashMap<GigId, PendingKey>,
}

impl FavoritesState {
    pub(super) fn phase(&self) -> FavoritesPhase {
        self.phase
    }

    pub(super) fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub(super) fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Switch to `user_id`, discarding everything tied to the old session.
    ///
    /// Returns a ticket when a load must be issued.
    pub(super) fn begin_load(&mut self, user_id: Option<UserId>) -> Option<LoadTicket> {
        self.generation += 1;
        self.favorites = FavoriteSet::new();
        self.pending.clear();
        self.user_id.clone_from(&user_id);
        match user_id {
            None => {
                self.phase = FavoritesPhase::Empty;
                None
            }
            Some(user_id) => {
                self.phase = FavoritesPhase::Loading;
                Some(LoadTicket {
                    generation: self.generation,
                    user_id,
                })
            }
        }
    }

    /// Install a load result. Returns `false` when the ticket is stale.
    ///
    /// A failed load (`None`) leaves the set empty but still reaches
    /// [`FavoritesPhase::Ready`].
    pub(super) fn finish_load(&mut self, ticket: &LoadTicket, ids: Option<Vec<GigId>>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.favorites = ids.unwrap_or_default().into_iter().collect();
        self.phase = FavoritesPhase::Ready;
        true
    }

    /// Apply `intent` locally and return a ticket for the remote call.
    ///
    /// Returns `None` outside [`FavoritesPhase::Ready`] or when the set
    /// already reflects the intent.
    pub(super) fn begin_command(
        &mut self,
        gig_id: &GigId,
        intent: Intent,
    ) -> Option<CommandTicket> {
        if self.phase != FavoritesPhase::Ready {
            return None;
        }
        let user_id = self.user_id.clone()?;
        let current = self.favorites.contains(gig_id);
        if current == intent.membership() {
            return None;
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        let entry = self
            .pending
            .entry(gig_id.clone())
            .or_insert_with(|| PendingKey {
                confirmed: current,
                latest_seq: seq,
                latest_failed: false,
                in_flight: 0,
            });
        entry.latest_seq = seq;
        entry.latest_failed = false;
        entry.in_flight += 1;

        self.set_membership(gig_id, intent.membership());
        Some(CommandTicket {
            generation: self.generation,
            seq,
            user_id,
            gig_id: gig_id.clone(),
            intent,
        })
    }

    /// Reconcile the outcome of a remote command.
    ///
    /// Returns `true` when the local membership was reverted.
    pub(super) fn finish_command(&mut self, ticket: &CommandTicket, succeeded: bool) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        let Some(entry) = self.pending.get_mut(&ticket.gig_id) else {
            return false;
        };

        entry.in_flight = entry.in_flight.saturating_sub(1);
        if succeeded {
            entry.confirmed = ticket.intent.membership();
        } else if ticket.seq == entry.latest_seq {
            entry.latest_failed = true;
        }

        let target = if entry.latest_failed {
            Some(entry.confirmed)
        } else {
            None
        };
        if entry.in_flight == 0 {
            self.pending.remove(&ticket.gig_id);
        }

        match target {
            Some(membership) if self.favorites.contains(&ticket.gig_id) != membership => {
                self.set_membership(&ticket.gig_id, membership);
                true
            }
            _ => false,
        }
    }

    fn set_membership(&mut self, gig_id: &GigId, member: bool) {
        if member {
            self.favorites.insert(gig_id.clone());
        } else {
            self.favorites.remove(gig_id);
        }
    }
}
