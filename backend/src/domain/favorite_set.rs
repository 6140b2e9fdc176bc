//! Insertion-ordered set of favourite gig identifiers.

use serde::{Deserialize, Serialize};

use crate::domain::GigId;

/// Favourite gig ids in the order they were added.
///
/// ## Invariants
/// - No id appears twice. Inserting an id that is already present leaves the
///   set unchanged; deserialising a list with repeats keeps the first
///   occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GigId>", into = "Vec<GigId>")]
pub struct FavoriteSet(Vec<GigId>);

impl FavoriteSet {
    /// Build an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`, returning `false` when it was already present.
    pub fn insert(&mut self, id: GigId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove `id`, returning `false` when it was absent.
    pub fn remove(&mut self, id: &GigId) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != id);
        self.0.len() != before
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: &GigId) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    /// Members in insertion order.
    pub fn as_slice(&self) -> &[GigId] {
        &self.0
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<GigId>> for FavoriteSet {
    fn from(ids: Vec<GigId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<FavoriteSet> for Vec<GigId> {
    fn from(set: FavoriteSet) -> Self {
        set.0
    }
}

impl FromIterator<GigId> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = GigId>>(iter: T) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}
