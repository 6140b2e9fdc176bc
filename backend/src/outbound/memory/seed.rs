//! Seed catalogue loaded into a fresh in-memory marketplace.
//!
//! The demonstration catalogue ships with the crate as JSON and is decoded
//! through the domain types' serde contracts, so seed data passes the same
//! validation as any other input.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Gig, Review, User};

const DEMO_CATALOGUE_JSON: &str = include_str!("catalogue.json");

/// Errors raised while loading a seed catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// The JSON is malformed or a record fails validation.
    #[error("invalid catalogue JSON: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },

    /// Two records of the same kind share an id.
    #[error("duplicate {kind} id in catalogue: {id}")]
    DuplicateId {
        /// Record kind (`user`, `gig`, or `review`).
        kind: &'static str,
        /// The repeated identifier.
        id: String,
    },
}

/// Users, gigs, and reviews to seed a store with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCatalogue {
    /// Users in insertion order.
    #[serde(default)]
    pub users: Vec<User>,
    /// Gigs, newest first.
    #[serde(default)]
    pub gigs: Vec<Gig>,
    /// Reviews, oldest first.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl SeedCatalogue {
    /// Parse a catalogue from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Parse`] when the JSON is malformed or any
    /// record is invalid, and [`CatalogueError::DuplicateId`] when ids repeat
    /// within a collection.
    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        let catalogue: Self = serde_json::from_str(json).map_err(|error| CatalogueError::Parse {
            message: error.to_string(),
        })?;
        ensure_unique("user", catalogue.users.iter().map(User::id))?;
        ensure_unique("gig", catalogue.gigs.iter().map(|gig| &gig.id))?;
        ensure_unique("review", catalogue.reviews.iter().map(|review| &review.id))?;
        Ok(catalogue)
    }

    /// The bundled demonstration catalogue: three users, four gigs, and
    /// three reviews.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if the bundled JSON fails to load.
    pub fn demo() -> Result<Self, CatalogueError> {
        Self::from_json(DEMO_CATALOGUE_JSON)
    }
}

fn ensure_unique<'a, T>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a T>,
) -> Result<(), CatalogueError>
where
    T: Eq + Hash + ToString + 'a,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogueError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
