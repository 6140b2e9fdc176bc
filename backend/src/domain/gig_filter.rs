//! Browse-page filtering over gig listings.

use crate::domain::{GigCategory, GigListing};

/// Category and free-text filter applied to the gig list.
///
/// An absent category matches every gig. The search term matches, without
/// regard to case, any gig whose title or description contains it; a blank
/// term matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GigFilter {
    /// Restrict to one category.
    pub category: Option<GigCategory>,
    /// Free-text search term.
    pub search: String,
}

impl GigFilter {
    /// Whether `listing` passes the filter.
    pub fn matches(&self, listing: &GigListing) -> bool {
        let category_matches = self
            .category
            .is_none_or(|category| listing.gig.category == category);
        if !category_matches {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || listing.gig.title.to_lowercase().contains(&needle)
            || listing.gig.description.to_lowercase().contains(&needle)
    }

    /// Keep the listings that pass, preserving order.
    pub fn apply(&self, listings: Vec<GigListing>) -> Vec<GigListing> {
        listings
            .into_iter()
            .filter(|listing| self.matches(listing))
            .collect()
    }
}
