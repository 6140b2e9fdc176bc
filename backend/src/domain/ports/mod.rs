//! Domain ports for the hexagonal boundary.
//!
//! - [`MarketplaceApi`] is the remote facade over users, gigs, reviews,
//!   favourites, chat, and payments.
//! - [`TextGenerator`] is the generative-language collaborator behind the
//!   assistive tools.

mod macros;
pub(crate) use macros::define_port_error;

mod marketplace_api;
mod text_generator;

pub use marketplace_api::{MarketplaceApi, MarketplaceApiError};
#[cfg(test)]
pub use marketplace_api::MockMarketplaceApi;
pub use text_generator::{TextGenerationError, TextGenerator, UnconfiguredTextGenerator};
#[cfg(test)]
pub use text_generator::MockTextGenerator;
