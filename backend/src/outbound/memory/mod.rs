//! In-memory marketplace adapter.
//!
//! This module implements the `MarketplaceApi` port over a process-local
//! [`DomainStore`], with simulated latency and randomised payment outcomes.

mod latency;
mod marketplace;
mod payment;
mod seed;
mod store;

pub use latency::{DEFAULT_LATENCY, LatencyProfile, LatencySleeper, TokioSleeper};
pub use marketplace::{InMemoryMarketplace, SIMILAR_GIG_LIMIT};
pub use payment::{DEFAULT_SUCCESS_PERCENT, PaymentSimulator};
pub use seed::{CatalogueError, SeedCatalogue};
pub use store::DomainStore;
