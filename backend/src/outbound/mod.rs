//! Outbound adapters implementing domain ports.
//!
//! - **memory**: the process-local marketplace, backing `MarketplaceApi`
//!   with simulated latency and payments.
//! - **gemini**: reqwest-backed `TextGenerator` for assistive text.
//!
//! Adapters translate between domain types and their backing
//! representation. They contain no business logic.

pub mod gemini;
pub mod memory;
