//! Simulated network latency for the in-memory marketplace.

use std::time::Duration;

use async_trait::async_trait;

/// Base delay applied to marketplace calls unless configured otherwise.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Async sleeping abstraction so tests can skip simulated delays.
#[async_trait]
pub trait LatencySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl LatencySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay classes applied per operation.
///
/// Most calls take the base delay. Favourite lookups and chat posts are
/// quicker, worker replies take twice as long, and payments four times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    base: Duration,
}

impl LatencyProfile {
    /// Profile scaled from `base`.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Profile with no delay at all.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Delay for ordinary reads and writes.
    pub fn standard(self) -> Duration {
        self.base
    }

    /// Delay for favourite lookups, favourite writes, and chat posts.
    pub fn quick(self) -> Duration {
        self.base / 2
    }

    /// Delay before a worker reply arrives.
    pub fn reply(self) -> Duration {
        self.base.saturating_mul(2)
    }

    /// Delay for payment processing.
    pub fn payment(self) -> Duration {
        self.base.saturating_mul(4)
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}
