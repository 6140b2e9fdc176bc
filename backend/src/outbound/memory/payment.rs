//! Randomised payment outcomes.

use std::sync::{Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Share of payments that succeed unless configured otherwise.
pub const DEFAULT_SUCCESS_PERCENT: u8 = 80;

/// Decides whether a simulated charge goes through.
///
/// With a seed the sequence of outcomes is reproducible; without one the
/// generator is seeded from the operating system.
#[derive(Debug)]
pub struct PaymentSimulator {
    rng: Mutex<SmallRng>,
    success_percent: u8,
}

impl PaymentSimulator {
    /// Build a simulator. Percentages above 100 are clamped.
    pub fn new(success_percent: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            success_percent: success_percent.min(100),
        }
    }

    /// Configured success share in percent.
    pub fn success_percent(&self) -> u8 {
        self.success_percent
    }

    /// Draw the outcome of one charge.
    pub fn charge(&self) -> bool {
        let roll: u8 = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..100);
        roll < self.success_percent
    }
}

impl Default for PaymentSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_PERCENT, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn outcomes(simulator: &PaymentSimulator, trials: usize) -> Vec<bool> {
        (0..trials).map(|_| simulator.charge()).collect()
    }

    #[rstest]
    fn same_seed_replays_the_same_outcomes() {
        let first = PaymentSimulator::new(80, Some(7));
        let second = PaymentSimulator::new(80, Some(7));
        assert_eq!(outcomes(&first, 200), outcomes(&second, 200));
    }

    #[rstest]
    fn failure_rate_tracks_configuration() {
        let simulator = PaymentSimulator::new(80, Some(2024));
        let failures = outcomes(&simulator, 10_000)
            .into_iter()
            .filter(|success| !success)
            .count();
        assert!(
            (1_700..=2_300).contains(&failures),
            "expected about 2000 failures, got {failures}"
        );
    }

    #[rstest]
    #[case(0, false)]
    #[case(100, true)]
    #[case(250, true)]
    fn extreme_percentages_are_deterministic(#[case] percent: u8, #[case] expected: bool) {
        let simulator = PaymentSimulator::new(percent, Some(1));
        assert!(outcomes(&simulator, 50).into_iter().all(|success| success == expected));
    }
}
