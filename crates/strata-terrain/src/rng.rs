//! Deterministic seeded RNG for stochastic placement decisions.
//!
//! Wraps [`ChaCha8Rng`] so two generators built from the same seed produce
//! identical sequences across runs and platforms. The save/load contract
//! depends on this to reproduce unmodified terrain.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded pseudo-random generator yielding floats in `[0, 1)`.
pub struct GenRng {
    inner: ChaCha8Rng,
}

impl GenRng {
    /// Creates a generator from an integer seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns the next value in the sequence, uniform in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// Returns a uniform integer in `[min, max]` (inclusive).
    ///
    /// Degenerate ranges (`max <= min`) collapse to `min`.
    pub fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        (min + (self.next() * span) as i32).min(max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
