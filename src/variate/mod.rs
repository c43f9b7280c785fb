//! Random variate source for the noise generators.
//!
//! Every generator in this crate draws its randomness through the
//! [`VariateSource`] trait, so any engine meeting the statistical contract
//! (standard normal, uniform on `[0, 0.99)`) can drive them. [`VariateEngine`]
//! is the default implementation, wrapping a seedable [`rand`] generator.
//!
//! Each logical stream should own its own engine. Timer seeding two engines at
//! the same instant can produce the same seed, so parallel streams should be
//! seeded manually with distinct values.

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Upper bound of [`VariateSource::uniform`].
///
/// Only the hard-reset jitter of the integrator consumes uniform draws, and
/// the acceptance histograms are calibrated against this bound.
pub const UNIFORM_UPPER: f64 = 0.99;

/// A source of standard-normal and uniform variates.
pub trait VariateSource {
    /// Draw from N(0, 1).
    fn normal(&mut self) -> f64;

    /// Draw from U[0, [`UNIFORM_UPPER`]).
    fn uniform(&mut self) -> f64;
}

/// Seedable random engine owned by a single noise stream.
///
/// The engine remembers the instant it was created; [`VariateEngine::seed_timer`]
/// derives its seed from the time elapsed since then.
#[derive(Clone, Debug)]
pub struct VariateEngine<R = StdRng> {
    rng: R,
    seed: u64,
    beginning: Instant,
}

impl<R: Rng + SeedableRng> VariateEngine<R> {
    /// Creates a new engine seeded from the timer.
    pub fn new() -> Self {
        let mut engine = Self {
            rng: R::seed_from_u64(0),
            seed: 0,
            beginning: Instant::now(),
        };
        engine.seed_timer();
        engine
    }

    /// Creates a new engine with a fixed seed.
    ///
    /// Two engines created with the same seed produce identical sequences.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: R::seed_from_u64(seed),
            seed,
            beginning: Instant::now(),
        }
    }

    /// Reseed the engine deterministically.
    pub fn seed_manual(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = R::seed_from_u64(seed);
        tracing::debug!(seed, "variate engine reseeded manually");
    }

    /// Reseed the engine from the high-resolution clock and return the seed used.
    ///
    /// The seed is the number of nanoseconds elapsed since the engine was
    /// constructed.
    pub fn seed_timer(&mut self) -> u64 {
        let seed = self.beginning.elapsed().as_nanos() as u64;
        self.seed = seed;
        self.rng = R::seed_from_u64(seed);
        tracing::debug!(seed, "variate engine reseeded from timer");
        seed
    }

    /// The seed currently in use.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl<R: Rng + SeedableRng> Default for VariateEngine<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> VariateSource for VariateEngine<R> {
    #[inline(always)]
    fn normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }

    #[inline(always)]
    fn uniform(&mut self) -> f64 {
        self.rng.random_range(0.0..UNIFORM_UPPER)
    }
}
