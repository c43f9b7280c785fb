//! Colored noise generators.
//!
//! The q-noise process is the solution of
//!
//! ```text
//! d eta = -V'(eta) dt + (1 / tau) dW,   V'(eta) = eta / (tau (1 + tau (q - 1) eta^2))
//! ```
//!
//! whose stationary density is proportional to
//! `(1 - tau (1 - q) eta^2)^(1 / (1 - q))`. For `q = 1` it reduces to an
//! Ornstein-Uhlenbeck process with variance `1 / (2 tau)`, for `q < 1` the
//! density has compact support `|eta| <= 1 / sqrt(tau (1 - q))`, and for
//! `q > 1` it has power-law tails.
//!
//! All generators are one-step updates: callers feed each returned value back
//! as the next `eta`. Randomness comes from a caller-owned [`VariateSource`],
//! or from the engine owned by a [`QNoiseGen`].

pub mod heun;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::variate::{VariateEngine, VariateSource};

pub use heun::{q_noise, q_noise_report, StepReport, Tier};

/// Integration step `h` together with its square root.
///
/// Build it once with [`StepSize::new`] to avoid recomputing `sqrt(h)` on
/// every step. A bare `f64` converts into a `StepSize` as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSize {
    h: f64,
    sqrt_h: f64,
}

impl StepSize {
    pub fn new(h: f64) -> Self {
        Self { h, sqrt_h: h.sqrt() }
    }

    /// Use a caller-supplied `sqrt(h)`. A negative root is recomputed.
    pub fn with_sqrt(h: f64, sqrt_h: f64) -> Self {
        if sqrt_h < 0.0 {
            Self::new(h)
        } else {
            Self { h, sqrt_h }
        }
    }

    #[inline(always)]
    pub fn h(&self) -> f64 {
        self.h
    }

    #[inline(always)]
    pub fn sqrt_h(&self) -> f64 {
        self.sqrt_h
    }
}

impl From<f64> for StepSize {
    fn from(h: f64) -> Self {
        Self::new(h)
    }
}

/// Derivative of the q-noise potential, already divided by `tau`.
///
/// Diverges at `|eta| = 1 / sqrt(tau (1 - q))` when `q < 1`.
#[inline(always)]
pub fn potential_prime(eta: f64, tau: f64, q: f64) -> f64 {
    (eta / (1.0 + eta * eta * tau * (q - 1.0))) / tau
}

/// Half-width of the stationary support, `1 / sqrt(tau (1 - q))`.
///
/// Infinite for `q = 1` and NaN for `q > 1`, where the density is unbounded.
#[inline(always)]
pub fn support_bound(tau: f64, q: f64) -> f64 {
    1.0 / (tau * (1.0 - q)).sqrt()
}

/// Effective correlation time used by [`q_noise_norm`].
#[inline(always)]
pub fn normalized_tau(tau: f64, q: f64) -> f64 {
    tau * (5.0 - 3.0 * q) / 2.0
}

/// A single draw of Gaussian white noise.
#[inline(always)]
pub fn gaussian_white_noise<V: VariateSource + ?Sized>(rng: &mut V) -> f64 {
    rng.normal()
}

/// Exact one-step update of the Ornstein-Uhlenbeck process with correlation time `tau`.
///
/// The stationary variance is `1 / (2 tau)`, matching [`q_noise`] at `q = 1`.
#[inline]
pub fn ornstein_uhlenbeck<V: VariateSource + ?Sized>(
    rng: &mut V,
    eta: f64,
    tau: f64,
    h: f64,
) -> f64 {
    eta * (-h / tau).exp() + ((1.0 - (-2.0 / tau * h).exp()) / 2.0 / tau).sqrt() * rng.normal()
}

/// q-noise step with `tau` rescaled to `tau (5 - 3q) / 2`.
///
/// The effective correlation time of q-noise is `2 tau / (5 - 3q)` to first
/// order, so the rescaled process decorrelates over `tau` for every `q`. The
/// correction vanishes as `q -> 5/3` and the approximation degrades near there.
#[inline]
pub fn q_noise_norm<V: VariateSource + ?Sized>(
    rng: &mut V,
    eta: f64,
    tau: f64,
    q: f64,
    step: impl Into<StepSize>,
) -> f64 {
    q_noise(rng, eta, normalized_tau(tau, q), q, step)
}

/// A q-noise generator owning its own variate engine.
///
/// One generator corresponds to one noise stream. Use [`QNoiseGen::from_seed`]
/// (or [`QNoiseGen::seed_manual`]) with distinct seeds when running several
/// streams side by side.
///
/// # Example
/// ```
/// use qnoise::QNoiseGen;
///
/// let mut gen = QNoiseGen::from_seed(42);
/// let mut eta = gen.gaussian_white_noise() / 100.0;
/// for _ in 0..1000 {
///     eta = gen.q_noise(eta, 1.0, 0.5, 0.01);
/// }
/// assert!(eta.abs() <= qnoise::support_bound(1.0, 0.5));
/// ```
#[derive(Clone, Debug)]
pub struct QNoiseGen<R = StdRng> {
    engine: VariateEngine<R>,
}

impl QNoiseGen<StdRng> {
    /// Creates a generator seeded from the timer.
    pub fn new() -> Self {
        Self::with_engine(VariateEngine::new())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::with_engine(VariateEngine::from_seed(seed))
    }
}

impl Default for QNoiseGen<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + SeedableRng> QNoiseGen<R> {
    /// Wrap an existing engine, e.g. one backed by a different generator.
    pub fn with_engine(engine: VariateEngine<R>) -> Self {
        Self { engine }
    }

    pub fn seed_manual(&mut self, seed: u64) {
        self.engine.seed_manual(seed);
    }

    pub fn seed_timer(&mut self) -> u64 {
        self.engine.seed_timer()
    }

    pub fn seed(&self) -> u64 {
        self.engine.seed()
    }

    pub fn engine_mut(&mut self) -> &mut VariateEngine<R> {
        &mut self.engine
    }

    pub fn gaussian_white_noise(&mut self) -> f64 {
        gaussian_white_noise(&mut self.engine)
    }

    pub fn ornstein_uhlenbeck(&mut self, eta: f64, tau: f64, h: f64) -> f64 {
        ornstein_uhlenbeck(&mut self.engine, eta, tau, h)
    }

    pub fn q_noise(&mut self, eta: f64, tau: f64, q: f64, step: impl Into<StepSize>) -> f64 {
        q_noise(&mut self.engine, eta, tau, q, step)
    }

    pub fn q_noise_report(
        &mut self,
        eta: f64,
        tau: f64,
        q: f64,
        step: impl Into<StepSize>,
    ) -> StepReport {
        q_noise_report(&mut self.engine, eta, tau, q, step)
    }

    pub fn q_noise_norm(&mut self, eta: f64, tau: f64, q: f64, step: impl Into<StepSize>) -> f64 {
        q_noise_norm(&mut self.engine, eta, tau, q, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summary;
    use approx::assert_relative_eq;

    fn sample_variance(samples: &[f64]) -> f64 {
        summary(samples).unwrap().std_dev.powi(2)
    }

    fn ornstein_uhlenbeck_variance(tau: f64, h: f64, steps: usize) -> f64 {
        let mut gen = QNoiseGen::from_seed(17);
        let mut eta = 0.0;
        let samples: Vec<f64> = (0..steps)
            .map(|_| {
                eta = gen.ornstein_uhlenbeck(eta, tau, h);
                eta
            })
            .skip(steps / 100)
            .collect();
        sample_variance(&samples)
    }

    #[test]
    fn test_potential_prime_gaussian_is_linear() {
        assert_relative_eq!(potential_prime(2.0, 4.0, 1.0), 0.5);
        assert_relative_eq!(potential_prime(-1.0, 0.5, 1.0), -2.0);
        assert_eq!(potential_prime(0.0, 3.0, 0.2), 0.0);
    }

    #[test]
    fn test_potential_prime_values() {
        // eta / (1 + eta^2 tau (q - 1)) / tau
        assert_relative_eq!(potential_prime(1.0, 1.0, 0.5), 2.0);
        assert_relative_eq!(potential_prime(1.0, 2.0, 2.0), 1.0 / 6.0);
        // Odd in eta.
        assert_relative_eq!(potential_prime(-0.7, 1.3, 0.4), -potential_prime(0.7, 1.3, 0.4));
    }

    #[test]
    fn test_support_bound() {
        assert_relative_eq!(support_bound(1.0, 0.5), 2.0f64.sqrt());
        assert_relative_eq!(support_bound(4.0, 0.0), 0.5);
        assert!(support_bound(1.0, 1.0).is_infinite());
        assert!(support_bound(1.0, 1.5).is_nan());
    }

    #[test]
    fn test_normalized_tau() {
        assert_relative_eq!(normalized_tau(2.0, 1.0), 2.0);
        assert_relative_eq!(normalized_tau(1.0, 0.5), 1.75);
        assert!(normalized_tau(1.0, 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_size() {
        let step = StepSize::new(0.04);
        assert_relative_eq!(step.sqrt_h(), 0.2);
        assert_eq!(StepSize::from(0.04), step);
        assert_relative_eq!(StepSize::with_sqrt(0.04, -1.0).sqrt_h(), 0.2);
        assert_eq!(StepSize::with_sqrt(0.04, 0.3).sqrt_h(), 0.3);
    }

    #[test]
    fn test_ornstein_uhlenbeck_without_noise_decays() {
        struct Zero;
        impl VariateSource for Zero {
            fn normal(&mut self) -> f64 {
                0.0
            }
            fn uniform(&mut self) -> f64 {
                0.0
            }
        }
        let next = ornstein_uhlenbeck(&mut Zero, 1.0, 2.0, 0.5);
        assert_relative_eq!(next, (-0.25f64).exp());
    }

    #[test]
    fn test_ornstein_uhlenbeck_stationary_variance() {
        for &tau in &[0.5, 1.0, 4.0] {
            let expected = 1.0 / (2.0 * tau);
            let var = ornstein_uhlenbeck_variance(tau, 0.25 * tau, 200_000);
            assert!(
                (var - expected).abs() / expected < 0.1,
                "tau = {}: variance {} vs {}",
                tau,
                var,
                expected
            );
        }
    }

    #[test]
    fn test_ornstein_uhlenbeck_variance_depends_on_simulated_time_only() {
        // The update is exact: halving h over twice the steps covers the same time.
        for &tau in &[0.5, 2.0] {
            let expected = 1.0 / (2.0 * tau);
            let coarse = ornstein_uhlenbeck_variance(tau, 0.25 * tau, 200_000);
            let fine = ornstein_uhlenbeck_variance(tau, 0.125 * tau, 400_000);
            assert!(
                (fine - expected).abs() / expected < 0.1,
                "tau = {}: fine-step variance {} vs {}",
                tau,
                fine,
                expected
            );
            assert!(
                (coarse - fine).abs() / expected < 0.06,
                "tau = {}: coarse {} vs fine {}",
                tau,
                coarse,
                fine
            );
        }
    }

    #[test]
    fn test_q_noise_norm_delegates_with_rescaled_tau() {
        let mut a = QNoiseGen::from_seed(3);
        let mut b = QNoiseGen::from_seed(3);
        let (tau, q, h) = (1.0, 0.6, 0.01);
        let (mut x, mut y) = (0.0, 0.0);
        for _ in 0..500 {
            x = a.q_noise_norm(x, tau, q, h);
            y = b.q_noise(y, normalized_tau(tau, q), q, h);
        }
        assert_eq!(x, y);
    }

    #[test]
    fn test_generators_share_seed_semantics() {
        let mut a = QNoiseGen::new();
        let mut b = QNoiseGen::from_seed(99);
        a.seed_manual(99);
        assert_eq!(a.seed(), 99);
        for _ in 0..50 {
            assert_eq!(a.gaussian_white_noise(), b.gaussian_white_noise());
        }
    }
}
