//! Driving the q-noise generator over a full run.
//!
//! A run is described by a [`RunConfig`]: the noise parameters, the number of
//! samples to keep and how the generator is seeded. [`Trajectory`] is the
//! underlying infinite iterator over the Markov chain, and [`simulate`]
//! discards the transient and collects the requested tail into a [`Series`].
//!
//! ```
//! use qnoise::prelude::*;
//!
//! let config = RunConfig::default()
//!     .with_tau(1.0)
//!     .with_q(0.7)
//!     .with_n(1_000)
//!     .with_seed(1234);
//! let series = simulate(&config).unwrap();
//! assert_eq!(series.values.len(), 1_000);
//! ```

pub mod output;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::QNoiseError;
use crate::noise::{normalized_tau, QNoiseGen, StepReport, StepSize, Tier};

// ============================================================================
// Configuration
// ============================================================================

/// Parameters of a single noise run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Correlation time (default: 1.0)
    pub tau: f64,
    /// Integration step (default: 0.01)
    pub h: f64,
    /// Statistics parameter: `q < 1` bounded, `q = 1` Gaussian, `q > 1` heavy tailed (default: 1.0)
    pub q: f64,
    /// Number of samples kept after the transient (default: 10 000)
    pub n: usize,
    /// Number of initial steps discarded (None = `ceil(2 tau / h)`)
    pub transient: Option<usize>,
    /// Seed for the variate engine (None = derived from the wall clock)
    ///
    /// The engine's own timer seed counts nanoseconds since the engine was
    /// built, which spans only a few hundred values when taken right away, so
    /// unseeded runs draw their seed from the wall clock instead.
    pub seed: Option<u64>,
    /// Use the normalized variant, whose correlation time and variance do not depend on `q`
    pub normalized: bool,
    /// Starting value (None = a white noise draw scaled by 1/100)
    pub initial: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tau: 1.0,
            h: 0.01,
            q: 1.0,
            n: 10_000,
            transient: None,
            seed: None,
            normalized: false,
            initial: None,
        }
    }
}

impl RunConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, QNoiseError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QNoiseError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_h(mut self, h: f64) -> Self {
        self.h = h;
        self
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    pub fn with_n(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    pub fn with_transient(mut self, transient: usize) -> Self {
        self.transient = Some(transient);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Check the parameters before running.
    ///
    /// The step functions themselves never validate their input; invalid
    /// parameters there give degenerate floating-point results instead.
    pub fn validate(&self) -> Result<(), QNoiseError> {
        for (name, value) in [("tau", self.tau), ("h", self.h), ("q", self.q)] {
            if !value.is_finite() {
                return Err(QNoiseError::NonFiniteParameter { name, value });
            }
        }
        if let Some(initial) = self.initial {
            if !initial.is_finite() {
                return Err(QNoiseError::NonFiniteParameter {
                    name: "initial",
                    value: initial,
                });
            }
        }
        if self.tau <= 0.0 {
            return Err(QNoiseError::NonPositiveTau(self.tau));
        }
        if self.h <= 0.0 {
            return Err(QNoiseError::NonPositiveStep(self.h));
        }
        if self.normalized && self.q >= 5.0 / 3.0 {
            return Err(QNoiseError::NormalizationDiverges(self.q));
        }
        Ok(())
    }

    /// Number of steps discarded before samples are kept.
    pub fn transient_steps(&self) -> usize {
        self.transient
            .unwrap_or_else(|| (2.0 * self.tau / self.h).ceil() as usize)
    }

    /// Correlation time handed to the integrator.
    pub fn effective_tau(&self) -> f64 {
        if self.normalized {
            normalized_tau(self.tau, self.q)
        } else {
            self.tau
        }
    }
}

// ============================================================================
// Trajectory
// ============================================================================

/// How often the integrator had to leave the plain Heun step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalations {
    /// Steps accepted after at least one Heun retry
    pub retried: usize,
    /// Steps accepted after an Ornstein-Uhlenbeck resample of the start
    pub ornstein_uhlenbeck: usize,
    /// Steps resolved by a hard reset next to the boundary
    pub hard_reset: usize,
}

impl Escalations {
    pub fn record(&mut self, report: &StepReport) {
        match report.tier {
            Tier::Heun if report.attempts > 1 => self.retried += 1,
            Tier::Heun => {}
            Tier::OrnsteinUhlenbeck => self.ornstein_uhlenbeck += 1,
            Tier::HardReset => self.hard_reset += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.retried + self.ornstein_uhlenbeck + self.hard_reset
    }
}

/// Seed for runs without a manual seed.
///
/// Nanoseconds since the Unix epoch, offset by a per-process counter so that
/// runs started within the same clock tick still differ.
pub fn wall_clock_seed() -> u64 {
    static RUNS: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default();
    let run = RUNS.fetch_add(1, Ordering::Relaxed);
    let seed = nanos.wrapping_add(run.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    tracing::debug!(seed, "seeding run from the wall clock");
    seed
}

/// Infinite iterator over successive q-noise values.
///
/// Each item is one integration step; the first item is the step taken from
/// the initial value, which itself is not yielded.
#[derive(Debug, Clone)]
pub struct Trajectory<R = StdRng> {
    generator: QNoiseGen<R>,
    eta: f64,
    tau: f64,
    q: f64,
    step: StepSize,
    escalations: Escalations,
}

impl Trajectory<StdRng> {
    /// Build a trajectory with a generator seeded as the configuration asks.
    pub fn new(config: &RunConfig) -> Result<Self, QNoiseError> {
        let generator = match config.seed {
            Some(seed) => QNoiseGen::from_seed(seed),
            None => QNoiseGen::from_seed(wall_clock_seed()),
        };
        Self::with_generator(config, generator)
    }
}

impl<R: Rng + SeedableRng> Trajectory<R> {
    /// Build a trajectory around an existing generator. `config.seed` is ignored.
    pub fn with_generator(
        config: &RunConfig,
        mut generator: QNoiseGen<R>,
    ) -> Result<Self, QNoiseError> {
        config.validate()?;
        let eta = match config.initial {
            Some(initial) => initial,
            None => generator.gaussian_white_noise() / 100.0,
        };
        Ok(Self {
            generator,
            eta,
            tau: config.effective_tau(),
            q: config.q,
            step: StepSize::new(config.h),
            escalations: Escalations::default(),
        })
    }

    /// The most recent value.
    pub fn current(&self) -> f64 {
        self.eta
    }

    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }

    pub fn escalations(&self) -> Escalations {
        self.escalations
    }
}

impl<R: Rng + SeedableRng> Iterator for Trajectory<R> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        let report = self
            .generator
            .q_noise_report(self.eta, self.tau, self.q, self.step);
        self.escalations.record(&report);
        self.eta = report.value;
        Some(report.value)
    }
}

// ============================================================================
// Runs
// ============================================================================

/// The post-transient samples of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Seed the variate engine was started with
    pub seed: u64,
    /// Number of discarded steps
    pub transient: usize,
    /// Kept samples, in generation order
    pub values: Vec<f64>,
    /// Escalations over the whole run, transient included
    pub escalations: Escalations,
}

/// Run the generator and keep `config.n` samples after the transient.
pub fn simulate(config: &RunConfig) -> Result<Series, QNoiseError> {
    simulate_with(config, |_| {})
}

/// As [`simulate`], calling `on_step` after every step (transient included).
pub fn simulate_with(
    config: &RunConfig,
    mut on_step: impl FnMut(usize),
) -> Result<Series, QNoiseError> {
    let mut trajectory = Trajectory::new(config)?;
    let transient = config.transient_steps();
    tracing::info!(
        tau = config.tau,
        h = config.h,
        q = config.q,
        n = config.n,
        transient,
        normalized = config.normalized,
        seed = trajectory.seed(),
        "starting q-noise run"
    );

    let mut steps = 0;
    let mut tick = || {
        steps += 1;
        on_step(steps);
    };

    for _ in trajectory.by_ref().take(transient) {
        tick();
    }
    let values: Vec<f64> = trajectory
        .by_ref()
        .take(config.n)
        .inspect(|_| tick())
        .collect();

    let escalations = trajectory.escalations();
    if escalations.hard_reset > 0 {
        tracing::warn!(
            hard_resets = escalations.hard_reset,
            "run needed hard resets; consider a smaller step"
        );
    }
    tracing::info!(
        samples = values.len(),
        retried = escalations.retried,
        ornstein_uhlenbeck = escalations.ornstein_uhlenbeck,
        hard_reset = escalations.hard_reset,
        "q-noise run finished"
    );

    Ok(Series {
        seed: trajectory.seed(),
        transient,
        values,
        escalations,
    })
}
