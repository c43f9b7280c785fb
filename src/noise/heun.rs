use super::{ornstein_uhlenbeck, potential_prime, support_bound, StepSize};
use crate::variate::VariateSource;

/// Rejections tolerated before the start point is replaced by an
/// Ornstein-Uhlenbeck draw.
pub const HEUN_RETRIES: u32 = 10;

/// Rejections tolerated before the step is hard reset next to the boundary.
pub const MAX_REJECTIONS: u32 = 20;

/// Escalation tier of a q-noise step.
///
/// A step starts in [`Tier::Heun`]. Each rejected candidate moves it along the
/// ladder according to the number of rejections seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Retry the Heun step from the same start with fresh variates.
    Heun,
    /// Replace the start by `eta_cut * ornstein_uhlenbeck(start)` and retry.
    OrnsteinUhlenbeck,
    /// Give up integrating and return a value just inside the boundary.
    HardReset,
}

impl Tier {
    /// The tier that handles the next attempt after `rejections` failed candidates.
    pub fn after(rejections: u32) -> Self {
        match rejections {
            r if r <= HEUN_RETRIES => Tier::Heun,
            r if r <= MAX_REJECTIONS => Tier::OrnsteinUhlenbeck,
            _ => Tier::HardReset,
        }
    }
}

/// Outcome of a single q-noise step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// The next value of the trajectory.
    pub value: f64,
    /// Number of Heun evaluations performed (at most `MAX_REJECTIONS + 1`).
    pub attempts: u32,
    /// Tier that produced `value`.
    pub tier: Tier,
}

/// Increment of one Heun step from `eta`.
///
/// Draws one normal variate for the stochastic term.
#[inline(always)]
fn heun_increment<V: VariateSource + ?Sized>(
    rng: &mut V,
    eta: f64,
    tau: f64,
    q: f64,
    step: StepSize,
) -> f64 {
    let drift = potential_prime(eta, tau, q);
    let k = step.h() * drift;
    let l = step.sqrt_h() * rng.normal() / tau;
    -step.h() / 2.0 * (drift + potential_prime(eta + k + l, tau, q)) + l
}

/// A candidate is accepted unless it is NaN or lies beyond the support bound.
///
/// For `q >= 1` the bound is infinite or NaN and only the NaN test applies.
#[inline(always)]
fn accepted(candidate: f64, eta_cut: f64) -> bool {
    !(candidate.abs() > eta_cut || candidate.is_nan())
}

/// Advance the q-noise process by one step and report how the value was obtained.
///
/// Integrates `d eta = -V'(eta) dt + dW / tau` with the Heun predictor-corrector
/// scheme, where `V'` is [`potential_prime`]. When `q < 1` a candidate outside
/// `[-eta_cut, eta_cut]` (or a NaN candidate) is rejected and the step escalates
/// through [`Tier`]:
///
/// 1. up to [`HEUN_RETRIES`] retries from the same start,
/// 2. up to [`MAX_REJECTIONS`] retries from an Ornstein-Uhlenbeck resample of the start,
/// 3. a hard reset to `sign(eta) * eta_cut * (0.9 + 0.1 u)`.
///
/// Every call terminates after at most `MAX_REJECTIONS + 1` Heun evaluations
/// and, for `q < 1`, always returns a value inside the support.
pub fn q_noise_report<V: VariateSource + ?Sized>(
    rng: &mut V,
    eta: f64,
    tau: f64,
    q: f64,
    step: impl Into<StepSize>,
) -> StepReport {
    let step = step.into();
    let eta_cut = support_bound(tau, q);
    let mut start = eta;
    let mut rejections = 0;
    let mut tier = Tier::Heun;

    loop {
        let increment = heun_increment(rng, start, tau, q, step);
        let candidate = start + increment;
        if accepted(candidate, eta_cut) {
            return StepReport {
                value: candidate,
                attempts: rejections + 1,
                tier,
            };
        }

        rejections += 1;
        tier = Tier::after(rejections);
        match tier {
            Tier::Heun => {
                tracing::debug!(rejections, start, increment, "q-noise step out of bounds");
            }
            Tier::OrnsteinUhlenbeck => {
                start = eta_cut * ornstein_uhlenbeck(rng, start, tau, step.h());
                tracing::debug!(
                    rejections,
                    start,
                    increment,
                    "q-noise step out of bounds, resampling start from Ornstein-Uhlenbeck"
                );
            }
            Tier::HardReset => {
                tracing::warn!(
                    rejections,
                    start,
                    increment,
                    "q-noise step out of bounds, hard reset near the boundary"
                );
                let sign = if start.is_sign_negative() { -1.0 } else { 1.0 };
                return StepReport {
                    value: sign * eta_cut * (0.9 + 0.1 * rng.uniform()),
                    attempts: rejections,
                    tier,
                };
            }
        }
    }
}

/// Advance the q-noise process by one step.
///
/// See [`q_noise_report`] for the integration scheme and the boundary policy.
#[inline]
pub fn q_noise<V: VariateSource + ?Sized>(
    rng: &mut V,
    eta: f64,
    tau: f64,
    q: f64,
    step: impl Into<StepSize>,
) -> f64 {
    q_noise_report(rng, eta, tau, q, step).value
}
