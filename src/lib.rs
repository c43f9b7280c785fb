//! Non-Gaussian colored noise.
//!
//! `qnoise` generates self-correlated random sequences by integrating a
//! stochastic differential equation with the Heun method. Two parameters
//! control the noise: `tau`, the correlation time, and `q`, the statistics.
//! For `q = 1` the noise is an Ornstein-Uhlenbeck process, for `q < 1` it is
//! bounded (sub-Gaussian) and for `q > 1` it is heavy tailed (supra-Gaussian).
//!
//! ```
//! use qnoise::prelude::*;
//!
//! let mut gen = QNoiseGen::from_seed(2021);
//! let step = StepSize::new(0.001);
//! let mut eta = 0.0;
//! for _ in 0..10_000 {
//!     eta = gen.q_noise(eta, 1.0, 0.5, step);
//!     assert!(eta.abs() <= support_bound(1.0, 0.5));
//! }
//! ```

pub mod error;
pub mod noise;
pub mod simulator;
pub mod stats;
pub mod variate;

pub use crate::noise::heun::{q_noise, q_noise_report, StepReport, Tier};
pub use crate::noise::{
    gaussian_white_noise, normalized_tau, ornstein_uhlenbeck, potential_prime, q_noise_norm,
    support_bound, QNoiseGen, StepSize,
};
pub use crate::simulator::{simulate, simulate_with, RunConfig, Series, Trajectory};
pub use crate::variate::{VariateEngine, VariateSource};
pub use error::QNoiseError;

pub mod prelude {
    pub mod noise {
        pub use crate::noise::{
            gaussian_white_noise, heun::q_noise, heun::q_noise_report, normalized_tau,
            ornstein_uhlenbeck, potential_prime, q_noise_norm, support_bound,
        };
    }
    pub mod stats {
        pub use crate::stats::{acceptance, summary, Acceptance, Histogram, Summary};
    }

    pub use crate::error::QNoiseError;
    pub use crate::noise::{support_bound, QNoiseGen, StepReport, StepSize, Tier};
    pub use crate::simulator::output::{default_file_name, write_series};
    pub use crate::simulator::{simulate, simulate_with, Escalations, RunConfig, Series, Trajectory};
    pub use crate::variate::{VariateEngine, VariateSource};
}
