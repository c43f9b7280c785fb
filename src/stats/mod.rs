//! Statistical checks of generated series against the stationary q-density.
//!
//! The stationary density of the q-noise process is
//!
//! ```text
//! q = 1:  p(x) ∝ exp(-tau x^2)
//! q < 1:  p(x) ∝ (1 - (x / w)^2)^(1 / (1 - q)),  w = ((1 - q) tau)^(-1/2), zero for |x| > w
//! q > 1:  p(x) ∝ (1 + tau (q - 1) x^2)^(1 / (1 - q))
//! ```
//!
//! [`acceptance`] bins a series, evaluates this density at the bin centres and
//! reports the mean absolute difference as a percentage of the histogram's
//! density range. A series is accepted below [`ACCEPTANCE_LIMIT`].

use serde::{Deserialize, Serialize};

use crate::error::QNoiseError;

/// Conventional number of histogram bins.
pub const DEFAULT_BINS: usize = 50;

/// Maximum histogram distance, in percent, for a series to be accepted.
pub const ACCEPTANCE_LIMIT: f64 = 10.0;

/// Fixed-width histogram normalised to a probability density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin centres
    pub centers: Vec<f64>,
    /// Density in each bin; integrates to one over the bins
    pub density: Vec<f64>,
    /// Width of every bin
    pub width: f64,
}

impl Histogram {
    /// Bin `samples` into `bins` equal bins spanning their minimum and maximum.
    pub fn from_samples(samples: &[f64], bins: usize) -> Result<Self, QNoiseError> {
        if samples.is_empty() {
            return Err(QNoiseError::EmptySeries);
        }
        let bins = bins.max(1);
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        // A constant series gets a unit-wide range so the single value lands in a bin.
        let range = if max > min { max - min } else { 1.0 };
        let width = range / bins as f64;

        let mut counts = vec![0usize; bins];
        for &x in samples {
            let idx = (((x - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let norm = samples.len() as f64 * width;
        Ok(Self {
            centers: (0..bins)
                .map(|i| min + (i as f64 + 0.5) * width)
                .collect(),
            density: counts.iter().map(|&c| c as f64 / norm).collect(),
            width,
        })
    }

    pub fn bins(&self) -> usize {
        self.centers.len()
    }
}

/// Unnormalised stationary density of the q-noise process at `x`.
pub fn stationary_density(x: f64, tau: f64, q: f64) -> f64 {
    if q == 1.0 {
        (-tau * x * x).exp()
    } else if q < 1.0 {
        let w = ((1.0 - q) * tau).powf(-0.5);
        let base = 1.0 - (x / w) * (x / w);
        if base <= 0.0 {
            0.0
        } else {
            base.powf(1.0 / (1.0 - q))
        }
    } else {
        (1.0 + tau * (q - 1.0) * x * x).powf(1.0 / (1.0 - q))
    }
}

/// Stationary density at each of the histogram's centres, normalised on the same bins.
pub fn theoretical_pdf(histogram: &Histogram, tau: f64, q: f64) -> Vec<f64> {
    let values: Vec<f64> = histogram
        .centers
        .iter()
        .map(|&x| stationary_density(x, tau, q))
        .collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return values;
    }
    values
        .into_iter()
        .map(|v| v / (total * histogram.width))
        .collect()
}

/// Mean absolute difference between two densities, as a percentage of the
/// range of `empirical`.
pub fn histogram_distance(empirical: &[f64], theory: &[f64]) -> f64 {
    let n = empirical.len().min(theory.len());
    if n == 0 {
        return 0.0;
    }
    let (min, max) = empirical
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let range = if max > min { max - min } else { 1.0 };
    let distance: f64 = empirical
        .iter()
        .zip(theory)
        .map(|(e, t)| (e - t).abs())
        .sum();
    distance / n as f64 / range * 100.0
}

/// Result of comparing a series with the stationary density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acceptance {
    /// Histogram distance in percent
    pub distance: f64,
    /// Whether `distance` is within [`ACCEPTANCE_LIMIT`]
    pub passed: bool,
}

/// Compare `samples` with the stationary density for `tau` and `q`.
///
/// For a series produced by the normalized variant pass the rescaled
/// correlation time, see [`crate::noise::normalized_tau`].
pub fn acceptance(samples: &[f64], tau: f64, q: f64) -> Result<Acceptance, QNoiseError> {
    let histogram = Histogram::from_samples(samples, DEFAULT_BINS)?;
    let theory = theoretical_pdf(&histogram, tau, q);
    let distance = histogram_distance(&histogram.density, &theory);
    Ok(Acceptance {
        distance,
        passed: distance <= ACCEPTANCE_LIMIT,
    })
}

/// Descriptive statistics of a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Fourth standardised moment; 3 for a Gaussian
    pub kurtosis: f64,
}

/// Mean, standard deviation, range and kurtosis of `samples`.
pub fn summary(samples: &[f64]) -> Result<Summary, QNoiseError> {
    use statrs::statistics::{Data, Distribution, Max, Min};

    if samples.is_empty() {
        return Err(QNoiseError::EmptySeries);
    }
    let n = samples.len();
    let data = Data::new(samples.to_vec());
    let mean = data.mean().unwrap_or(f64::NAN);
    let std_dev = if n > 1 {
        data.std_dev().unwrap_or(0.0)
    } else {
        0.0
    };

    let (m2, m4) = samples.iter().fold((0.0, 0.0), |(m2, m4), &x| {
        let d2 = (x - mean) * (x - mean);
        (m2 + d2, m4 + d2 * d2)
    });
    let kurtosis = if m2 > 0.0 {
        n as f64 * m4 / (m2 * m2)
    } else {
        f64::NAN
    };

    Ok(Summary {
        n,
        mean,
        std_dev,
        min: data.min(),
        max: data.max(),
        kurtosis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_histogram_integrates_to_one() {
        let samples: Vec<f64> = (0..1000).map(|i| (i as f64 / 999.0).powi(2)).collect();
        let hist = Histogram::from_samples(&samples, 20).unwrap();
        assert_eq!(hist.bins(), 20);
        let mass: f64 = hist.density.iter().map(|d| d * hist.width).sum();
        assert_relative_eq!(mass, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_histogram_places_maximum_in_last_bin() {
        let hist = Histogram::from_samples(&[0.0, 1.0, 2.0, 3.0], 3).unwrap();
        assert_relative_eq!(hist.width, 1.0);
        assert_eq!(hist.centers, vec![0.5, 1.5, 2.5]);
        // 0 | 1 | 2 and 3
        assert_relative_eq!(hist.density[0], 0.25);
        assert_relative_eq!(hist.density[2], 0.5);
    }

    #[test]
    fn test_histogram_empty_and_constant() {
        assert!(matches!(
            Histogram::from_samples(&[], 10),
            Err(QNoiseError::EmptySeries)
        ));
        let hist = Histogram::from_samples(&[2.0; 5], 4).unwrap();
        assert_relative_eq!(hist.density[0], 1.0 / hist.width);
    }

    #[test]
    fn test_stationary_density_shapes() {
        assert_relative_eq!(stationary_density(0.0, 1.0, 1.0), 1.0);
        assert_relative_eq!(stationary_density(1.0, 2.0, 1.0), (-2.0f64).exp());
        // q < 1: zero outside the support w = sqrt(2) for tau = 1, q = 0.5
        assert_eq!(stationary_density(1.5, 1.0, 0.5), 0.0);
        assert_relative_eq!(stationary_density(1.0, 1.0, 0.5), 0.25);
        // q > 1: power-law tail
        assert_relative_eq!(stationary_density(1.0, 1.0, 2.0), 0.5);
    }

    #[test]
    fn test_distance_of_identical_densities_is_zero() {
        let d = vec![0.1, 0.5, 0.2];
        assert_eq!(histogram_distance(&d, &d), 0.0);
        assert_relative_eq!(histogram_distance(&[0.0, 1.0], &[0.5, 1.0]), 25.0);
    }

    #[test]
    fn test_uniform_series_fails_gaussian_acceptance() {
        let samples: Vec<f64> = (0..10_000).map(|i| -1.0 + 2.0 * i as f64 / 9_999.0).collect();
        let result = acceptance(&samples, 1.0, 1.0).unwrap();
        assert!(!result.passed, "distance = {}", result.distance);
    }

    #[test]
    fn test_summary() {
        let s = summary(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.n, 4);
        assert_relative_eq!(s.mean, 2.5);
        assert_relative_eq!(s.std_dev, (5.0f64 / 3.0).sqrt());
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        // m2 = 5, m4 = 10.25
        assert_relative_eq!(s.kurtosis, 4.0 * 10.25 / 25.0);
        assert!(matches!(summary(&[]), Err(QNoiseError::EmptySeries)));
    }
}
