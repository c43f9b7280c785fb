use thiserror::Error;

/// Errors raised by the run layer.
///
/// The step functions in [`crate::noise`] never fail; numerical excursions are
/// absorbed by the escalation ladder in [`crate::noise::heun`]. These variants
/// cover parameter validation, configuration loading and series output.
#[derive(Error, Debug)]
pub enum QNoiseError {
    #[error("Correlation time tau must be positive, got {0}")]
    NonPositiveTau(f64),
    #[error("Integration step H must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
    #[error("Normalized q-noise diverges for q >= 5/3, got q = {0}")]
    NormalizationDiverges(f64),
    #[error("Cannot compute statistics of an empty series")]
    EmptySeries,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write series: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to parse run configuration: {0}")]
    Config(#[from] serde_json::Error),
}
