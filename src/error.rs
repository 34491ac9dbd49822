//! Error types for the revenue-forecast engine.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while normalizing history or fitting models.
///
/// Every failure surfaces as one of these typed values; a call either
/// yields a full horizon-length result or fails atomically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A history key does not match the `YYYY-MM` period format.
    #[error("invalid period key: {0:?} (expected YYYY-MM)")]
    InvalidPeriodKey(String),

    /// A history value is NaN or infinite.
    #[error("non-finite value {value} for period {period}")]
    NonFiniteValue { period: String, value: f64 },

    /// Contiguous history is shorter than the requested method's minimum.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Requested horizon is outside the supported range.
    #[error("horizon must be between 1 and 24 months, got {0}")]
    InvalidHorizon(usize),

    /// A model fit was numerically degenerate.
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Model was asked to predict before being fitted.
    #[error("model must be fitted before prediction")]
    FitRequired,
}
