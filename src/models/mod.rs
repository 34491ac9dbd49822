//! Forecasting model families and their common capability trait.

use crate::core::HistoricalSeries;
use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

mod arima;
mod exponential;
mod linear;

pub use arima::AutoRegressive;
pub use exponential::ExponentialSmoothing;
pub use linear::LinearTrend;

/// Selectable forecasting method.
///
/// A closed tagged variant instead of ad hoc string branching: `Auto` runs
/// backtest selection over the three concrete families, the others bypass
/// selection entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    Auto,
    Linear,
    Exponential,
    Arima,
}

impl ForecastMethod {
    /// Lowercase wire name, matching the presentation contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Auto => "auto",
            ForecastMethod::Linear => "linear",
            ForecastMethod::Exponential => "exponential",
            ForecastMethod::Arima => "arima",
        }
    }

    /// Minimum contiguous observations the method needs.
    ///
    /// Auto needs only the generic minimum here; with fewer than six
    /// observations it falls back to linear trend rather than failing.
    pub fn min_observations(&self) -> usize {
        match self {
            ForecastMethod::Auto | ForecastMethod::Linear | ForecastMethod::Exponential => 3,
            ForecastMethod::Arima => 5,
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(ForecastMethod::Auto),
            "linear" => Ok(ForecastMethod::Linear),
            "exponential" => Ok(ForecastMethod::Exponential),
            "arima" => Ok(ForecastMethod::Arima),
            other => Err(ForecastError::ModelFit(format!(
                "unknown forecast method {other:?}"
            ))),
        }
    }
}

/// Common interface for all model families.
///
/// Object-safe; the selector works over `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the normalized series.
    fn fit(&mut self, series: &HistoricalSeries) -> Result<()>;

    /// Point predictions for steps `1..=horizon` ahead of the series end.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// One-sigma interval half-widths for steps `1..=horizon`.
    ///
    /// Each family supplies its own width function; the engine scales by
    /// the confidence z-score and enforces monotonicity across families.
    fn interval_width(&self, horizon: usize) -> Result<Vec<f64>>;

    /// In-sample predictions, where the family defines them.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// In-sample residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Display name of the model.
    fn name(&self) -> &'static str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::GapPolicy;
    use std::collections::HashMap;

    pub(crate) fn make_series(values: &[f64]) -> HistoricalSeries {
        let mut year = 2020;
        let mut month = 1;
        let mut history = HashMap::new();
        for &v in values {
            history.insert(format!("{year:04}-{month:02}"), v);
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        HistoricalSeries::normalize(&history, GapPolicy::default()).unwrap()
    }

    #[test]
    fn method_round_trips_through_strings() {
        for method in [
            ForecastMethod::Auto,
            ForecastMethod::Linear,
            ForecastMethod::Exponential,
            ForecastMethod::Arima,
        ] {
            assert_eq!(method.as_str().parse::<ForecastMethod>().unwrap(), method);
        }
        assert!("prophet".parse::<ForecastMethod>().is_err());
    }

    #[test]
    fn method_minimums() {
        assert_eq!(ForecastMethod::Linear.min_observations(), 3);
        assert_eq!(ForecastMethod::Arima.min_observations(), 5);
    }

    #[test]
    fn boxed_forecaster_dispatches() {
        let mut model: BoxedForecaster = Box::new(LinearTrend::new());
        assert!(!model.is_fitted());

        let series = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        model.fit(&series).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(4).unwrap().len(), 4);
        assert_eq!(model.name(), "LinearTrend");
    }
}
