//! The forecasting pipeline: normalize, fit, select, generate.

use crate::core::{ForecastPoint, ForecastResult, GapPolicy, HistoricalSeries};
use crate::error::{ForecastError, Result};
use crate::models::ForecastMethod;
use crate::selection::{fit_explicit, select_auto};
use crate::utils::stats::quantile_normal;
use std::collections::HashMap;

/// Longest supported forecast horizon, in months.
pub const MAX_HORIZON: usize = 24;

/// Per-call configuration.
///
/// The engine itself is pure and stateless; everything that varies
/// between call sites is explicit here.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// How missing months are handled during normalization.
    pub gap_policy: GapPolicy,
    /// Confidence level for the intervals, in (0, 1).
    pub confidence: f64,
    /// Domain floor applied to point estimates and lower bounds.
    /// Revenue forecasts clamp at zero; profit forecasts pass `None`
    /// and may remain negative.
    pub value_floor: Option<f64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            gap_policy: GapPolicy::default(),
            confidence: 0.95,
            value_floor: None,
        }
    }
}

impl ForecastConfig {
    /// Configuration for revenue series: forecasts floor at zero.
    pub fn revenue() -> Self {
        Self {
            value_floor: Some(0.0),
            ..Self::default()
        }
    }

    /// Configuration for profit series: values may remain negative.
    pub fn profit() -> Self {
        Self::default()
    }
}

/// Forecast `horizon` months ahead with the default configuration.
///
/// The pipeline per call: validate and normalize the history, detect
/// seasonality, fit one family (or backtest all of them for `auto`),
/// then generate dated points with confidence intervals. Any step fails
/// the whole call with a typed error; there is no partial result and no
/// state survives between calls.
///
/// # Example
/// ```
/// use revenue_forecast::{generate_forecast, ForecastMethod};
/// use std::collections::HashMap;
///
/// let history: HashMap<String, f64> = (1..=12)
///     .map(|m| (format!("2023-{m:02}"), 1000.0 + 50.0 * m as f64))
///     .collect();
///
/// let result = generate_forecast(&history, 3, ForecastMethod::Linear).unwrap();
/// assert_eq!(result.forecast.len(), 3);
/// assert_eq!(result.forecast[0].period.to_string(), "2024-01");
/// ```
pub fn generate_forecast(
    history: &HashMap<String, f64>,
    horizon: usize,
    method: ForecastMethod,
) -> Result<ForecastResult> {
    generate_forecast_with(history, horizon, method, &ForecastConfig::default())
}

/// Forecast with explicit configuration.
pub fn generate_forecast_with(
    history: &HashMap<String, f64>,
    horizon: usize,
    method: ForecastMethod,
    config: &ForecastConfig,
) -> Result<ForecastResult> {
    if horizon < 1 || horizon > MAX_HORIZON {
        return Err(ForecastError::InvalidHorizon(horizon));
    }

    let series = HistoricalSeries::normalize(history, config.gap_policy)?;
    series.require_min(method.min_observations())?;

    let selection = match method {
        ForecastMethod::Auto => select_auto(&series)?,
        concrete => fit_explicit(&series, concrete)?,
    };

    let values = selection.model.predict(horizon)?;
    let widths = selection.model.interval_width(horizon)?;
    let last = series
        .last_period()
        .ok_or(ForecastError::InsufficientData { needed: 1, got: 0 })?;

    let z = quantile_normal((1.0 + config.confidence) / 2.0);

    let mut forecast = Vec::with_capacity(horizon);
    let mut running_width = 0.0f64;
    for h in 0..horizon {
        // Uncertainty never shrinks further into the future, whatever
        // the family's own width function does.
        running_width = running_width.max(widths[h]);
        let half = z * running_width;

        let mut value = values[h];
        if let Some(floor) = config.value_floor {
            value = value.max(floor);
        }
        let mut lower = value - half;
        if let Some(floor) = config.value_floor {
            lower = lower.max(floor);
        }
        let upper = value + half;

        forecast.push(ForecastPoint {
            period: last.add_months(h as u32 + 1),
            value,
            lower_bound: lower,
            upper_bound: upper,
            confidence: config.confidence,
        });
    }

    Ok(ForecastResult {
        method: selection.method,
        forecast,
        accuracy: selection.accuracy,
    })
}
