//! Exponential smoothing: Holt's linear trend, optionally with an
//! additive seasonal component (Holt-Winters).

use crate::core::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Grid of smoothing weights searched during fitting. Deterministic by
/// construction: fixed bounds, fixed steps, fixed iteration order.
const WEIGHT_STEPS: usize = 19; // 0.05..=0.95 step 0.05
const SEASONAL_WEIGHT_STEPS: usize = 10; // 0.05..=0.95 step 0.10

fn weight(i: usize) -> f64 {
    i as f64 * 0.05
}

fn seasonal_weight(i: usize) -> f64 {
    0.05 + (i - 1) as f64 * 0.10
}

/// Holt double exponential smoothing with an optional additive seasonal
/// term of period 12.
///
/// Model equations (additive seasonal shown; drop `s` for plain Holt):
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + h·b_t + s_{t+h-m}`
///
/// Weights are chosen by bounded grid search minimizing one-step-ahead
/// SSE. Smoothing has no closed-form prediction variance, so interval
/// half-widths scale the empirical residual deviation by `√h`.
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    seasonal_period: Option<usize>,
    alpha: Option<f64>,
    beta: Option<f64>,
    gamma: Option<f64>,
    level: Option<f64>,
    trend: Option<f64>,
    seasonals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_std: Option<f64>,
    n: usize,
}

impl ExponentialSmoothing {
    /// Plain Holt level + trend smoothing.
    pub fn holt() -> Self {
        Self {
            seasonal_period: None,
            alpha: None,
            beta: None,
            gamma: None,
            level: None,
            trend: None,
            seasonals: None,
            fitted: None,
            residuals: None,
            residual_std: None,
            n: 0,
        }
    }

    /// Additive Holt-Winters with the given seasonal period.
    pub fn holt_winters(period: usize) -> Self {
        Self {
            seasonal_period: Some(period),
            ..Self::holt()
        }
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    pub fn gamma(&self) -> Option<f64> {
        self.gamma
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn trend(&self) -> Option<f64> {
        self.trend
    }

    pub fn seasonals(&self) -> Option<&[f64]> {
        self.seasonals.as_deref()
    }

    /// Whether the seasonal variant is active.
    pub fn is_seasonal(&self) -> bool {
        self.seasonal_period.is_some()
    }

    /// Initial level and trend for plain Holt.
    fn initialize_holt(values: &[f64]) -> (f64, f64) {
        (values[0], values[1] - values[0])
    }

    /// Initial state from the first season: level is the first-season
    /// mean, trend comes from seasonal differences when two full seasons
    /// exist, seasonal indices are first-season deviations normalized to
    /// sum to zero.
    fn initialize_seasonal(values: &[f64], period: usize) -> (f64, f64, Vec<f64>) {
        let level = values[..period].iter().sum::<f64>() / period as f64;

        let trend = if values.len() >= 2 * period {
            (0..period)
                .map(|i| (values[period + i] - values[i]) / period as f64)
                .sum::<f64>()
                / period as f64
        } else {
            0.0
        };

        let mut seasonals: Vec<f64> = values[..period].iter().map(|y| y - level).collect();
        let adjustment = seasonals.iter().sum::<f64>() / period as f64;
        for s in &mut seasonals {
            *s -= adjustment;
        }

        (level, trend, seasonals)
    }

    /// One pass of the smoothing recursion. Returns final state, fitted
    /// values and the SSE over post-warmup one-step errors.
    fn run(
        values: &[f64],
        period: Option<usize>,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> (f64, f64, Vec<f64>, Vec<f64>, f64) {
        match period {
            None => {
                let (mut l, mut b) = Self::initialize_holt(values);
                let mut fitted = Vec::with_capacity(values.len());
                let mut sse = 0.0;

                fitted.push(l);
                for &y in values.iter().skip(1) {
                    let forecast = l + b;
                    fitted.push(forecast);
                    let e = y - forecast;
                    sse += e * e;

                    let l_prev = l;
                    l = alpha * y + (1.0 - alpha) * (l_prev + b);
                    b = beta * (l - l_prev) + (1.0 - beta) * b;
                }
                (l, b, Vec::new(), fitted, sse)
            }
            Some(m) => {
                let (mut l, mut b, mut seasonals) = Self::initialize_seasonal(values, m);
                let mut fitted = Vec::with_capacity(values.len());
                let mut sse = 0.0;

                for (t, &y) in values.iter().enumerate() {
                    let s = seasonals[t % m];
                    let forecast = l + b + s;
                    fitted.push(forecast);
                    if t >= m {
                        let e = y - forecast;
                        sse += e * e;
                    }

                    let l_prev = l;
                    l = alpha * (y - s) + (1.0 - alpha) * (l_prev + b);
                    b = beta * (l - l_prev) + (1.0 - beta) * b;
                    seasonals[t % m] = gamma * (y - l) + (1.0 - gamma) * s;
                }
                (l, b, seasonals, fitted, sse)
            }
        }
    }

    /// Exhaustive bounded grid search over the smoothing weights.
    fn search_weights(values: &[f64], period: Option<usize>) -> Result<(f64, f64, f64)> {
        let mut best = (0.3, 0.1, 0.1);
        let mut best_sse = f64::INFINITY;

        let gamma_range = if period.is_some() {
            1..=SEASONAL_WEIGHT_STEPS
        } else {
            1..=1
        };

        for ai in 1..=WEIGHT_STEPS {
            for bi in 1..=WEIGHT_STEPS {
                for gi in gamma_range.clone() {
                    let (alpha, beta, gamma) = (weight(ai), weight(bi), seasonal_weight(gi));
                    let (.., sse) = Self::run(values, period, alpha, beta, gamma);
                    if sse.is_finite() && sse < best_sse {
                        best_sse = sse;
                        best = (alpha, beta, gamma);
                    }
                }
            }
        }

        if !best_sse.is_finite() {
            return Err(ForecastError::ModelFit(
                "smoothing weight search did not converge".into(),
            ));
        }
        Ok(best)
    }
}

impl Forecaster for ExponentialSmoothing {
    fn fit(&mut self, series: &HistoricalSeries) -> Result<()> {
        let values = series.values();
        let needed = match self.seasonal_period {
            Some(m) => m + 5,
            None => 3,
        };
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let (alpha, beta, gamma) = Self::search_weights(values, self.seasonal_period)?;
        let (level, trend, seasonals, fitted, _) =
            Self::run(values, self.seasonal_period, alpha, beta, gamma);

        if !level.is_finite() || !trend.is_finite() {
            return Err(ForecastError::ModelFit(
                "smoothing state diverged during fitting".into(),
            ));
        }

        let residuals: Vec<f64> = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        // Skip warmup residuals: the first value for Holt, the first full
        // season for Holt-Winters.
        let warmup = self.seasonal_period.unwrap_or(1);
        let post: &[f64] = &residuals[warmup.min(residuals.len())..];
        let variance = if post.is_empty() {
            0.0
        } else {
            post.iter().map(|r| r * r).sum::<f64>() / post.len() as f64
        };

        self.alpha = Some(alpha);
        self.beta = Some(beta);
        self.gamma = self.seasonal_period.map(|_| gamma);
        self.level = Some(level);
        self.trend = Some(trend);
        self.seasonals = self.seasonal_period.map(|_| seasonals);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.residual_std = Some(variance.sqrt());
        self.n = values.len();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let l = self.level.ok_or(ForecastError::FitRequired)?;
        let b = self.trend.ok_or(ForecastError::FitRequired)?;

        Ok((1..=horizon)
            .map(|h| {
                let mut v = l + h as f64 * b;
                if let (Some(m), Some(seasonals)) = (self.seasonal_period, &self.seasonals) {
                    v += seasonals[(self.n + h - 1) % m];
                }
                v
            })
            .collect())
    }

    fn interval_width(&self, horizon: usize) -> Result<Vec<f64>> {
        let std = self.residual_std.ok_or(ForecastError::FitRequired)?;
        Ok((1..=horizon).map(|h| std * (h as f64).sqrt()).collect())
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &'static str {
        if self.seasonal_period.is_some() {
            "HoltWinters"
        } else {
            "Holt"
        }
    }
}
