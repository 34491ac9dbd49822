//! Linear trend regression via ordinary least squares.

use crate::core::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::metrics::r_squared;

/// Ordinary least squares of value against 0-based period index.
///
/// Forecast for step h is `intercept + slope * (n + h - 1)`. Interval
/// half-widths use the standard OLS prediction-interval formula, which
/// grows with distance from the mean index. Captures trend only.
#[derive(Debug, Clone, Default)]
pub struct LinearTrend {
    slope: Option<f64>,
    intercept: Option<f64>,
    /// Residual standard error with n-2 degrees of freedom.
    residual_se: Option<f64>,
    mean_index: f64,
    /// Sum of squared index deviations (Sxx).
    sxx: f64,
    r2: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    n: usize,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitted slope per month.
    pub fn slope(&self) -> Option<f64> {
        self.slope
    }

    /// Fitted intercept at index 0.
    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    /// In-sample coefficient of determination.
    pub fn r2(&self) -> Option<f64> {
        self.r2
    }
}

impl Forecaster for LinearTrend {
    fn fit(&mut self, series: &HistoricalSeries) -> Result<()> {
        let values = series.values();
        let n = values.len();
        if n < 3 {
            return Err(ForecastError::InsufficientData { needed: 3, got: n });
        }

        let nf = n as f64;
        let mean_x = (nf - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / nf;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxx += dx * dx;
            sxy += dx * (y - mean_y);
        }

        if sxx < f64::EPSILON {
            return Err(ForecastError::ModelFit(
                "singular regression design: zero index variance".into(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let fitted: Vec<f64> = (0..n).map(|i| intercept + slope * i as f64).collect();
        let residuals: Vec<f64> = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        let residual_se = (sse / (nf - 2.0)).sqrt();
        if !residual_se.is_finite() {
            return Err(ForecastError::ModelFit(
                "non-finite residual variance in trend regression".into(),
            ));
        }

        self.r2 = Some(r_squared(values, &fitted));
        self.slope = Some(slope);
        self.intercept = Some(intercept);
        self.residual_se = Some(residual_se);
        self.mean_index = mean_x;
        self.sxx = sxx;
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.n = n;
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let slope = self.slope.ok_or(ForecastError::FitRequired)?;
        let intercept = self.intercept.ok_or(ForecastError::FitRequired)?;

        Ok((1..=horizon)
            .map(|h| intercept + slope * (self.n + h - 1) as f64)
            .collect())
    }

    fn interval_width(&self, horizon: usize) -> Result<Vec<f64>> {
        let se = self.residual_se.ok_or(ForecastError::FitRequired)?;
        let nf = self.n as f64;

        Ok((1..=horizon)
            .map(|h| {
                let x0 = (self.n + h - 1) as f64;
                let d = x0 - self.mean_index;
                se * (1.0 + 1.0 / nf + d * d / self.sxx).sqrt()
            })
            .collect())
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &'static str {
        "LinearTrend"
    }
}
