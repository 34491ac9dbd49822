//! ARIMA-style autoregressive model: optional first differencing plus an
//! AR(p) fit with the order chosen by AIC.

use crate::core::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::metrics::r_squared;
use crate::utils::stats::variance;

/// Candidate autoregressive orders.
const MAX_ORDER: usize = 3;
/// Impulse-response weights beyond this magnitude mark an explosive fit.
const PSI_DIVERGENCE_LIMIT: f64 = 100.0;
/// Longest horizon the engine ever requests.
const MAX_HORIZON: usize = 24;

/// Autoregressive forecaster with automatic differencing and order choice.
///
/// The series is differenced once when the variance-ratio test says it is
/// not trend-stationary. AR coefficients are estimated by conditional
/// least squares on the centered (differenced) series via Cholesky normal
/// equations; p ∈ {1,2,3} is chosen by minimum AIC. Explosive estimates
/// (diverging impulse responses) are rejected rather than silently used.
///
/// Forecast-error variance accumulates innovation variance through the
/// sum of squared impulse-response coefficients, cumulated once more when
/// the series was differenced.
#[derive(Debug, Clone, Default)]
pub struct AutoRegressive {
    order: Option<usize>,
    d: usize,
    coefficients: Vec<f64>,
    /// Mean of the (differenced) working series.
    mean: f64,
    sigma2: Option<f64>,
    aic: Option<f64>,
    original: Option<Vec<f64>>,
    working: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    r2: Option<f64>,
    n: usize,
}

/// First difference of a series.
fn difference(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Variance-ratio trend-stationarity check: differencing is warranted
/// when it removes a substantial share of the variance.
fn needs_differencing(series: &[f64]) -> bool {
    let var_0 = variance(series);
    if !var_0.is_finite() || var_0 <= 0.0 {
        return false;
    }
    let diff = difference(series);
    let var_1 = variance(&diff);
    var_1.is_finite() && var_1 / var_0 < 0.9
}

/// Solve a symmetric positive definite system via Cholesky decomposition.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }
    Some(x)
}

/// Impulse-response weights ψ of an AR(p), ψ_0 = 1.
fn psi_weights(coefficients: &[f64], count: usize) -> Vec<f64> {
    let p = coefficients.len();
    let mut psi = Vec::with_capacity(count);
    psi.push(1.0);
    for j in 1..count {
        let mut w = 0.0;
        for (i, &phi) in coefficients.iter().enumerate().take(j.min(p)) {
            w += phi * psi[j - 1 - i];
        }
        psi.push(w);
    }
    psi
}

struct ArCandidate {
    order: usize,
    coefficients: Vec<f64>,
    sigma2: f64,
    aic: f64,
}

impl AutoRegressive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chosen AR order after fitting.
    pub fn order(&self) -> Option<usize> {
        self.order
    }

    /// Differencing order applied (0 or 1).
    pub fn differencing(&self) -> usize {
        self.d
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    /// In-sample coefficient of determination on the original scale.
    pub fn r2(&self) -> Option<f64> {
        self.r2
    }

    /// Conditional least squares fit of AR(p) on a centered series.
    fn fit_order(centered: &[f64], p: usize) -> Option<ArCandidate> {
        let m = centered.len();
        if m < 2 * p + 1 {
            return None;
        }

        // Normal equations over t = p..m with lagged regressors.
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for t in p..m {
            for i in 0..p {
                xty[i] += centered[t - 1 - i] * centered[t];
                for j in 0..p {
                    xtx[i][j] += centered[t - 1 - i] * centered[t - 1 - j];
                }
            }
        }
        // Small ridge keeps the decomposition stable on near-constant data.
        for i in 0..p {
            xtx[i][i] += 1e-8;
        }

        let coefficients = solve_symmetric(&xtx, &xty)?;

        let psi = psi_weights(&coefficients, MAX_HORIZON);
        if psi.iter().any(|w| w.abs() > PSI_DIVERGENCE_LIMIT) {
            return None;
        }

        let mut sse = 0.0;
        for t in p..m {
            let mut pred = 0.0;
            for (i, &phi) in coefficients.iter().enumerate() {
                pred += phi * centered[t - 1 - i];
            }
            let e = centered[t] - pred;
            sse += e * e;
        }
        let n_eff = (m - p) as f64;
        let sigma2 = sse / n_eff;
        let aic = n_eff * sigma2.max(1e-12).ln() + 2.0 * (p as f64 + 1.0);

        Some(ArCandidate {
            order: p,
            coefficients,
            sigma2,
            aic,
        })
    }

    fn prediction_on_working(&self, centered: &[f64], t: usize) -> f64 {
        let mut pred = 0.0;
        for (i, &phi) in self.coefficients.iter().enumerate() {
            pred += phi * centered[t - 1 - i];
        }
        pred
    }
}

impl Forecaster for AutoRegressive {
    fn fit(&mut self, series: &HistoricalSeries) -> Result<()> {
        let values = series.values();
        if values.len() < 5 {
            return Err(ForecastError::InsufficientData {
                needed: 5,
                got: values.len(),
            });
        }

        let d = usize::from(needs_differencing(values));
        let working: Vec<f64> = if d == 1 {
            difference(values)
        } else {
            values.to_vec()
        };

        let mean = working.iter().sum::<f64>() / working.len() as f64;
        let centered: Vec<f64> = working.iter().map(|v| v - mean).collect();

        let best = (1..=MAX_ORDER)
            .filter_map(|p| Self::fit_order(&centered, p))
            .min_by(|a, b| a.aic.total_cmp(&b.aic))
            .ok_or_else(|| {
                ForecastError::ModelFit("no stable autoregressive order found".into())
            })?;

        self.order = Some(best.order);
        self.d = d;
        self.coefficients = best.coefficients;
        self.mean = mean;
        self.sigma2 = Some(best.sigma2);
        self.aic = Some(best.aic);
        self.n = values.len();

        // Map fitted values back to the original scale; the first p (+d)
        // positions have no prediction and stay NaN.
        let p = best.order;
        let m = centered.len();
        let mut fitted = vec![f64::NAN; values.len()];
        for t in p..m {
            let pred = self.prediction_on_working(&centered, t) + mean;
            fitted[t + d] = if d == 1 { values[t] + pred } else { pred };
        }
        let residuals: Vec<f64> = values
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| if f.is_finite() { y - f } else { 0.0 })
            .collect();

        let valid: (Vec<f64>, Vec<f64>) = values
            .iter()
            .zip(fitted.iter())
            .filter(|(_, f)| f.is_finite())
            .map(|(y, f)| (*y, *f))
            .unzip();
        self.r2 = Some(r_squared(&valid.0, &valid.1));

        self.original = Some(values.to_vec());
        self.working = Some(working);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let original = self.original.as_ref().ok_or(ForecastError::FitRequired)?;
        let working = self.working.as_ref().ok_or(ForecastError::FitRequired)?;

        let mut centered: Vec<f64> = working.iter().map(|v| v - self.mean).collect();
        let mut forecasts_working = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let t = centered.len();
            let pred = self.prediction_on_working(&centered, t);
            centered.push(pred);
            forecasts_working.push(pred + self.mean);
        }

        if self.d == 1 {
            // Integrate back: cumulative sum from the last observed value.
            let mut last = *original.last().ok_or(ForecastError::FitRequired)?;
            Ok(forecasts_working
                .into_iter()
                .map(|diff| {
                    last += diff;
                    last
                })
                .collect())
        } else {
            Ok(forecasts_working)
        }
    }

    fn interval_width(&self, horizon: usize) -> Result<Vec<f64>> {
        let sigma2 = self.sigma2.ok_or(ForecastError::FitRequired)?;

        let psi = psi_weights(&self.coefficients, horizon.max(1));
        let weights: Vec<f64> = if self.d == 1 {
            // Differenced models accumulate: Ψ_j = Σ_{i<=j} ψ_i.
            psi.iter()
                .scan(0.0, |acc, w| {
                    *acc += w;
                    Some(*acc)
                })
                .collect()
        } else {
            psi
        };

        let mut cumulative = 0.0;
        Ok(weights
            .iter()
            .take(horizon)
            .map(|w| {
                cumulative += w * w;
                (sigma2 * cumulative).sqrt()
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
        "AutoRegressive"
    }
}
