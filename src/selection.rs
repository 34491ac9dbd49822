//! Automatic model selection via holdout backtesting.

use crate::core::{Accuracy, HistoricalSeries};
use crate::error::{ForecastError, Result};
use crate::models::{
    AutoRegressive, BoxedForecaster, ExponentialSmoothing, ForecastMethod, Forecaster, LinearTrend,
};
use crate::seasonality::{detect_seasonality, MIN_SEASONAL_FIT};
use crate::utils::metrics::{mape, r_squared};

/// Minimum observations before holdout backtesting is attempted; below
/// this, `auto` falls back to linear trend and says so.
pub const MIN_BACKTEST_OBSERVATIONS: usize = 6;

/// The concrete model families `auto` chooses between, in tie-break order.
const CANDIDATE_FAMILIES: [ForecastMethod; 3] = [
    ForecastMethod::Linear,
    ForecastMethod::Exponential,
    ForecastMethod::Arima,
];

/// Outcome of selection: a fitted model plus its accuracy metadata.
pub struct Selection {
    /// The concrete family that will generate the forecast.
    pub method: ForecastMethod,
    /// Model fitted on the full series.
    pub model: BoxedForecaster,
    /// Accuracy carried into the result.
    pub accuracy: Accuracy,
}

/// Build a fresh, unfitted candidate for a concrete family.
///
/// The seasonal smoothing variant is gated on the full normalized series:
/// the detector must flag a pattern and the series must carry at least
/// two full years. Backtest refits use the same gated family.
fn build_candidate(method: ForecastMethod, seasonal: bool) -> BoxedForecaster {
    match method {
        ForecastMethod::Linear => Box::new(LinearTrend::new()),
        ForecastMethod::Exponential => {
            if seasonal {
                Box::new(ExponentialSmoothing::holt_winters(12))
            } else {
                Box::new(ExponentialSmoothing::holt())
            }
        }
        ForecastMethod::Arima => Box::new(AutoRegressive::new()),
        ForecastMethod::Auto => unreachable!("auto is not a concrete family"),
    }
}

/// In-sample R² and MAPE over the positions where the model defines
/// fitted values (warmup positions are NaN for some families).
fn in_sample_accuracy(series: &HistoricalSeries, model: &dyn Forecaster) -> (Option<f64>, Option<f64>) {
    let Some(fitted) = model.fitted_values() else {
        return (None, None);
    };
    let (actual, predicted): (Vec<f64>, Vec<f64>) = series
        .values()
        .iter()
        .zip(fitted.iter())
        .filter(|(_, f)| f.is_finite())
        .map(|(y, f)| (*y, *f))
        .unzip();
    if actual.len() < 2 {
        return (None, None);
    }
    (
        Some(r_squared(&actual, &predicted)),
        mape(&actual, &predicted),
    )
}

/// Fit the requested family on the full series, bypassing selection.
///
/// A failure of the requested family fails the whole call; no other
/// family is substituted.
pub fn fit_explicit(series: &HistoricalSeries, method: ForecastMethod) -> Result<Selection> {
    let seasonal =
        series.len() >= MIN_SEASONAL_FIT && detect_seasonality(series).seasonal;
    let mut model = build_candidate(method, seasonal);
    model.fit(series)?;

    let (r2, in_sample_mape) = in_sample_accuracy(series, model.as_ref());
    Ok(Selection {
        method,
        model,
        accuracy: Accuracy {
            r2,
            mape: in_sample_mape,
            fallback_reason: None,
        },
    })
}

/// Backtest all families and pick the winner.
///
/// Holds out the last `min(3, n/4)` observations, refits each candidate
/// on the remainder, and scores holdout MAPE against actuals. Lowest
/// MAPE wins; exact ties break by higher in-sample R² of the full fit,
/// then by the fixed family order, so candidate evaluation order never
/// affects the outcome. With fewer than six observations, falls back to
/// linear trend and records the reason.
pub fn select_auto(series: &HistoricalSeries) -> Result<Selection> {
    let n = series.len();
    if n < MIN_BACKTEST_OBSERVATIONS {
        let mut selection = fit_explicit(series, ForecastMethod::Linear)?;
        selection.accuracy.mape = None;
        selection.accuracy.fallback_reason = Some(format!(
            "history too short for backtest selection ({n} < {MIN_BACKTEST_OBSERVATIONS} observations); using linear trend"
        ));
        return Ok(selection);
    }

    let holdout = (n / 4).min(3);
    let train = series.head(n - holdout);
    let actual = &series.values()[n - holdout..];
    let seasonal =
        n >= MIN_SEASONAL_FIT && detect_seasonality(series).seasonal;

    let mut best: Option<(ForecastMethod, BoxedForecaster, f64, f64)> = None;

    for family in CANDIDATE_FAMILIES {
        let score = backtest_score(&train, family, seasonal, actual);
        if !score.is_finite() {
            continue;
        }

        // Refit on the full series; the in-sample R² doubles as the
        // tie-break key.
        let mut full = build_candidate(family, seasonal);
        if full.fit(series).is_err() {
            continue;
        }
        let (r2, _) = in_sample_accuracy(series, full.as_ref());
        let r2 = r2.unwrap_or(f64::NEG_INFINITY);

        let better = match &best {
            None => true,
            Some((_, _, best_score, best_r2)) => {
                score < *best_score || (score == *best_score && r2 > *best_r2)
            }
        };
        if better {
            best = Some((family, full, score, r2));
        }
    }

    let (method, model, score, r2) = best.ok_or_else(|| {
        ForecastError::ModelFit("every candidate model failed backtesting".into())
    })?;

    Ok(Selection {
        method,
        model,
        accuracy: Accuracy {
            r2: if r2.is_finite() { Some(r2) } else { None },
            mape: Some(score),
            fallback_reason: None,
        },
    })
}

/// Holdout MAPE for one family; infinite when the family cannot be
/// fitted or scored on this split.
fn backtest_score(
    train: &HistoricalSeries,
    family: ForecastMethod,
    seasonal: bool,
    actual: &[f64],
) -> f64 {
    let mut model = build_candidate(family, seasonal);
    if model.fit(train).is_err() {
        return f64::INFINITY;
    }
    let Ok(predicted) = model.predict(actual.len()) else {
        return f64::INFINITY;
    };
    mape(actual, &predicted).unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::make_series;

    #[test]
    fn explicit_linear_reports_in_sample_accuracy() {
        let values: Vec<f64> = (0..12).map(|i| 1000.0 + 50.0 * i as f64).collect();
        let series = make_series(&values);

        let selection = fit_explicit(&series, ForecastMethod::Linear).unwrap();
        assert_eq!(selection.method, ForecastMethod::Linear);
        assert!(selection.accuracy.r2.unwrap() > 0.999);
        assert!(selection.accuracy.fallback_reason.is_none());
    }

    #[test]
    fn explicit_method_failure_is_not_substituted() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0]);
        let result = fit_explicit(&series, ForecastMethod::Arima);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { needed: 5, got: 4 })
        ));
    }

    #[test]
    fn auto_prefers_linear_on_clean_trend() {
        let values: Vec<f64> = (0..12).map(|i| 1000.0 + 50.0 * i as f64).collect();
        let series = make_series(&values);

        let selection = select_auto(&series).unwrap();
        assert_eq!(selection.method, ForecastMethod::Linear);
        assert!(selection.accuracy.mape.unwrap() < 1.0);
        assert!(selection.accuracy.fallback_reason.is_none());
    }

    #[test]
    fn auto_falls_back_below_backtest_minimum() {
        let values = vec![100.0, 120.0, 140.0, 160.0, 180.0];
        let series = make_series(&values);

        let selection = select_auto(&series).unwrap();
        assert_eq!(selection.method, ForecastMethod::Linear);
        let reason = selection.accuracy.fallback_reason.unwrap();
        assert!(reason.contains("too short"));
        assert!(selection.accuracy.mape.is_none());
    }

    #[test]
    fn auto_is_deterministic() {
        let values: Vec<f64> = (0..18)
            .map(|i| 5000.0 + 120.0 * i as f64 + 80.0 * ((i * 3) % 7) as f64)
            .collect();
        let series = make_series(&values);

        let a = select_auto(&series).unwrap();
        let b = select_auto(&series).unwrap();
        assert_eq!(a.method, b.method);
        assert_eq!(a.accuracy, b.accuracy);
    }

    #[test]
    fn auto_picks_seasonal_smoothing_for_annual_pattern() {
        let pattern = [
            1500.0, -1200.0, 900.0, -400.0, 200.0, 1100.0, -800.0, 400.0, -1500.0, 1800.0,
            -900.0, -1100.0,
        ];
        let values: Vec<f64> = (0..24)
            .map(|i| 10000.0 + 50.0 * i as f64 + pattern[i % 12])
            .collect();
        let series = make_series(&values);

        let selection = select_auto(&series).unwrap();
        assert_eq!(selection.method, ForecastMethod::Exponential);
        assert_eq!(selection.model.name(), "HoltWinters");
    }
}
