//! Month-of-year seasonality detection on trend-adjusted residuals.

use crate::core::HistoricalSeries;

/// Minimum observations before detection is attempted.
pub const MIN_OBSERVATIONS: usize = 12;
/// Observations required before the seasonal smoothing variant activates.
pub const MIN_SEASONAL_FIT: usize = 24;
/// Between-month variance must exceed residual variance by this ratio.
const STRENGTH_THRESHOLD: f64 = 2.0;

/// Result of seasonality detection.
///
/// `seasonal` is advisory: it only activates the seasonal smoothing
/// variant when the full series also has at least [`MIN_SEASONAL_FIT`]
/// observations.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalityProfile {
    /// Whether a recurring 12-month pattern was flagged.
    pub seasonal: bool,
    /// Ratio of between-month variance to within-month residual variance.
    pub strength: f64,
    /// Mean trend-adjusted deviation per calendar month (index 0 = January).
    pub monthly_deviations: [f64; 12],
}

impl SeasonalityProfile {
    fn flat() -> Self {
        Self {
            seasonal: false,
            strength: 0.0,
            monthly_deviations: [0.0; 12],
        }
    }
}

/// Detect a recurring calendar-month pattern.
///
/// Removes the least-squares trend line, buckets residuals by calendar
/// month, and flags seasonality when the variance between month means
/// clearly exceeds the residual variance within months. With fewer than
/// twelve observations this reports not-seasonal without error.
pub fn detect_seasonality(series: &HistoricalSeries) -> SeasonalityProfile {
    let values = series.values();
    let n = values.len();
    if n < MIN_OBSERVATIONS {
        return SeasonalityProfile::flat();
    }

    // Closed-form OLS detrend; cannot degenerate for n >= 12.
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
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let mut sums = [0.0f64; 12];
    let mut counts = [0usize; 12];
    let mut residuals = Vec::with_capacity(n);
    for (i, (&y, period)) in values.iter().zip(series.periods()).enumerate() {
        let r = y - (intercept + slope * i as f64);
        let bucket = period.month_index();
        sums[bucket] += r;
        counts[bucket] += 1;
        residuals.push((bucket, r));
    }

    let mut monthly_deviations = [0.0f64; 12];
    for b in 0..12 {
        if counts[b] > 0 {
            monthly_deviations[b] = sums[b] / counts[b] as f64;
        }
    }

    let occupied = counts.iter().filter(|&&c| c > 0).count();
    if occupied < 2 || n <= occupied {
        return SeasonalityProfile::flat();
    }

    // Between-month variance of bucket means vs within-month residual
    // variance, a one-way variance decomposition of the detrended series.
    let between: f64 = (0..12)
        .map(|b| counts[b] as f64 * monthly_deviations[b].powi(2))
        .sum::<f64>()
        / (occupied - 1) as f64;
    let within: f64 = residuals
        .iter()
        .map(|&(b, r)| (r - monthly_deviations[b]).powi(2))
        .sum::<f64>()
        / (n - occupied) as f64;

    let strength = if within > 1e-12 {
        between / within
    } else if between > 1e-12 {
        f64::INFINITY
    } else {
        0.0
    };

    SeasonalityProfile {
        seasonal: strength > STRENGTH_THRESHOLD,
        strength,
        monthly_deviations,
    }
}
