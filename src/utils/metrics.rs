//! Accuracy metrics for forecast evaluation.

/// Mean absolute percentage error, in percent.
///
/// Zero actuals are skipped; returns None when no term is computable.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (a, p) in actual.iter().zip(predicted.iter()) {
        if *a != 0.0 {
            sum += ((a - p) / a).abs();
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(100.0 * sum / count as f64)
    }
}

/// Coefficient of determination between actuals and predictions.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return f64::NAN;
    }
    let mean_actual = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    }
}
