//! Forecast result types handed to the presentation layer.

use crate::core::period::Period;
use crate::models::ForecastMethod;
use serde::Serialize;

/// A single forecasted month with its confidence interval.
///
/// Invariant: `lower_bound <= value <= upper_bound`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// The forecasted calendar month.
    #[serde(rename = "date")]
    pub period: Period,
    /// Point estimate.
    pub value: f64,
    /// Lower confidence bound.
    pub lower_bound: f64,
    /// Upper confidence bound.
    pub upper_bound: f64,
    /// Confidence level of the interval, e.g. 0.95.
    pub confidence: f64,
}

/// Accuracy metadata attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accuracy {
    /// In-sample coefficient of determination of the chosen model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
    /// MAPE: holdout MAPE for auto selection, in-sample MAPE otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mape: Option<f64>,
    /// Set when auto selection fell back to linear trend; never silent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// A complete forecast: chosen method, horizon-length points, accuracy.
///
/// Produced fresh per call and never mutated; ownership transfers entirely
/// to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    /// The concrete model family that produced the points (never `auto`).
    pub method: ForecastMethod,
    /// Exactly `horizon` points, one calendar month apart.
    pub forecast: Vec<ForecastPoint>,
    /// Accuracy metadata for the chosen model.
    pub accuracy: Accuracy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_to_presentation_shape() {
        let result = ForecastResult {
            method: ForecastMethod::Linear,
            forecast: vec![ForecastPoint {
                period: Period::parse("2024-01").unwrap(),
                value: 100.0,
                lower_bound: 90.0,
                upper_bound: 110.0,
                confidence: 0.95,
            }],
            accuracy: Accuracy {
                r2: Some(0.98),
                mape: None,
                fallback_reason: None,
            },
        };

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["method"], "linear");
        assert_eq!(json["forecast"][0]["date"], "2024-01");
        assert_eq!(json["forecast"][0]["lowerBound"], 90.0);
        assert_eq!(json["forecast"][0]["upperBound"], 110.0);
        assert_eq!(json["accuracy"]["r2"], 0.98);
        assert!(json["accuracy"].get("mape").is_none());
        assert!(json["accuracy"].get("fallbackReason").is_none());
    }

    #[test]
    fn fallback_reason_serializes_in_camel_case() {
        let accuracy = Accuracy {
            r2: None,
            mape: None,
            fallback_reason: Some("too short".into()),
        };
        let json: serde_json::Value = serde_json::to_value(&accuracy).unwrap();
        assert_eq!(json["fallbackReason"], "too short");
    }
}
