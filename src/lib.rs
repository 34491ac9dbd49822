//! # revenue-forecast
//!
//! Deterministic multi-month forecasting for sparse monthly financial
//! series (revenue, profit) with uncertainty bounds.
//!
//! Three model families (linear trend regression, exponential smoothing
//! with an optional seasonal term, and an ARIMA-style autoregression)
//! compete through holdout backtesting when the method is `auto`, or can
//! be requested explicitly. The engine is a pure function: no I/O, no
//! shared state, no randomness; identical inputs always produce
//! identical outputs.
//!
//! ```
//! use revenue_forecast::prelude::*;
//! use std::collections::HashMap;
//!
//! let history: HashMap<String, f64> = (1..=12)
//!     .map(|m| (format!("2023-{m:02}"), 100_000.0 + 2_000.0 * m as f64))
//!     .collect();
//!
//! let result = generate_forecast(&history, 3, ForecastMethod::Auto).unwrap();
//! assert_eq!(result.forecast.len(), 3);
//! for point in &result.forecast {
//!     assert!(point.lower_bound <= point.value && point.value <= point.upper_bound);
//! }
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod seasonality;
pub mod selection;
pub mod utils;

pub use engine::{generate_forecast, generate_forecast_with, ForecastConfig, MAX_HORIZON};
pub use error::{ForecastError, Result};
pub use models::ForecastMethod;

pub mod prelude {
    pub use crate::core::{Accuracy, ForecastPoint, ForecastResult, GapPolicy, HistoricalSeries, Period};
    pub use crate::engine::{generate_forecast, generate_forecast_with, ForecastConfig};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{ForecastMethod, Forecaster};
}
