//! Core data structures: periods, normalized series, forecast results.

mod forecast;
mod period;
mod series;

pub use forecast::{Accuracy, ForecastPoint, ForecastResult};
pub use period::Period;
pub use series::{GapPolicy, HistoricalSeries};
