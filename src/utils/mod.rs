//! Utility functions shared by the forecasting models.

pub mod metrics;
pub mod stats;

pub use metrics::{mape, r_squared};
pub use stats::quantile_normal;
