//! Normalized monthly series and the gap policy applied while building it.

use crate::core::period::Period;
use crate::error::{ForecastError, Result};
use std::collections::{BTreeMap, HashMap};

/// How to treat missing months between observed periods.
///
/// The policy is an explicit configuration choice, never varied silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// A single missing month between two present months is linearly
    /// interpolated; a gap of two or more months truncates the series to
    /// the most recent contiguous run, discarding older observations.
    #[default]
    BridgeSingleMonth,
    /// Any gap truncates to the most recent contiguous run.
    TruncateAtGap,
}

/// An ordered, gap-free run of monthly observations.
///
/// Built once per call by [`HistoricalSeries::normalize`]; immutable after
/// construction. Consecutive periods are guaranteed to be exactly one
/// calendar month apart.
#[derive(Debug, Clone)]
pub struct HistoricalSeries {
    periods: Vec<Period>,
    values: Vec<f64>,
    interpolated: usize,
    truncated: usize,
}

impl HistoricalSeries {
    /// Validate and order a raw `period-key -> value` map into a clean run.
    ///
    /// Keys are parsed strictly as `YYYY-MM` and values must be finite.
    /// Input iteration order never matters: observations are sorted by
    /// period before the gap policy is applied.
    pub fn normalize(history: &HashMap<String, f64>, policy: GapPolicy) -> Result<Self> {
        let mut ordered = BTreeMap::new();
        for (key, &value) in history {
            let period = Period::parse(key)?;
            if !value.is_finite() {
                return Err(ForecastError::NonFiniteValue {
                    period: key.clone(),
                    value,
                });
            }
            ordered.insert(period, value);
        }

        let mut periods: Vec<Period> = Vec::with_capacity(ordered.len());
        let mut values: Vec<f64> = Vec::with_capacity(ordered.len());
        let mut interpolated = 0usize;
        let mut truncated = 0usize;

        for (period, value) in ordered {
            if let (Some(&prev_period), Some(&prev_value)) = (periods.last(), values.last()) {
                let gap = prev_period.months_until(&period);
                let bridgeable = gap == 2 && policy == GapPolicy::BridgeSingleMonth;
                if gap == 1 {
                    // contiguous
                } else if bridgeable {
                    periods.push(prev_period.next());
                    values.push((prev_value + value) / 2.0);
                    interpolated += 1;
                } else {
                    // Longer gap: restart the run at this observation.
                    truncated += periods.len() - interpolated;
                    periods.clear();
                    values.clear();
                    interpolated = 0;
                }
            }
            periods.push(period);
            values.push(value);
        }

        Ok(Self {
            periods,
            values,
            interpolated,
            truncated,
        })
    }

    /// Number of observations in the contiguous run.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the run holds no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation values in period order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Periods in ascending order.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// First period of the contiguous run.
    pub fn start(&self) -> Option<Period> {
        self.periods.first().copied()
    }

    /// Most recent observed period.
    pub fn last_period(&self) -> Option<Period> {
        self.periods.last().copied()
    }

    /// Number of gap months filled by interpolation.
    pub fn interpolated(&self) -> usize {
        self.interpolated
    }

    /// Number of source observations discarded before the run start.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Fail unless the run holds at least `needed` observations.
    pub fn require_min(&self, needed: usize) -> Result<()> {
        if self.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: self.len(),
            });
        }
        Ok(())
    }

    /// The first `n` observations as a new series, used for backtest splits.
    pub fn head(&self, n: usize) -> HistoricalSeries {
        let n = n.min(self.len());
        HistoricalSeries {
            periods: self.periods[..n].to_vec(),
            values: self.values[..n].to_vec(),
            interpolated: 0,
            truncated: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn history(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn normalize_sorts_by_period() {
        let h = history(&[("2023-03", 3.0), ("2023-01", 1.0), ("2023-02", 2.0)]);
        let series = HistoricalSeries::normalize(&h, GapPolicy::default()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(series.start().unwrap().to_string(), "2023-01");
        assert_eq!(series.last_period().unwrap().to_string(), "2023-03");
    }

    #[test]
    fn normalize_rejects_bad_keys_and_values() {
        let h = history(&[("2023-1", 1.0)]);
        assert!(matches!(
            HistoricalSeries::normalize(&h, GapPolicy::default()),
            Err(ForecastError::InvalidPeriodKey(_))
        ));

        let h = history(&[("2023-01", f64::NAN)]);
        assert!(matches!(
            HistoricalSeries::normalize(&h, GapPolicy::default()),
            Err(ForecastError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn single_month_gap_is_interpolated() {
        let h = history(&[("2023-01", 100.0), ("2023-03", 200.0), ("2023-04", 300.0)]);
        let series = HistoricalSeries::normalize(&h, GapPolicy::BridgeSingleMonth).unwrap();

        assert_eq!(series.len(), 4);
        assert_relative_eq!(series.values()[1], 150.0, epsilon = 1e-10);
        assert_eq!(series.periods()[1].to_string(), "2023-02");
        assert_eq!(series.interpolated(), 1);
        assert_eq!(series.truncated(), 0);
    }

    #[test]
    fn longer_gap_truncates_to_recent_run() {
        let h = history(&[
            ("2022-01", 1.0),
            ("2022-02", 2.0),
            ("2022-06", 6.0),
            ("2022-07", 7.0),
            ("2022-08", 8.0),
        ]);
        let series = HistoricalSeries::normalize(&h, GapPolicy::BridgeSingleMonth).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), &[6.0, 7.0, 8.0]);
        assert_eq!(series.start().unwrap().to_string(), "2022-06");
        assert_eq!(series.truncated(), 2);
    }

    #[test]
    fn truncate_at_gap_never_interpolates() {
        let h = history(&[("2023-01", 100.0), ("2023-03", 200.0), ("2023-04", 300.0)]);
        let series = HistoricalSeries::normalize(&h, GapPolicy::TruncateAtGap).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), &[200.0, 300.0]);
        assert_eq!(series.interpolated(), 0);
        assert_eq!(series.truncated(), 1);
    }

    #[test]
    fn require_min_reports_run_length() {
        let h = history(&[("2023-01", 1.0), ("2023-02", 2.0)]);
        let series = HistoricalSeries::normalize(&h, GapPolicy::default()).unwrap();

        assert!(series.require_min(2).is_ok());
        assert_eq!(
            series.require_min(3),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        );
    }

    #[test]
    fn head_keeps_earliest_observations() {
        let h = history(&[
            ("2023-01", 1.0),
            ("2023-02", 2.0),
            ("2023-03", 3.0),
            ("2023-04", 4.0),
        ]);
        let series = HistoricalSeries::normalize(&h, GapPolicy::default()).unwrap();
        let train = series.head(3);

        assert_eq!(train.len(), 3);
        assert_eq!(train.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(train.last_period().unwrap().to_string(), "2023-03");
    }

    #[test]
    fn empty_history_is_an_empty_run() {
        let series = HistoricalSeries::normalize(&HashMap::new(), GapPolicy::default()).unwrap();
        assert!(series.is_empty());
        assert!(series.require_min(3).is_err());
    }
}
