//! Indicator trait, error type and named-series container.
//!
//! Indicators are pure functions: bar history in, numeric series out, same
//! length as the input. Warm-up entries are `f64::NAN`; callers drop them.

use crate::domain::Bar;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("insufficient data: empty input series")]
    InsufficientData,

    #[error("invalid period {0}: must be >= 1")]
    InvalidPeriod(usize),
}

/// Reject empty input and zero periods.
pub(crate) fn check_input(len: usize, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }
    if len == 0 {
        return Err(IndicatorError::InsufficientData);
    }
    Ok(())
}

/// Trait for bar-driven indicators.
///
/// # Look-ahead guard
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading NaN entries before the indicator produces output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Result<Vec<f64>, IndicatorError>;
}

/// Named indicator series computed over one bar window.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute every indicator over `bars` and store it under its name.
    pub fn compute_all(
        bars: &[Bar],
        indicators: &[&dyn Indicator],
    ) -> Result<Self, IndicatorError> {
        let mut values = Self::new();
        for ind in indicators {
            values.insert(ind.name(), ind.compute(bars)?);
        }
        Ok(values)
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value at a specific bar index.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Last value of a named series, NaN included.
    pub fn last(&self, name: &str) -> Option<f64> {
        self.series.get(name).and_then(|v| v.last().copied())
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert(
            "ema_20",
            vec![f64::NAN; 19]
                .into_iter()
                .chain(vec![100.0, 101.0])
                .collect(),
        );
        assert!(iv.get("ema_20", 0).unwrap().is_nan());
        assert_eq!(iv.get("ema_20", 19), Some(100.0));
        assert_eq!(iv.get("ema_20", 21), None);
        assert_eq!(iv.last("ema_20"), Some(101.0));
    }

    #[test]
    fn indicator_values_missing_name() {
        let iv = IndicatorValues::new();
        assert_eq!(iv.get("nonexistent", 0), None);
        assert_eq!(iv.last("nonexistent"), None);
        assert!(iv.is_empty());
    }

    #[test]
    fn check_input_rejects_empty_and_zero_period() {
        assert_eq!(check_input(0, 3), Err(IndicatorError::InsufficientData));
        assert_eq!(check_input(5, 0), Err(IndicatorError::InvalidPeriod(0)));
        assert!(check_input(1, 1).is_ok());
    }
}
