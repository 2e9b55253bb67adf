//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).
//! Any NaN inside a window makes that window's output NaN.

use super::indicator::{check_input, Indicator, IndicatorError};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Result<Vec<f64>, IndicatorError> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma(&closes, self.period)
    }
}

/// Rolling mean of `values` over `period`.
pub fn sma(values: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_input(values.len(), period)?;
    Ok(rolling_mean(values, period))
}

/// Rolling mean without input checks. Shared with RSI, ATR and volume ratio.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            nan_count += 1;
        } else {
            sum += v;
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= period && nan_count == 0 {
            result[i] = sum / period as f64;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn sma_3_known_values() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 2.0, DEFAULT_EPSILON);
        assert_approx(result[3], 3.0, DEFAULT_EPSILON);
        assert_approx(result[4], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_only_poisons_its_windows() {
        let result = sma(&[1.0, f64::NAN, 3.0, 4.0, 5.0, 6.0], 2).unwrap();
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 3.5, DEFAULT_EPSILON);
        assert_approx(result[5], 5.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_short_input_all_nan() {
        let result = sma(&[1.0, 2.0], 5).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_empty_input_errors() {
        assert_eq!(sma(&[], 3), Err(IndicatorError::InsufficientData));
    }

    #[test]
    fn sma_indicator_uses_closes() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let result = Sma::new(3).compute(&bars).unwrap();
        assert_approx(result[2], 20.0, DEFAULT_EPSILON);
        assert_eq!(Sma::new(3).lookback(), 2);
    }
}
