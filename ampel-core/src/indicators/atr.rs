//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! The first bar has no previous close and uses high-low.
//! ATR is the simple rolling mean of true range over `period`.
//! Lookback: period - 1.

use super::indicator::{check_input, Indicator, IndicatorError};
use super::sma::rolling_mean;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Default for Atr {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Result<Vec<f64>, IndicatorError> {
        atr(bars, self.period)
    }
}

/// True Range series. TR[0] = high[0] - low[0].
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            if i == 0 {
                return hl;
            }
            let pc = bars[i - 1].close;
            if hl.is_nan() || pc.is_nan() {
                return f64::NAN;
            }
            hl.max((bar.high - pc).abs()).max((bar.low - pc).abs())
        })
        .collect()
}

/// ATR over a bar series.
pub fn atr(bars: &[Bar], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_input(bars.len(), period)?;
    Ok(rolling_mean(&true_range(bars), period))
}
