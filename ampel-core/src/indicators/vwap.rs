//! Volume-Weighted Average Price (VWAP).
//!
//! Cumulative sum(volume * close) / cumulative sum(volume) from the first bar
//! of the input window. It resets only when the caller passes a new window;
//! trim the input to the session start for a session VWAP.

use super::indicator::{check_input, IndicatorError};
use crate::domain::Bar;

pub fn vwap(bars: &[Bar]) -> Result<Vec<f64>, IndicatorError> {
    check_input(bars.len(), 1)?;

    let mut pv = 0.0;
    let mut vol = 0.0;
    Ok(bars
        .iter()
        .map(|bar| {
            let v = bar.volume as f64;
            pv += v * bar.close;
            vol += v;
            if vol > 0.0 {
                pv / vol
            } else {
                f64::NAN
            }
        })
        .collect())
}
