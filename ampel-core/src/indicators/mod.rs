//! Indicator library.
//!
//! Series functions (`ema`, `sma`, `rsi`, `atr`, `vwap`, `volume_ratio`,
//! `pct_change`) return a `Vec<f64>` of the same length as the input with
//! NaN warm-up entries. Empty input fails with
//! [`IndicatorError::InsufficientData`] instead of panicking.
//!
//! `Ema`, `Sma`, `Rsi` and `Atr` also implement the [`Indicator`] trait so a
//! window can be computed into a named [`IndicatorValues`] container.

pub mod atr;
pub mod ema;
pub mod indicator;
pub mod rsi;
pub mod sma;
pub mod volume;
pub mod vwap;

pub use atr::{atr, true_range, Atr};
pub use ema::{ema, Ema};
pub use indicator::{Indicator, IndicatorError, IndicatorValues};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};
pub use volume::{average_volume, pct_change, volume_ratio};
pub use vwap::vwap;

/// Last entry of a series, if it is a number.
pub fn last_defined(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| !v.is_nan())
}

/// Create synthetic minute bars from close prices for testing.
///
/// open = prev_close (or close for the first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    let data: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc_bars(&data)
}

/// Create minute bars from (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            symbol: "TEST".to_string(),
            timestamp: base + chrono::Duration::minutes(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
