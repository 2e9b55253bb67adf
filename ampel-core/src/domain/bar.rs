//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single symbol at a single timestamp.
///
/// Timestamps are UTC. Intraday (minute) and daily bars share this type;
/// the granularity is a property of the request that produced the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Violations of the series ordering invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bars out of order at index {index}: {previous} is after {current}")]
    Unordered {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("duplicate timestamp {timestamp} at index {index}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("mixed symbols at index {index}: expected '{expected}', found '{found}'")]
    MixedSymbols {
        index: usize,
        expected: String,
        found: String,
    },
}

/// Check that a series belongs to one symbol and is strictly ascending by
/// timestamp.
pub fn validate_series(bars: &[Bar]) -> Result<(), BarError> {
    for (i, pair) in bars.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        if curr.symbol != prev.symbol {
            return Err(BarError::MixedSymbols {
                index: i + 1,
                expected: prev.symbol.clone(),
                found: curr.symbol.clone(),
            });
        }
        if curr.timestamp == prev.timestamp {
            return Err(BarError::DuplicateTimestamp {
                index: i + 1,
                timestamp: curr.timestamp,
            });
        }
        if curr.timestamp < prev.timestamp {
            return Err(BarError::Unordered {
                index: i + 1,
                previous: prev.timestamp,
                current: curr.timestamp,
            });
        }
    }
    Ok(())
}

/// Sort a series ascending and drop repeated timestamps (first occurrence wins).
pub fn canonicalize(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    bars
}

/// Extract the close column.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Extract the volume column as floats.
pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume as f64).collect()
}
