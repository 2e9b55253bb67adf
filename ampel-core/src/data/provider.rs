//! Bar source trait and structured error types.
//!
//! The BarSource trait abstracts over price-bar feeds (Alpaca, CSV files) so
//! the scanners never talk to a concrete client and tests can swap in mocks.

use crate::domain::Bar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data for symbol '{symbol}'")]
    NoData { symbol: String },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("I/O error for {path}: {message}")]
    Io { path: String, message: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Missing data, as opposed to a failing upstream.
    pub fn is_no_data(&self) -> bool {
        matches!(self, DataError::NoData { .. })
    }
}

/// Bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Minute,
    Day,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute => "minute",
            Timeframe::Day => "day",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" | "min" | "1min" | "1m" => Ok(Timeframe::Minute),
            "day" | "1day" | "1d" | "daily" => Ok(Timeframe::Day),
            other => Err(format!("unknown timeframe '{other}' (expected minute or day)")),
        }
    }
}

/// Which bars to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarWindow {
    /// The most recent `n` bars.
    Limit(usize),
    /// All bars with `start <= timestamp <= end`.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl BarWindow {
    /// Trim an ascending series to this window.
    pub fn apply(&self, bars: Vec<Bar>) -> Vec<Bar> {
        match *self {
            BarWindow::Limit(n) => {
                let skip = bars.len().saturating_sub(n);
                bars.into_iter().skip(skip).collect()
            }
            BarWindow::Range { start, end } => bars
                .into_iter()
                .filter(|b| b.timestamp >= start && b.timestamp <= end)
                .collect(),
        }
    }
}

/// A request for one symbol's bars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarRequest {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub window: BarWindow,
}

impl BarRequest {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, window: BarWindow) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            window,
        }
    }

    /// The most recent `limit` bars of `symbol`.
    pub fn latest(symbol: impl Into<String>, timeframe: Timeframe, limit: usize) -> Self {
        Self::new(symbol, timeframe, BarWindow::Limit(limit))
    }

    /// Same timeframe and window for another symbol.
    pub fn for_symbol(&self, symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..self.clone()
        }
    }
}

/// Trait for bar sources (Alpaca, CSV files, test doubles).
///
/// Implementations return bars in ascending timestamp order, trimmed to the
/// request window. An empty result is reported as [`DataError::NoData`].
pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn fetch(&self, request: &BarRequest) -> Result<Vec<Bar>, DataError>;

    /// Whether the source currently accepts requests (not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

impl<S: BarSource + ?Sized> BarSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, request: &BarRequest) -> Result<Vec<Bar>, DataError> {
        (**self).fetch(request)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
