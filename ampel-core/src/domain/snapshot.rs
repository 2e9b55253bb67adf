//! MarketSnapshot: one instrument at one instant, validated.
//!
//! Snapshots are only constructed through [`MarketSnapshot::new`], which
//! rejects non-finite and out-of-domain values. Everything downstream
//! (scoring, gates, plans) is total over a constructed snapshot.

use super::phase::MarketPhase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unvalidated snapshot fields, e.g. assembled from indicator series or
/// deserialized from loosely-typed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFields {
    pub symbol: String,
    pub price: f64,
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_mid: f64,
    pub ema_slow: f64,
    pub atr: f64,
    pub volume_ratio: f64,
    pub market_phase: MarketPhase,
}

/// Reasons a snapshot cannot be built or scored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("insufficient data: need {needed} bars, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("invalid snapshot field '{field}': {value}")]
    Invalid { field: &'static str, value: f64 },

    #[error("empty symbol")]
    EmptySymbol,

    #[error("invalid bar series: {0}")]
    InvalidSeries(#[from] super::bar::BarError),

    #[error("indicator error: {0}")]
    Indicator(#[from] crate::indicators::IndicatorError),
}

/// Immutable record of the latest indicator values for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    symbol: String,
    price: f64,
    rsi: f64,
    ema_fast: f64,
    ema_mid: f64,
    ema_slow: f64,
    atr: f64,
    volume_ratio: f64,
    market_phase: MarketPhase,
}

fn check(field: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<f64, SnapshotError> {
    if value.is_finite() && ok(value) {
        Ok(value)
    } else {
        Err(SnapshotError::Invalid { field, value })
    }
}

impl MarketSnapshot {
    /// Validate fields and build a snapshot.
    pub fn new(fields: SnapshotFields) -> Result<Self, SnapshotError> {
        if fields.symbol.trim().is_empty() {
            return Err(SnapshotError::EmptySymbol);
        }
        Ok(Self {
            price: check("price", fields.price, |v| v > 0.0)?,
            rsi: check("rsi", fields.rsi, |v| (0.0..=100.0).contains(&v))?,
            ema_fast: check("ema_fast", fields.ema_fast, |_| true)?,
            ema_mid: check("ema_mid", fields.ema_mid, |_| true)?,
            ema_slow: check("ema_slow", fields.ema_slow, |_| true)?,
            atr: check("atr", fields.atr, |v| v >= 0.0)?,
            volume_ratio: check("volume_ratio", fields.volume_ratio, |v| v > 0.0)?,
            market_phase: fields.market_phase,
            symbol: fields.symbol,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn rsi(&self) -> f64 {
        self.rsi
    }

    pub fn ema_fast(&self) -> f64 {
        self.ema_fast
    }

    pub fn ema_mid(&self) -> f64 {
        self.ema_mid
    }

    pub fn ema_slow(&self) -> f64 {
        self.ema_slow
    }

    pub fn atr(&self) -> f64 {
        self.atr
    }

    pub fn volume_ratio(&self) -> f64 {
        self.volume_ratio
    }

    pub fn market_phase(&self) -> MarketPhase {
        self.market_phase
    }

    /// fast > mid > slow
    pub fn is_bullish_stack(&self) -> bool {
        self.ema_fast > self.ema_mid && self.ema_mid > self.ema_slow
    }

    /// fast < mid < slow
    pub fn is_bearish_stack(&self) -> bool {
        self.ema_fast < self.ema_mid && self.ema_mid < self.ema_slow
    }

    /// ATR as a fraction of price.
    pub fn relative_atr(&self) -> f64 {
        self.atr / self.price
    }

    /// Copy of the raw fields, for adjusting one value in tests or what-if checks.
    pub fn to_fields(&self) -> SnapshotFields {
        SnapshotFields {
            symbol: self.symbol.clone(),
            price: self.price,
            rsi: self.rsi,
            ema_fast: self.ema_fast,
            ema_mid: self.ema_mid,
            ema_slow: self.ema_slow,
            atr: self.atr,
            volume_ratio: self.volume_ratio,
            market_phase: self.market_phase,
        }
    }
}

impl TryFrom<SnapshotFields> for MarketSnapshot {
    type Error = SnapshotError;

    fn try_from(fields: SnapshotFields) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> SnapshotFields {
        SnapshotFields {
            symbol: "NVDA".into(),
            price: 100.0,
            rsi: 58.0,
            ema_fast: 105.0,
            ema_mid: 102.0,
            ema_slow: 98.0,
            atr: 2.0,
            volume_ratio: 1.6,
            market_phase: MarketPhase::Open,
        }
    }

    #[test]
    fn valid_fields_build() {
        let snap = MarketSnapshot::new(fields()).unwrap();
        assert_eq!(snap.symbol(), "NVDA");
        assert!(snap.is_bullish_stack());
        assert!(!snap.is_bearish_stack());
        assert!((snap.relative_atr() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn nan_rejected() {
        let mut f = fields();
        f.rsi = f64::NAN;
        let err = MarketSnapshot::new(f).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid { field: "rsi", .. }));
    }

    #[test]
    fn infinite_ema_rejected() {
        let mut f = fields();
        f.ema_slow = f64::INFINITY;
        assert!(matches!(
            MarketSnapshot::new(f),
            Err(SnapshotError::Invalid { field: "ema_slow", .. })
        ));
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut f = fields();
        f.price = 0.0;
        assert!(matches!(
            MarketSnapshot::new(f),
            Err(SnapshotError::Invalid { field: "price", .. })
        ));
    }

    #[test]
    fn out_of_domain_values_rejected() {
        let mut f = fields();
        f.rsi = 100.5;
        assert!(MarketSnapshot::new(f).is_err());

        let mut f = fields();
        f.atr = -0.1;
        assert!(MarketSnapshot::new(f).is_err());

        let mut f = fields();
        f.volume_ratio = 0.0;
        assert!(MarketSnapshot::new(f).is_err());
    }

    #[test]
    fn blank_symbol_rejected() {
        let mut f = fields();
        f.symbol = "  ".into();
        assert_eq!(MarketSnapshot::new(f), Err(SnapshotError::EmptySymbol));
    }

    #[test]
    fn fields_roundtrip() {
        let snap = MarketSnapshot::new(fields()).unwrap();
        assert_eq!(snap.to_fields(), fields());
    }
}
