//! Snapshot builder: bar window → latest indicator values → MarketSnapshot.

use crate::clock::MarketClock;
use crate::config::ConfigError;
use crate::domain::{validate_series, Bar, MarketSnapshot, SnapshotError, SnapshotFields};
use crate::indicators::{volume_ratio, Atr, Ema, IndicatorError, IndicatorValues, Rsi};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Indicator periods for the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub volume_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_mid: 20,
            ema_slow: 50,
            rsi_period: 14,
            atr_period: 14,
            volume_window: 20,
        }
    }
}

impl IndicatorConfig {
    /// Bars needed before every snapshot field is defined.
    pub fn required_bars(&self) -> usize {
        [
            self.ema_fast,
            self.ema_mid,
            self.ema_slow,
            self.rsi_period + 1,
            self.atr_period,
            self.volume_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, period) in [
            ("ema_fast", self.ema_fast),
            ("ema_mid", self.ema_mid),
            ("ema_slow", self.ema_slow),
            ("rsi_period", self.rsi_period),
            ("atr_period", self.atr_period),
            ("volume_window", self.volume_window),
        ] {
            if period == 0 {
                return Err(ConfigError::Invalid(format!(
                    "indicators.{name} must be >= 1"
                )));
            }
        }
        if !(self.ema_fast < self.ema_mid && self.ema_mid < self.ema_slow) {
            return Err(ConfigError::Invalid(format!(
                "EMA periods must satisfy fast < mid < slow, got {}/{}/{}",
                self.ema_fast, self.ema_mid, self.ema_slow
            )));
        }
        Ok(())
    }
}

/// Builds snapshots from bar windows. Holds the indicator periods and the
/// clock used to classify the market phase; no state between calls.
pub struct SnapshotBuilder {
    config: IndicatorConfig,
    clock: Box<dyn MarketClock>,
}

impl SnapshotBuilder {
    pub fn new(config: IndicatorConfig, clock: Box<dyn MarketClock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn MarketClock {
        self.clock.as_ref()
    }

    /// Snapshot of the last bar, with the market phase at the clock's "now".
    pub fn evaluate(&self, symbol: &str, bars: &[Bar]) -> Result<MarketSnapshot, SnapshotError> {
        self.evaluate_at(symbol, bars, self.clock.now())
    }

    /// Snapshot of the last bar, with the market phase at `at`.
    pub fn evaluate_at(
        &self,
        symbol: &str,
        bars: &[Bar],
        at: DateTime<Utc>,
    ) -> Result<MarketSnapshot, SnapshotError> {
        let needed = self.config.required_bars();
        if bars.len() < needed {
            return Err(SnapshotError::InsufficientData {
                needed,
                available: bars.len(),
            });
        }
        validate_series(bars)?;

        let values = self.compute(bars).map_err(|e| match e {
            IndicatorError::InsufficientData => SnapshotError::InsufficientData {
                needed,
                available: bars.len(),
            },
            other => SnapshotError::Indicator(other),
        })?;

        let last_of = |name: &str| values.last(name).unwrap_or(f64::NAN);
        let last_bar = &bars[bars.len() - 1];

        MarketSnapshot::new(SnapshotFields {
            symbol: symbol.to_string(),
            price: last_bar.close,
            rsi: last_of(&format!("rsi_{}", self.config.rsi_period)),
            ema_fast: last_of(&format!("ema_{}", self.config.ema_fast)),
            ema_mid: last_of(&format!("ema_{}", self.config.ema_mid)),
            ema_slow: last_of(&format!("ema_{}", self.config.ema_slow)),
            atr: last_of(&format!("atr_{}", self.config.atr_period)),
            volume_ratio: last_of("volume_ratio"),
            market_phase: self.clock.phase_at(at),
        })
    }

    /// Full indicator series over the window.
    pub fn compute(&self, bars: &[Bar]) -> Result<IndicatorValues, IndicatorError> {
        let fast = Ema::new(self.config.ema_fast);
        let mid = Ema::new(self.config.ema_mid);
        let slow = Ema::new(self.config.ema_slow);
        let rsi = Rsi::new(self.config.rsi_period);
        let atr = Atr::new(self.config.atr_period);

        let mut values = IndicatorValues::compute_all(bars, &[&fast, &mid, &slow, &rsi, &atr])?;
        values.insert("volume_ratio", volume_ratio(bars, self.config.volume_window)?);
        Ok(values)
    }
}
