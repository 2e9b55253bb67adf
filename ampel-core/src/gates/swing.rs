//! Swing-trade gate.
//!
//! Vetoes: fast EMA not strictly above mid EMA, RSI outside
//! `[rsi_min, rsi_max]`. Points: trend intact (+30), volume ratio above
//! `confirm_volume_ratio` (+15), ATR > 0 (+10).

use super::{GateDecision, GateReason, Gatekeeper, Tally};
use crate::config::ConfigError;
use crate::domain::MarketSnapshot;
use crate::scoring::AmpelThresholds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingGate {
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub confirm_volume_ratio: f64,
    pub ampel: AmpelThresholds,
}

impl Default for SwingGate {
    fn default() -> Self {
        Self {
            rsi_min: 40.0,
            rsi_max: 65.0,
            confirm_volume_ratio: 1.2,
            ampel: AmpelThresholds::new(65, 50),
        }
    }
}

impl SwingGate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ampel.validate()?;
        if !(0.0 <= self.rsi_min && self.rsi_min <= self.rsi_max && self.rsi_max <= 100.0) {
            return Err(ConfigError::Invalid(format!(
                "swing RSI zone must satisfy 0 <= rsi_min <= rsi_max <= 100, got [{}, {}]",
                self.rsi_min, self.rsi_max
            )));
        }
        Ok(())
    }

    fn veto(&self, s: &MarketSnapshot) -> Option<GateReason> {
        if s.ema_fast() <= s.ema_mid() {
            Some(GateReason::NoStableUptrend)
        } else if !(self.rsi_min..=self.rsi_max).contains(&s.rsi()) {
            Some(GateReason::RsiOutOfZone)
        } else {
            None
        }
    }
}

impl Gatekeeper for SwingGate {
    fn name(&self) -> &str {
        "swing"
    }

    fn evaluate(&self, s: &MarketSnapshot) -> GateDecision {
        if let Some(reason) = self.veto(s) {
            return GateDecision::veto(reason);
        }

        let mut tally = Tally::default();
        tally.award(true, 30, GateReason::TrendIntact);
        tally.award(
            s.volume_ratio() > self.confirm_volume_ratio,
            15,
            GateReason::VolumeConfirms,
        );
        tally.award(s.atr() > 0.0, 10, GateReason::SufficientVolatility);
        tally.finish(self.ampel)
    }
}

/// Swing gate with default thresholds.
pub fn gate_swing(s: &MarketSnapshot) -> GateDecision {
    SwingGate::default().evaluate(s)
}
