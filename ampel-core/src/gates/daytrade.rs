//! Day-trade gate.
//!
//! Vetoes: phase not PRE/OPEN, volume ratio below `min_volume_ratio`, RSI
//! above `max_rsi`. Points: fast > mid (+25), volume ratio above
//! `surge_volume_ratio` (+20), ATR > 0 (+15), regular session (+10).

use super::{GateDecision, GateReason, Gatekeeper, Tally};
use crate::config::ConfigError;
use crate::domain::{MarketPhase, MarketSnapshot};
use crate::scoring::AmpelThresholds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayTradeGate {
    pub min_volume_ratio: f64,
    pub max_rsi: f64,
    pub surge_volume_ratio: f64,
    pub ampel: AmpelThresholds,
}

impl Default for DayTradeGate {
    fn default() -> Self {
        Self {
            min_volume_ratio: 1.5,
            max_rsi: 80.0,
            surge_volume_ratio: 2.0,
            ampel: AmpelThresholds::new(70, 50),
        }
    }
}

impl DayTradeGate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ampel.validate()?;
        if !(self.min_volume_ratio.is_finite() && self.min_volume_ratio >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "day_trade.min_volume_ratio must be finite and >= 0, got {}",
                self.min_volume_ratio
            )));
        }
        if !(0.0..=100.0).contains(&self.max_rsi) {
            return Err(ConfigError::Invalid(format!(
                "day_trade.max_rsi must be within [0, 100], got {}",
                self.max_rsi
            )));
        }
        Ok(())
    }

    fn veto(&self, s: &MarketSnapshot) -> Option<GateReason> {
        if !s.market_phase().is_tradable() {
            Some(GateReason::MarketClosed)
        } else if s.volume_ratio() < self.min_volume_ratio {
            Some(GateReason::LowVolume)
        } else if s.rsi() > self.max_rsi {
            Some(GateReason::RsiOverheated)
        } else {
            None
        }
    }
}

impl Gatekeeper for DayTradeGate {
    fn name(&self) -> &str {
        "day_trade"
    }

    fn evaluate(&self, s: &MarketSnapshot) -> GateDecision {
        if let Some(reason) = self.veto(s) {
            return GateDecision::veto(reason);
        }

        let mut tally = Tally::default();
        tally.award(s.ema_fast() > s.ema_mid(), 25, GateReason::ShortTermUptrend);
        tally.award(
            s.volume_ratio() > self.surge_volume_ratio,
            20,
            GateReason::VolumeSurge,
        );
        tally.award(s.atr() > 0.0, 15, GateReason::RangePresent);
        tally.award(
            s.market_phase() == MarketPhase::Open,
            10,
            GateReason::RegularSession,
        );
        tally.finish(self.ampel)
    }
}

/// Day-trade gate with default thresholds.
pub fn gate_daytrade(s: &MarketSnapshot) -> GateDecision {
    DayTradeGate::default().evaluate(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SnapshotFields;
    use crate::gates::GateOutcome;
    use crate::scoring::Ampel;

    fn snap(f: impl FnOnce(&mut SnapshotFields)) -> MarketSnapshot {
        let mut fields = SnapshotFields {
            symbol: "AMD".into(),
            price: 150.0,
            rsi: 62.0,
            ema_fast: 151.0,
            ema_mid: 149.0,
            ema_slow: 145.0,
            atr: 3.0,
            volume_ratio: 2.4,
            market_phase: MarketPhase::Open,
        };
        f(&mut fields);
        MarketSnapshot::new(fields).unwrap()
    }

    #[test]
    fn closed_market_vetoes_regardless_of_fields() {
        let d = gate_daytrade(&snap(|f| f.market_phase = MarketPhase::Closed));
        assert_eq!(d.ampel, Ampel::Red);
        assert_eq!(d.ampel.label(), "AVOID");
        assert_eq!(d.outcome, GateOutcome::Vetoed);
        assert_eq!(d.reasons, vec![GateReason::MarketClosed]);
    }

    #[test]
    fn closed_market_wins_over_other_vetoes() {
        let d = gate_daytrade(&snap(|f| {
            f.market_phase = MarketPhase::Closed;
            f.volume_ratio = 0.5;
            f.rsi = 95.0;
        }));
        assert_eq!(d.reasons, vec![GateReason::MarketClosed]);
    }

    #[test]
    fn low_volume_vetoes() {
        let d = gate_daytrade(&snap(|f| f.volume_ratio = 1.49));
        assert_eq!(d.reasons, vec![GateReason::LowVolume]);
        // 1.5 exactly passes the veto
        assert!(!gate_daytrade(&snap(|f| f.volume_ratio = 1.5)).is_vetoed());
    }

    #[test]
    fn overheated_rsi_vetoes() {
        let d = gate_daytrade(&snap(|f| f.rsi = 80.5));
        assert_eq!(d.reasons, vec![GateReason::RsiOverheated]);
        assert!(!gate_daytrade(&snap(|f| f.rsi = 80.0)).is_vetoed());
    }

    #[test]
    fn full_score_open_session() {
        let d = gate_daytrade(&snap(|_| {}));
        assert_eq!(d.score(), Some(70));
        assert_eq!(d.ampel, Ampel::Green);
        assert_eq!(
            d.reasons,
            vec![
                GateReason::ShortTermUptrend,
                GateReason::VolumeSurge,
                GateReason::RangePresent,
                GateReason::RegularSession,
            ]
        );
    }

    #[test]
    fn premarket_without_surge_is_yellow() {
        // 25 + 15 = 40 → below 50 → red; add surge → 60 → yellow
        let d = gate_daytrade(&snap(|f| {
            f.market_phase = MarketPhase::Pre;
            f.volume_ratio = 1.8;
        }));
        assert_eq!(d.score(), Some(40));
        assert_eq!(d.ampel, Ampel::Red);

        let d = gate_daytrade(&snap(|f| f.market_phase = MarketPhase::Pre));
        assert_eq!(d.score(), Some(60));
        assert_eq!(d.ampel, Ampel::Yellow);
    }

    #[test]
    fn flat_atr_earns_no_range_points() {
        let d = gate_daytrade(&snap(|f| f.atr = 0.0));
        assert!(!d.reasons.contains(&GateReason::RangePresent));
        assert_eq!(d.score(), Some(55));
    }

    #[test]
    fn custom_thresholds() {
        let gate = DayTradeGate {
            min_volume_ratio: 3.0,
            ..DayTradeGate::default()
        };
        assert_eq!(gate.evaluate(&snap(|_| {})).reasons, vec![GateReason::LowVolume]);
        assert_eq!(gate.name(), "day_trade");
    }

    #[test]
    fn invalid_config_rejected() {
        let gate = DayTradeGate {
            max_rsi: 120.0,
            ..DayTradeGate::default()
        };
        assert!(gate.validate().is_err());
        assert!(DayTradeGate::default().validate().is_ok());
    }
}
