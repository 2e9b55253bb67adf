//! Trade-plan generator.
//!
//! The gated plan places the stop a multiple of ATR below the entry and the
//! target a multiple of that risk above it, then drops the plan when the
//! score is too low or the reward:risk ratio falls short. The legacy plan is
//! ungated and uses fixed ATR multiples.

use crate::config::ConfigError;
use crate::domain::MarketSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// No plan below this score.
    pub min_score: u8,
    /// stop = entry - stop_atr_multiple * atr
    pub stop_atr_multiple: f64,
    /// target = entry + reward_multiple * (entry - stop)
    pub reward_multiple: f64,
    /// No plan below this reward:risk.
    pub min_reward_risk: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            min_score: 65,
            stop_atr_multiple: 1.2,
            reward_multiple: 2.0,
            min_reward_risk: 1.8,
        }
    }
}

impl PlanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("stop_atr_multiple", self.stop_atr_multiple),
            ("reward_multiple", self.reward_multiple),
            ("min_reward_risk", self.min_reward_risk),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "plan.{name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Long trade levels. Prices and ratio are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub reward_risk: f64,
}

impl TradePlan {
    pub fn risk(&self) -> f64 {
        self.entry - self.stop
    }

    pub fn reward(&self) -> f64 {
        self.target - self.entry
    }
}

/// Ungated plan with a fixed "1:2" label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTradePlan {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub label: String,
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Gated plan with default parameters.
pub fn plan(s: &MarketSnapshot, score: u8) -> Option<TradePlan> {
    plan_with(s, score, &PlanConfig::default())
}

/// Gated plan. `None` means no qualifying trade.
pub fn plan_with(s: &MarketSnapshot, score: u8, config: &PlanConfig) -> Option<TradePlan> {
    if score < config.min_score {
        return None;
    }

    let entry = s.price();
    let stop = entry - config.stop_atr_multiple * s.atr();
    let risk = entry - stop;
    if risk <= 0.0 {
        return None;
    }
    let target = entry + config.reward_multiple * risk;
    let reward_risk = (target - entry) / risk;
    if reward_risk < config.min_reward_risk {
        return None;
    }

    Some(TradePlan {
        entry: round2(entry),
        stop: round2(stop),
        target: round2(target),
        reward_risk: round2(reward_risk),
    })
}

/// Ungated plan: stop 1.5 ATR below, target 3 ATR above.
pub fn legacy_plan(s: &MarketSnapshot) -> LegacyTradePlan {
    LegacyTradePlan {
        entry: round2(s.price()),
        stop: round2(s.price() - 1.5 * s.atr()),
        target: round2(s.price() + 3.0 * s.atr()),
        label: "1:2".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketPhase, SnapshotFields};

    fn snap(price: f64, atr: f64) -> MarketSnapshot {
        MarketSnapshot::new(SnapshotFields {
            symbol: "PLTR".into(),
            price,
            rsi: 60.0,
            ema_fast: price,
            ema_mid: price,
            ema_slow: price,
            atr,
            volume_ratio: 1.0,
            market_phase: MarketPhase::Open,
        })
        .unwrap()
    }

    #[test]
    fn plan_example() {
        let p = plan(&snap(50.0, 5.0), 70).unwrap();
        assert_eq!(p.entry, 50.0);
        assert_eq!(p.stop, 44.0);
        assert_eq!(p.target, 62.0);
        assert_eq!(p.reward_risk, 2.0);
    }

    #[test]
    fn low_score_has_no_plan() {
        assert!(plan(&snap(50.0, 5.0), 64).is_none());
        assert!(plan(&snap(50.0, 5.0), 65).is_some());
    }

    #[test]
    fn zero_atr_has_no_plan() {
        assert!(plan(&snap(50.0, 0.0), 90).is_none());
    }

    #[test]
    fn insufficient_reward_multiple_filtered() {
        let config = PlanConfig {
            reward_multiple: 1.5,
            ..PlanConfig::default()
        };
        assert!(plan_with(&snap(50.0, 5.0), 90, &config).is_none());
    }

    #[test]
    fn levels_are_rounded() {
        let p = plan(&snap(123.456, 1.234), 80).unwrap();
        // stop = 123.456 - 1.4808 = 121.9752, target = 123.456 + 2.9616 = 126.4176
        assert_eq!(p.entry, 123.46);
        assert_eq!(p.stop, 121.98);
        assert_eq!(p.target, 126.42);
        assert_eq!(p.reward_risk, 2.0);
        assert!(p.risk() > 0.0 && p.reward() > p.risk());
    }

    #[test]
    fn legacy_plan_levels() {
        let p = legacy_plan(&snap(100.0, 2.0));
        assert_eq!(p.entry, 100.0);
        assert_eq!(p.stop, 97.0);
        assert_eq!(p.target, 106.0);
        assert_eq!(p.label, "1:2");
    }

    #[test]
    fn invalid_config_rejected() {
        let config = PlanConfig {
            stop_atr_multiple: 0.0,
            ..PlanConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
