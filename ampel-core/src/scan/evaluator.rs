//! Full evaluation of one series: snapshot, trend score, ampel, option
//! bias, both gates and the trade plan.

use crate::clock::{ExchangeClock, MarketClock};
use crate::config::{AmpelConfig, ConfigError};
use crate::domain::{Bar, MarketSnapshot, SnapshotError};
use crate::gates::{GateDecision, Gatekeeper};
use crate::plan::{plan_with, TradePlan};
use crate::scoring::{calculate_trend_score, option_bias_with, Ampel, OptionBias, TrendScore};
use crate::snapshot::SnapshotBuilder;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub snapshot: MarketSnapshot,
    pub score: TrendScore,
    pub ampel: Ampel,
    pub bias: OptionBias,
    pub day_trade: GateDecision,
    pub swing: GateDecision,
    pub plan: Option<TradePlan>,
}

impl Evaluation {
    pub fn symbol(&self) -> &str {
        self.snapshot.symbol()
    }
}

pub struct Evaluator {
    builder: SnapshotBuilder,
    config: AmpelConfig,
}

impl Evaluator {
    pub fn new(config: AmpelConfig, clock: Box<dyn MarketClock>) -> Self {
        Self {
            builder: SnapshotBuilder::new(config.indicators.clone(), clock),
            config,
        }
    }

    /// Evaluator on the exchange clock described by `config.clock`.
    pub fn with_exchange_clock(config: AmpelConfig) -> Result<Self, ConfigError> {
        let clock = ExchangeClock::from_config(&config.clock)?;
        Ok(Self::new(config, Box::new(clock)))
    }

    pub fn config(&self) -> &AmpelConfig {
        &self.config
    }

    pub fn builder(&self) -> &SnapshotBuilder {
        &self.builder
    }

    /// Bars needed for a snapshot.
    pub fn required_bars(&self) -> usize {
        self.config.indicators.required_bars()
    }

    pub fn evaluate(&self, symbol: &str, bars: &[Bar]) -> Result<Evaluation, SnapshotError> {
        let snapshot = self.builder.evaluate(symbol, bars)?;
        Ok(self.assess(snapshot))
    }

    pub fn evaluate_at(
        &self,
        symbol: &str,
        bars: &[Bar],
        at: DateTime<Utc>,
    ) -> Result<Evaluation, SnapshotError> {
        let snapshot = self.builder.evaluate_at(symbol, bars, at)?;
        Ok(self.assess(snapshot))
    }

    /// Score, gate and plan an already-built snapshot.
    pub fn assess(&self, snapshot: MarketSnapshot) -> Evaluation {
        let score = calculate_trend_score(&snapshot);
        let scoring = &self.config.scoring;
        Evaluation {
            ampel: scoring.ampel.classify(score.value()),
            bias: option_bias_with(&snapshot, score.value(), scoring.bias_min_score),
            day_trade: self.config.day_trade.evaluate(&snapshot),
            swing: self.config.swing.evaluate(&snapshot),
            plan: plan_with(&snapshot, score.value(), &self.config.plan),
            score,
            snapshot,
        }
    }
}
