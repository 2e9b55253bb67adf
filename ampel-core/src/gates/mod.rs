//! Decision gatekeepers.
//!
//! A gate first checks hard veto conditions; the first one that fires ends
//! evaluation with a Red ampel and exactly one reason. If nothing vetoes, the
//! gate accumulates points and maps them to an ampel with its own cuts.
//! Reasons are recorded in evaluation order.

pub mod daytrade;
pub mod swing;

pub use daytrade::{gate_daytrade, DayTradeGate};
pub use swing::{gate_swing, SwingGate};

use crate::domain::MarketSnapshot;
use crate::scoring::Ampel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a gate vetoed or awarded points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    // Day-trade vetoes
    MarketClosed,
    LowVolume,
    RsiOverheated,
    // Day-trade points
    ShortTermUptrend,
    VolumeSurge,
    RangePresent,
    RegularSession,
    // Swing vetoes
    NoStableUptrend,
    RsiOutOfZone,
    // Swing points
    TrendIntact,
    VolumeConfirms,
    SufficientVolatility,
}

impl GateReason {
    pub fn is_veto(&self) -> bool {
        matches!(
            self,
            GateReason::MarketClosed
                | GateReason::LowVolume
                | GateReason::RsiOverheated
                | GateReason::NoStableUptrend
                | GateReason::RsiOutOfZone
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            GateReason::MarketClosed => "market closed",
            GateReason::LowVolume => "not enough volume",
            GateReason::RsiOverheated => "RSI overheated",
            GateReason::ShortTermUptrend => "short-term uptrend",
            GateReason::VolumeSurge => "strong volume surge",
            GateReason::RangePresent => "movement present (ATR)",
            GateReason::RegularSession => "regular trading session",
            GateReason::NoStableUptrend => "no stable uptrend",
            GateReason::RsiOutOfZone => "RSI outside healthy zone",
            GateReason::TrendIntact => "trend structure intact",
            GateReason::VolumeConfirms => "volume confirms the move",
            GateReason::SufficientVolatility => "sufficient volatility",
        }
    }
}

impl fmt::Display for GateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Terminal state of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "score", rename_all = "snake_case")]
pub enum GateOutcome {
    Vetoed,
    Scored(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub ampel: Ampel,
    pub outcome: GateOutcome,
    pub reasons: Vec<GateReason>,
}

impl GateDecision {
    pub fn veto(reason: GateReason) -> Self {
        Self {
            ampel: Ampel::Red,
            outcome: GateOutcome::Vetoed,
            reasons: vec![reason],
        }
    }

    pub fn is_vetoed(&self) -> bool {
        matches!(self.outcome, GateOutcome::Vetoed)
    }

    pub fn score(&self) -> Option<u8> {
        match self.outcome {
            GateOutcome::Scored(s) => Some(s),
            GateOutcome::Vetoed => None,
        }
    }

    /// Human-readable reasons, in evaluation order.
    pub fn reason_texts(&self) -> Vec<&'static str> {
        self.reasons.iter().map(|r| r.description()).collect()
    }
}

/// A veto-then-score decision rule over a snapshot.
pub trait Gatekeeper: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, snapshot: &MarketSnapshot) -> GateDecision;
}

/// Accumulates points and reasons in evaluation order.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    points: u32,
    reasons: Vec<GateReason>,
}

impl Tally {
    pub(crate) fn award(&mut self, condition: bool, points: u32, reason: GateReason) {
        if condition {
            self.points += points;
            self.reasons.push(reason);
        }
    }

    pub(crate) fn finish(self, cuts: crate::scoring::AmpelThresholds) -> GateDecision {
        let score = self.points.min(100) as u8;
        GateDecision {
            ampel: cuts.classify(score),
            outcome: GateOutcome::Scored(score),
            reasons: self.reasons,
        }
    }
}
