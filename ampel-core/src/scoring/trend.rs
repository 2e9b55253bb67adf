//! Trend score: additive rule checks over a snapshot, capped at 100.
//!
//! | rule                                   | points |
//! |----------------------------------------|--------|
//! | fast > mid > slow                      | 30     |
//! | fast > mid only                        | 15     |
//! | 50 <= rsi <= 65                        | 20     |
//! | 45 <= rsi < 50 or 65 < rsi <= 70       | 10     |
//! | volume_ratio > 1.5                     | 20     |
//! | volume_ratio > 1.1                     | 10     |
//! | atr / price > 0.015                    | 15     |
//! | phase OPEN                             | 15     |
//! | phase PRE                              | 8      |

use crate::domain::{MarketPhase, MarketSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer score in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendScore(u8);

impl TrendScore {
    pub const MAX: u8 = 100;

    /// Clamp an accumulated total into [0, 100].
    pub fn from_points(points: u32) -> Self {
        Self(points.min(Self::MAX as u32) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<TrendScore> for u8 {
    fn from(score: TrendScore) -> Self {
        score.0
    }
}

impl fmt::Display for TrendScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/100", self.0)
    }
}

/// Points awarded for the EMA structure.
pub fn ema_structure_points(s: &MarketSnapshot) -> u32 {
    if s.is_bullish_stack() {
        30
    } else if s.ema_fast() > s.ema_mid() {
        15
    } else {
        0
    }
}

pub fn rsi_points(rsi: f64) -> u32 {
    if (50.0..=65.0).contains(&rsi) {
        20
    } else if (45.0..50.0).contains(&rsi) || (rsi > 65.0 && rsi <= 70.0) {
        10
    } else {
        0
    }
}

pub fn volume_points(volume_ratio: f64) -> u32 {
    if volume_ratio > 1.5 {
        20
    } else if volume_ratio > 1.1 {
        10
    } else {
        0
    }
}

pub fn volatility_points(s: &MarketSnapshot) -> u32 {
    if s.relative_atr() > 0.015 {
        15
    } else {
        0
    }
}

pub fn phase_points(phase: MarketPhase) -> u32 {
    match phase {
        MarketPhase::Open => 15,
        MarketPhase::Pre => 8,
        MarketPhase::Closed => 0,
    }
}

/// Score a validated snapshot.
pub fn calculate_trend_score(s: &MarketSnapshot) -> TrendScore {
    let total = ema_structure_points(s)
        + rsi_points(s.rsi())
        + volume_points(s.volume_ratio())
        + volatility_points(s)
        + phase_points(s.market_phase());
    TrendScore::from_points(total)
}
