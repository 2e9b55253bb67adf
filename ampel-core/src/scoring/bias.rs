//! Directional option bias derived from score and EMA stack.

use crate::domain::MarketSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionBias {
    Call,
    Put,
    Neutral,
}

impl fmt::Display for OptionBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionBias::Call => "CALL",
            OptionBias::Put => "PUT",
            OptionBias::Neutral => "NEUTRAL",
        })
    }
}

/// Minimum score for a directional bias.
pub const DEFAULT_BIAS_MIN_SCORE: u8 = 60;

/// Bias with the default 60-point cut.
pub fn option_bias(s: &MarketSnapshot, score: u8) -> OptionBias {
    option_bias_with(s, score, DEFAULT_BIAS_MIN_SCORE)
}

/// Neutral below `min_score`; otherwise Call on a bullish EMA stack, Put on a
/// bearish one, Neutral when the stack is mixed.
pub fn option_bias_with(s: &MarketSnapshot, score: u8, min_score: u8) -> OptionBias {
    if score < min_score {
        OptionBias::Neutral
    } else if s.is_bullish_stack() {
        OptionBias::Call
    } else if s.is_bearish_stack() {
        OptionBias::Put
    } else {
        OptionBias::Neutral
    }
}
