//! Scoring engine: trend score, ampel mapping, option bias, intraday setup.

pub mod ampel;
pub mod bias;
pub mod intraday;
pub mod trend;

pub use ampel::{Ampel, AmpelThresholds};
pub use bias::{option_bias, option_bias_with, OptionBias};
pub use intraday::{intraday_setup_score, IntradayConfig, IntradaySetup, SetupQuality};
pub use trend::{calculate_trend_score, TrendScore};

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Thresholds applied to the trend score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Option bias stays Neutral below this trend score.
    pub bias_min_score: u8,
    pub ampel: AmpelThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            bias_min_score: bias::DEFAULT_BIAS_MIN_SCORE,
            ampel: AmpelThresholds::three_tier(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ampel.validate()?;
        if self.bias_min_score > 100 {
            return Err(ConfigError::Invalid(format!(
                "bias_min_score must be <= 100, got {}",
                self.bias_min_score
            )));
        }
        Ok(())
    }
}
