//! Traffic-light (Ampel) classification of a score.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete decision label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ampel {
    Green,
    Yellow,
    Red,
}

impl Ampel {
    /// Action label: BUY / NEUTRAL / AVOID.
    pub fn label(&self) -> &'static str {
        match self {
            Ampel::Green => "BUY",
            Ampel::Yellow => "NEUTRAL",
            Ampel::Red => "AVOID",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Ampel::Green => "green",
            Ampel::Yellow => "yellow",
            Ampel::Red => "red",
        }
    }
}

impl fmt::Display for Ampel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score cut-offs: `score >= green` is Green, `score >= yellow` is Yellow,
/// anything below is Red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpelThresholds {
    pub green: u8,
    pub yellow: u8,
}

impl AmpelThresholds {
    pub const fn new(green: u8, yellow: u8) -> Self {
        Self { green, yellow }
    }

    /// 70 / 45, the default for the trend score.
    pub const fn three_tier() -> Self {
        Self::new(70, 45)
    }

    /// 60 / 40.
    pub const fn two_tier() -> Self {
        Self::new(60, 40)
    }

    pub fn classify(&self, score: u8) -> Ampel {
        if score >= self.green {
            Ampel::Green
        } else if score >= self.yellow {
            Ampel::Yellow
        } else {
            Ampel::Red
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.yellow > self.green || self.green > 100 {
            return Err(ConfigError::Invalid(format!(
                "ampel thresholds must satisfy yellow <= green <= 100 (green={}, yellow={})",
                self.green, self.yellow
            )));
        }
        Ok(())
    }
}

impl Default for AmpelThresholds {
    fn default() -> Self {
        Self::three_tier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_tier_boundaries() {
        let t = AmpelThresholds::three_tier();
        assert_eq!(t.classify(100), Ampel::Green);
        assert_eq!(t.classify(70), Ampel::Green);
        assert_eq!(t.classify(69), Ampel::Yellow);
        assert_eq!(t.classify(45), Ampel::Yellow);
        assert_eq!(t.classify(44), Ampel::Red);
        assert_eq!(t.classify(0), Ampel::Red);
    }

    #[test]
    fn two_tier_boundaries() {
        let t = AmpelThresholds::two_tier();
        assert_eq!(t.classify(60), Ampel::Green);
        assert_eq!(t.classify(59), Ampel::Yellow);
        assert_eq!(t.classify(40), Ampel::Yellow);
        assert_eq!(t.classify(39), Ampel::Red);
    }

    #[test]
    fn labels() {
        assert_eq!(Ampel::Green.to_string(), "BUY");
        assert_eq!(Ampel::Yellow.label(), "NEUTRAL");
        assert_eq!(Ampel::Red.label(), "AVOID");
        assert_eq!(Ampel::Red.color(), "red");
    }

    #[test]
    fn inverted_thresholds_invalid() {
        assert!(AmpelThresholds::new(40, 60).validate().is_err());
        assert!(AmpelThresholds::new(101, 50).validate().is_err());
        assert!(AmpelThresholds::three_tier().validate().is_ok());
    }
}
