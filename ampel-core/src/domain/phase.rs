//! Market phase relative to the exchange's regular session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trading phase of the exchange at the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketPhase {
    /// Before the regular session opens.
    Pre,
    /// Regular session.
    Open,
    /// After hours, weekends.
    Closed,
}

impl MarketPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketPhase::Pre => "PRE",
            MarketPhase::Open => "OPEN",
            MarketPhase::Closed => "CLOSED",
        }
    }

    /// Phases in which intraday trading is possible.
    pub fn is_tradable(&self) -> bool {
        matches!(self, MarketPhase::Pre | MarketPhase::Open)
    }
}

impl fmt::Display for MarketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRE" => Ok(MarketPhase::Pre),
            "OPEN" => Ok(MarketPhase::Open),
            "CLOSED" => Ok(MarketPhase::Closed),
            other => Err(format!("unknown market phase '{other}'")),
        }
    }
}
