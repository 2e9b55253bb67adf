//! Run configuration.
//!
//! Everything is defaulted, so an empty TOML file (or no file at all) gives
//! the stock thresholds. Sections mirror the pipeline stages:
//!
//! ```toml
//! watchlist = ["AAPL", "NVDA"]
//!
//! [indicators]
//! ema_slow = 50
//!
//! [scoring.ampel]
//! green = 60
//! yellow = 40
//! ```

use crate::clock::ClockConfig;
use crate::gates::{DayTradeGate, SwingGate};
use crate::plan::PlanConfig;
use crate::scan::{GapScanConfig, MomentumConfig};
use crate::scoring::{IntradayConfig, ScoringConfig};
use crate::snapshot::IndicatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub const DEFAULT_WATCHLIST: [&str; 10] = [
    "AAPL", "NVDA", "AMD", "TSLA", "META", "MSFT", "AMZN", "COIN", "PLTR", "NFLX",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmpelConfig {
    pub watchlist: Vec<String>,
    pub indicators: IndicatorConfig,
    pub scoring: ScoringConfig,
    pub day_trade: DayTradeGate,
    pub swing: SwingGate,
    pub plan: PlanConfig,
    pub momentum: MomentumConfig,
    pub gap_scan: GapScanConfig,
    pub intraday: IntradayConfig,
    pub clock: ClockConfig,
}

impl Default for AmpelConfig {
    fn default() -> Self {
        Self {
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
            indicators: IndicatorConfig::default(),
            scoring: ScoringConfig::default(),
            day_trade: DayTradeGate::default(),
            swing: SwingGate::default(),
            plan: PlanConfig::default(),
            momentum: MomentumConfig::default(),
            gap_scan: GapScanConfig::default(),
            intraday: IntradayConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl AmpelConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watchlist.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("watchlist contains an empty symbol".into()));
        }
        self.indicators.validate()?;
        self.scoring.validate()?;
        self.day_trade.validate()?;
        self.swing.validate()?;
        self.plan.validate()?;
        self.momentum.validate()?;
        self.gap_scan.validate()?;
        self.intraday.validate()?;
        self.clock.validate()?;
        Ok(())
    }

    /// Watchlist symbols, upper-cased and de-duplicated in order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.watchlist.len());
        for symbol in &self.watchlist {
            let symbol = symbol.trim().to_uppercase();
            if !out.contains(&symbol) {
                out.push(symbol);
            }
        }
        out
    }
}
