//! Pre-market gap scanner.
//!
//! Gap = latest intraday close against the previous session's daily close.
//! A mover needs |gap| >= `min_abs_gap_pct`, price >= `min_price` and summed
//! intraday volume >= `min_volume`. Movers are ranked by |gap|, largest
//! first, and truncated to `max_results`.

use crate::config::ConfigError;
use crate::data::{BarRequest, BarSource, DataError, Timeframe};
use crate::domain::Bar;
use crate::plan::round2;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapScanConfig {
    pub min_abs_gap_pct: f64,
    pub min_price: f64,
    pub min_volume: u64,
    /// Minute bars summed for the volume check.
    pub intraday_bars: usize,
    pub max_results: usize,
}

impl Default for GapScanConfig {
    fn default() -> Self {
        Self {
            min_abs_gap_pct: 2.0,
            min_price: 5.0,
            min_volume: 10_000,
            intraday_bars: 30,
            max_results: 20,
        }
    }
}

impl GapScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_abs_gap_pct.is_finite() && self.min_abs_gap_pct >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gap_scan.min_abs_gap_pct must be finite and >= 0, got {}",
                self.min_abs_gap_pct
            )));
        }
        if !(self.min_price.is_finite() && self.min_price >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gap_scan.min_price must be finite and >= 0, got {}",
                self.min_price
            )));
        }
        if self.intraday_bars == 0 || self.max_results == 0 {
            return Err(ConfigError::Invalid(
                "gap_scan.intraday_bars and max_results must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapDirection {
    GapUp,
    GapDown,
}

impl fmt::Display for GapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GapDirection::GapUp => "gap-up",
            GapDirection::GapDown => "gap-down",
        })
    }
}

/// Price and gap are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapMover {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub gap_pct: f64,
    pub direction: GapDirection,
    pub volume: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct GapScanReport {
    pub movers: Vec<GapMover>,
    /// Symbols whose bars could not be fetched.
    pub failed: usize,
    /// Symbols with too little data for a gap.
    pub incomplete: usize,
}

/// Evaluate one symbol from its daily bars (the last one is the current
/// session) and its recent intraday bars.
pub fn gap_mover(
    symbol: &str,
    daily: &[Bar],
    intraday: &[Bar],
    config: &GapScanConfig,
) -> Option<GapMover> {
    if daily.len() < 2 {
        return None;
    }
    let previous_close = daily[daily.len() - 2].close;
    let price = intraday.last()?.close;
    if previous_close <= 0.0 {
        return None;
    }

    let gap_pct = (price - previous_close) / previous_close * 100.0;
    let volume: u64 = intraday.iter().map(|b| b.volume).sum();

    if gap_pct.abs() < config.min_abs_gap_pct || price < config.min_price || volume < config.min_volume
    {
        return None;
    }

    Some(GapMover {
        symbol: symbol.to_string(),
        price: round2(price),
        previous_close: round2(previous_close),
        gap_pct: round2(gap_pct),
        direction: if gap_pct > 0.0 {
            GapDirection::GapUp
        } else {
            GapDirection::GapDown
        },
        volume,
    })
}

/// Rank by absolute gap, largest first, and keep `max_results`.
pub fn rank_movers(mut movers: Vec<GapMover>, max_results: usize) -> Vec<GapMover> {
    movers.sort_by(|a, b| b.gap_pct.abs().total_cmp(&a.gap_pct.abs()));
    movers.truncate(max_results);
    movers
}

pub fn scan_gap_movers<T: AsRef<str>>(
    source: &dyn BarSource,
    symbols: &[T],
    config: &GapScanConfig,
) -> GapScanReport {
    let mut report = GapScanReport::default();
    let mut movers = Vec::new();

    for symbol in symbols {
        let symbol = symbol.as_ref();
        let fetched = source
            .fetch(&BarRequest::latest(symbol, Timeframe::Day, 2))
            .and_then(|daily| {
                let intraday = source.fetch(&BarRequest::latest(
                    symbol,
                    Timeframe::Minute,
                    config.intraday_bars,
                ))?;
                Ok((daily, intraday))
            });

        match fetched {
            Ok((daily, intraday)) => {
                if daily.len() < 2 {
                    debug!(symbol, bars = daily.len(), "not enough daily bars for a gap");
                    report.incomplete += 1;
                } else if let Some(mover) = gap_mover(symbol, &daily, &intraday, config) {
                    debug!(symbol, gap_pct = mover.gap_pct, "gap mover");
                    movers.push(mover);
                }
            }
            Err(DataError::NoData { .. }) => {
                debug!(symbol, "no bars for gap scan");
                report.incomplete += 1;
            }
            Err(e) => {
                warn!(symbol, error = %e, "gap scan skipped symbol");
                report.failed += 1;
            }
        }
    }

    report.movers = rank_movers(movers, config.max_results);
    info!(
        movers = report.movers.len(),
        failed = report.failed,
        incomplete = report.incomplete,
        "gap scan complete"
    );
    report
}
