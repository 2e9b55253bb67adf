//! Momentum scanner over minute bars.
//!
//! A symbol is a candidate when its last one-bar return is at least
//! `min_abs_return_pct` in either direction and the last bar's volume is
//! above `volume_spike_factor` times its rolling average.

use crate::config::ConfigError;
use crate::data::{BarRequest, BarSource};
use crate::domain::bar::closes;
use crate::domain::Bar;
use crate::indicators::{average_volume, last_defined, pct_change};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Minimum absolute one-bar return, in percent.
    pub min_abs_return_pct: f64,
    pub volume_spike_factor: f64,
    pub volume_window: usize,
    /// Minute bars requested per symbol.
    pub lookback_bars: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            min_abs_return_pct: 0.3,
            volume_spike_factor: 1.5,
            volume_window: 20,
            lookback_bars: 60,
        }
    }
}

impl MomentumConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_abs_return_pct.is_finite() && self.min_abs_return_pct >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "momentum.min_abs_return_pct must be finite and >= 0, got {}",
                self.min_abs_return_pct
            )));
        }
        if !(self.volume_spike_factor.is_finite() && self.volume_spike_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "momentum.volume_spike_factor must be finite and > 0, got {}",
                self.volume_spike_factor
            )));
        }
        if self.volume_window == 0 || self.lookback_bars < self.volume_window {
            return Err(ConfigError::Invalid(format!(
                "momentum.lookback_bars ({}) must cover volume_window ({}) >= 1",
                self.lookback_bars, self.volume_window
            )));
        }
        Ok(())
    }
}

/// Direction suggested by the last one-bar return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumSignal {
    LongCall,
    ShortPut,
    Neutral,
}

impl MomentumSignal {
    pub fn label(&self) -> &'static str {
        match self {
            MomentumSignal::LongCall => "LONG / CALL",
            MomentumSignal::ShortPut => "SHORT / PUT",
            MomentumSignal::Neutral => "NEUTRAL",
        }
    }
}

/// Long above `+threshold`, short below `-threshold`, otherwise neutral.
pub fn momentum_signal(return_pct: f64, threshold_pct: f64) -> MomentumSignal {
    if return_pct > threshold_pct {
        MomentumSignal::LongCall
    } else if return_pct < -threshold_pct {
        MomentumSignal::ShortPut
    } else {
        MomentumSignal::Neutral
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomentumCandidate {
    pub symbol: String,
    pub close: f64,
    pub return_pct: f64,
    pub volume: u64,
    pub average_volume: f64,
    pub signal: MomentumSignal,
}

/// Check the last bar of one series. `None` when the series is too short
/// or the bar does not qualify.
pub fn momentum_check(symbol: &str, bars: &[Bar], config: &MomentumConfig) -> Option<MomentumCandidate> {
    if bars.len() < config.volume_window.max(2) {
        return None;
    }
    let last = &bars[bars.len() - 1];
    let return_pct = last_defined(&pct_change(&closes(bars)).ok()?)?;
    let avg = last_defined(&average_volume(bars, config.volume_window).ok()?)?;

    let moved = return_pct.abs() >= config.min_abs_return_pct;
    let spiked = last.volume as f64 > avg * config.volume_spike_factor;
    (moved && spiked).then(|| MomentumCandidate {
        symbol: symbol.to_string(),
        close: last.close,
        return_pct,
        volume: last.volume,
        average_volume: avg,
        signal: momentum_signal(return_pct, config.min_abs_return_pct),
    })
}

/// Candidates among already-fetched series, in input order.
pub fn momentum_candidates<'a, S, I>(series: I, config: &MomentumConfig) -> Vec<MomentumCandidate>
where
    S: AsRef<str> + 'a,
    I: IntoIterator<Item = (S, &'a [Bar])>,
{
    series
        .into_iter()
        .filter_map(|(symbol, bars)| momentum_check(symbol.as_ref(), bars, config))
        .collect()
}

/// Fetch minute bars for each symbol and return the candidates. Symbols
/// whose fetch fails are skipped.
pub fn scan_momentum<T: AsRef<str>>(
    source: &dyn BarSource,
    symbols: &[T],
    config: &MomentumConfig,
) -> Vec<MomentumCandidate> {
    let mut candidates = Vec::new();
    for symbol in symbols {
        let symbol = symbol.as_ref();
        let request = BarRequest::latest(
            symbol,
            crate::data::Timeframe::Minute,
            config.lookback_bars,
        );
        match source.fetch(&request) {
            Ok(bars) => {
                if let Some(candidate) = momentum_check(symbol, &bars, config) {
                    debug!(symbol, return_pct = candidate.return_pct, "momentum candidate");
                    candidates.push(candidate);
                }
            }
            Err(e) => warn!(symbol, error = %e, "momentum scan skipped symbol"),
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    /// 25 flat bars, then a last bar with the given close and volume.
    fn series(last_close: f64, last_volume: u64) -> Vec<Bar> {
        let mut closes = vec![100.0; 25];
        closes.push(last_close);
        let mut bars = make_bars(&closes);
        if let Some(last) = bars.last_mut() {
            last.volume = last_volume;
        }
        bars
    }

    #[test]
    fn signal_thresholds_are_strict() {
        assert_eq!(momentum_signal(0.31, 0.3), MomentumSignal::LongCall);
        assert_eq!(momentum_signal(-0.5, 0.3), MomentumSignal::ShortPut);
        assert_eq!(momentum_signal(0.3, 0.3), MomentumSignal::Neutral);
        assert_eq!(momentum_signal(0.0, 0.3), MomentumSignal::Neutral);
    }

    #[test]
    fn move_with_volume_spike_is_candidate() {
        // avg over last 20 = (19*1000 + 5000)/20 = 1200; 5000 > 1800
        let bars = series(100.5, 5000);
        let c = momentum_check("TSLA", &bars, &MomentumConfig::default()).unwrap();
        assert_eq!(c.symbol, "TSLA");
        assert!((c.return_pct - 0.5).abs() < 1e-9);
        assert_eq!(c.signal, MomentumSignal::LongCall);
        assert!((c.average_volume - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn move_without_volume_is_not_candidate() {
        assert!(momentum_check("TSLA", &series(100.5, 1000), &MomentumConfig::default()).is_none());
    }

    #[test]
    fn volume_without_move_is_not_candidate() {
        assert!(momentum_check("TSLA", &series(100.1, 5000), &MomentumConfig::default()).is_none());
    }

    #[test]
    fn short_series_is_skipped() {
        let bars = make_bars(&[100.0, 101.0]);
        assert!(momentum_check("TSLA", &bars, &MomentumConfig::default()).is_none());
    }

    #[test]
    fn candidates_keep_input_order() {
        let up = series(101.0, 5000);
        let down = series(99.0, 5000);
        let quiet = series(100.0, 1000);
        let found = momentum_candidates(
            [("UP", up.as_slice()), ("QUIET", quiet.as_slice()), ("DOWN", down.as_slice())],
            &MomentumConfig::default(),
        );
        let symbols: Vec<&str> = found.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["UP", "DOWN"]);
        assert_eq!(found[1].signal, MomentumSignal::ShortPut);
    }
}
