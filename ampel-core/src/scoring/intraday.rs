//! Intraday setup score over a minute-bar window.
//!
//! Four checks on the last bar: close above VWAP (+30), fast EMA above slow
//! EMA (+20), absolute one-bar return above a threshold (+30), volume above
//! its rolling average (+20).

use crate::config::ConfigError;
use crate::domain::bar::closes;
use crate::domain::Bar;
use crate::indicators::{average_volume, ema, last_defined, pct_change, vwap, IndicatorError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntradayConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub volume_window: usize,
    /// Minimum absolute one-bar return, in percent.
    pub min_abs_return_pct: f64,
    /// Only the most recent `lookback_bars` bars are scored.
    pub lookback_bars: usize,
}

impl Default for IntradayConfig {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 20,
            volume_window: 20,
            min_abs_return_pct: 0.5,
            lookback_bars: 120,
        }
    }
}

impl IntradayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ema_fast == 0 || self.ema_slow == 0 || self.volume_window == 0 {
            return Err(ConfigError::Invalid(
                "intraday periods must be >= 1".into(),
            ));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(ConfigError::Invalid(format!(
                "intraday.ema_fast ({}) must be below ema_slow ({})",
                self.ema_fast, self.ema_slow
            )));
        }
        if !(self.min_abs_return_pct.is_finite() && self.min_abs_return_pct >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "intraday.min_abs_return_pct must be finite and >= 0, got {}",
                self.min_abs_return_pct
            )));
        }
        let needed = self.ema_slow.max(self.volume_window);
        if self.lookback_bars < needed {
            return Err(ConfigError::Invalid(format!(
                "intraday.lookback_bars ({}) must cover ema_slow and volume_window ({needed})",
                self.lookback_bars
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupQuality {
    Strong,
    Solid,
    Weak,
}

impl SetupQuality {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            SetupQuality::Strong
        } else if score >= 60 {
            SetupQuality::Solid
        } else {
            SetupQuality::Weak
        }
    }
}

/// Result of the intraday checks, with the last-bar values used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradaySetup {
    pub score: u8,
    pub quality: SetupQuality,
    pub close: f64,
    pub vwap: f64,
    pub return_pct: f64,
    pub above_vwap: bool,
    pub ema_rising: bool,
    pub strong_move: bool,
    pub volume_above_average: bool,
}

/// Score the last bar of `bars`. Needs `max(ema_slow, volume_window)` bars.
///
/// VWAP accumulates from the first bar scored, so pass a single session
/// (see [`ExchangeClock::session_bars`](crate::clock::ExchangeClock::session_bars));
/// at most `lookback_bars` trailing bars are used.
pub fn intraday_setup_score(
    bars: &[Bar],
    config: &IntradayConfig,
) -> Result<IntradaySetup, IndicatorError> {
    let bars = &bars[bars.len().saturating_sub(config.lookback_bars)..];
    let needed = config.ema_slow.max(config.volume_window).max(2);
    if bars.len() < needed {
        return Err(IndicatorError::InsufficientData);
    }

    let close_series = closes(bars);
    let last = &bars[bars.len() - 1];

    let session_vwap = last_defined(&vwap(bars)?).ok_or(IndicatorError::InsufficientData)?;
    let fast = last_defined(&ema(&close_series, config.ema_fast)?);
    let slow = last_defined(&ema(&close_series, config.ema_slow)?);
    let return_pct = last_defined(&pct_change(&close_series)?).unwrap_or(0.0);
    let avg_volume = last_defined(&average_volume(bars, config.volume_window)?);

    let above_vwap = last.close > session_vwap;
    let ema_rising = matches!((fast, slow), (Some(f), Some(s)) if f > s);
    let strong_move = return_pct.abs() > config.min_abs_return_pct;
    let volume_above_average = matches!(avg_volume, Some(avg) if last.volume as f64 > avg);

    let score = [
        (above_vwap, 30u8),
        (ema_rising, 20),
        (strong_move, 30),
        (volume_above_average, 20),
    ]
    .iter()
    .filter(|(hit, _)| *hit)
    .map(|(_, pts)| pts)
    .sum::<u8>();

    Ok(IntradaySetup {
        score,
        quality: SetupQuality::from_score(score),
        close: last.close,
        vwap: session_vwap,
        return_pct,
        above_vwap,
        ema_rising,
        strong_move,
        volume_above_average,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ExchangeClock;
    use crate::indicators::make_bars;
    use chrono::TimeZone;

    fn rising_bars(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.2).collect();
        make_bars(&closes)
    }

    #[test]
    fn quality_cuts() {
        assert_eq!(SetupQuality::from_score(80), SetupQuality::Strong);
        assert_eq!(SetupQuality::from_score(79), SetupQuality::Solid);
        assert_eq!(SetupQuality::from_score(60), SetupQuality::Solid);
        assert_eq!(SetupQuality::from_score(59), SetupQuality::Weak);
    }

    #[test]
    fn strong_breakout_scores_full() {
        let mut bars = rising_bars(30);
        let last = bars.len() - 1;
        // +2% move on triple volume
        bars[last].close = bars[last - 1].close * 1.02;
        bars[last].high = bars[last].close + 1.0;
        bars[last].volume = 3000;

        let setup = intraday_setup_score(&bars, &IntradayConfig::default()).unwrap();
        assert!(setup.above_vwap);
        assert!(setup.ema_rising);
        assert!(setup.strong_move);
        assert!(setup.volume_above_average);
        assert_eq!(setup.score, 100);
        assert_eq!(setup.quality, SetupQuality::Strong);
    }

    #[test]
    fn slow_drift_without_volume_is_weak() {
        let setup = intraday_setup_score(&rising_bars(30), &IntradayConfig::default()).unwrap();
        // Above VWAP and rising, but the 0.2-point step is < 0.5% and volume is flat.
        assert!(setup.above_vwap);
        assert!(setup.ema_rising);
        assert!(!setup.strong_move);
        assert!(!setup.volume_above_average);
        assert_eq!(setup.score, 50);
        assert_eq!(setup.quality, SetupQuality::Weak);
    }

    /// Yesterday's session near 200, today's first half hour climbing from
    /// 100. One minute bar each, New York EST (UTC-5).
    fn two_sessions() -> Vec<Bar> {
        let bar = |at: chrono::DateTime<chrono::Utc>, close: f64| Bar {
            symbol: "AAPL".into(),
            timestamp: at,
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1_000,
        };
        let yesterday = chrono::Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let today = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let mut bars: Vec<Bar> = (0..90)
            .map(|i| bar(yesterday + chrono::Duration::minutes(i), 200.0))
            .collect();
        bars.extend(
            (0..30).map(|i| bar(today + chrono::Duration::minutes(i), 100.0 + i as f64 * 0.2)),
        );
        bars
    }

    #[test]
    fn vwap_over_two_sessions_differs_from_session_vwap() {
        let bars = two_sessions();
        let config = IntradayConfig::default();

        let spanning = intraday_setup_score(&bars, &config).unwrap();
        assert!(spanning.vwap > 150.0);
        assert!(!spanning.above_vwap);

        let session = ExchangeClock::nyse().session_bars(&bars);
        assert_eq!(session.len(), 30);
        let trimmed = intraday_setup_score(session, &config).unwrap();
        assert!(trimmed.vwap < 106.0);
        assert!(trimmed.above_vwap);
    }

    #[test]
    fn lookback_limits_the_scored_window() {
        let config = IntradayConfig {
            lookback_bars: 30,
            ..IntradayConfig::default()
        };
        let setup = intraday_setup_score(&two_sessions(), &config).unwrap();
        assert!(setup.above_vwap);
        assert!(setup.vwap < 106.0);
    }

    #[test]
    fn lookback_must_cover_indicator_windows() {
        let config = IntradayConfig {
            lookback_bars: 10,
            ..IntradayConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(IntradayConfig::default().validate().is_ok());
    }

    #[test]
    fn short_window_is_insufficient() {
        assert_eq!(
            intraday_setup_score(&rising_bars(5), &IntradayConfig::default()),
            Err(IndicatorError::InsufficientData)
        );
    }
}
