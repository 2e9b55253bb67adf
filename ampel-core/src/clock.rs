//! Market clock: classifies an instant into PRE / OPEN / CLOSED.
//!
//! The schedule is fixed per exchange (default NYSE, America/New_York):
//! weekends are closed, 04:00–09:30 is pre-market, 09:30–16:00 is the
//! regular session, everything else is closed. Exchange holidays are not
//! modelled.

use crate::config::ConfigError;
use crate::domain::{Bar, MarketPhase};
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Source of "now" and of the market phase at an instant.
pub trait MarketClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn phase_at(&self, at: DateTime<Utc>) -> MarketPhase;

    fn phase(&self) -> MarketPhase {
        self.phase_at(self.now())
    }
}

/// Exchange schedule in the exchange's local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// IANA time zone name.
    pub timezone: String,
    pub premarket_start: NaiveTime,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timezone: "America/New_York".into(),
            premarket_start: NaiveTime::from_hms_opt(4, 0, 0).unwrap_or_default(),
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        }
    }
}

impl ClockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone '{}'", self.timezone)))?;
        if !(self.premarket_start <= self.open && self.open < self.close) {
            return Err(ConfigError::Invalid(
                "clock schedule must satisfy premarket_start <= open < close".into(),
            ));
        }
        Ok(())
    }
}

/// Wall clock with a fixed exchange schedule.
#[derive(Debug, Clone)]
pub struct ExchangeClock {
    tz: Tz,
    premarket_start: NaiveTime,
    open: NaiveTime,
    close: NaiveTime,
}

impl ExchangeClock {
    pub fn from_config(config: &ClockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let tz = config
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown timezone '{}'", config.timezone)))?;
        Ok(Self {
            tz,
            premarket_start: config.premarket_start,
            open: config.open,
            close: config.close,
        })
    }

    /// NYSE regular hours.
    pub fn nyse() -> Self {
        let config = ClockConfig::default();
        Self {
            tz: chrono_tz::America::New_York,
            premarket_start: config.premarket_start,
            open: config.open,
            close: config.close,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Trailing bars that fall on the same exchange-local date as the last
    /// bar, i.e. the current session including its pre-market.
    pub fn session_bars<'a>(&self, bars: &'a [Bar]) -> &'a [Bar] {
        let Some(last) = bars.last() else {
            return bars;
        };
        let day = last.timestamp.with_timezone(&self.tz).date_naive();
        let start = bars
            .iter()
            .rposition(|b| b.timestamp.with_timezone(&self.tz).date_naive() != day)
            .map_or(0, |i| i + 1);
        &bars[start..]
    }
}

impl MarketClock for ExchangeClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn phase_at(&self, at: DateTime<Utc>) -> MarketPhase {
        let local = at.with_timezone(&self.tz);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketPhase::Closed;
        }
        let t = local.time();
        if t >= self.open && t < self.close {
            MarketPhase::Open
        } else if t >= self.premarket_start && t < self.open {
            MarketPhase::Pre
        } else {
            MarketPhase::Closed
        }
    }
}

/// Clock that always reports one phase. Used for offline evaluation of
/// historical series and in tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticClock {
    pub phase: MarketPhase,
    pub now: DateTime<Utc>,
}

impl StaticClock {
    pub fn new(phase: MarketPhase) -> Self {
        Self {
            phase,
            now: DateTime::<Utc>::default(),
        }
    }
}

impl MarketClock for StaticClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn phase_at(&self, _at: DateTime<Utc>) -> MarketPhase {
        self.phase
    }
}
