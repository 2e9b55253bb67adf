//! Ampel Core: indicators, market snapshots, trend scoring, gatekeepers,
//! trade plans and scanners.
//!
//! The pipeline for one instrument:
//! - bars → indicator series (EMA, RSI, ATR, VWAP, volume ratio)
//! - latest values → validated `MarketSnapshot`
//! - snapshot → trend score and ampel, option bias
//! - snapshot → day-trade and swing gate decisions
//! - snapshot + score → optional trade plan
//!
//! Bar sources and the market clock are injected; the core never talks to a
//! concrete feed or reads the system clock directly.

pub mod clock;
pub mod config;
pub mod data;
pub mod domain;
pub mod gates;
pub mod indicators;
pub mod plan;
pub mod scan;
pub mod scoring;
pub mod snapshot;

pub use clock::{ClockConfig, ExchangeClock, MarketClock, StaticClock};
pub use config::{AmpelConfig, ConfigError};
pub use domain::{Bar, MarketPhase, MarketSnapshot, SnapshotError, SnapshotFields};
pub use gates::{gate_daytrade, gate_swing, GateDecision, Gatekeeper};
pub use plan::{legacy_plan, plan, plan_with, PlanConfig, TradePlan};
pub use scoring::{calculate_trend_score, option_bias, Ampel, OptionBias, TrendScore};
pub use snapshot::{IndicatorConfig, SnapshotBuilder};
