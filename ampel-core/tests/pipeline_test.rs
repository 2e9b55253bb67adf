//! End-to-end pipeline tests: snapshot → score → ampel → gates → plan.

use ampel_core::clock::{ExchangeClock, MarketClock, StaticClock};
use ampel_core::config::AmpelConfig;
use ampel_core::domain::{Bar, MarketPhase, MarketSnapshot, SnapshotFields};
use ampel_core::gates::{gate_daytrade, gate_swing, GateOutcome, GateReason};
use ampel_core::plan::{legacy_plan, plan};
use ampel_core::scan::Evaluator;
use ampel_core::scoring::{calculate_trend_score, option_bias, Ampel, OptionBias};
use ampel_core::snapshot::{IndicatorConfig, SnapshotBuilder};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn reference_fields() -> SnapshotFields {
    SnapshotFields {
        symbol: "AAPL".into(),
        price: 100.0,
        rsi: 58.0,
        ema_fast: 105.0,
        ema_mid: 102.0,
        ema_slow: 98.0,
        atr: 2.0,
        volume_ratio: 1.6,
        market_phase: MarketPhase::Open,
    }
}

/// Minute bars starting at `start`, one per minute, with a steady climb
/// and a mild zigzag so both gains and losses occur.
fn climbing_bars(start: DateTime<Utc>, n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = 50.0 + i as f64 * 0.25 + if i % 4 == 0 { -0.3 } else { 0.0 };
            let open = close - 0.1;
            Bar {
                symbol: "NVDA".into(),
                timestamp: start + Duration::minutes(i as i64),
                open,
                high: close + 0.6,
                low: open - 0.6,
                close,
                volume: 10_000 + (i as u64 % 7) * 500,
            }
        })
        .collect()
}

#[test]
fn reference_snapshot_scores_full_marks() {
    let s = MarketSnapshot::new(reference_fields()).unwrap();
    let score = calculate_trend_score(&s);
    assert_eq!(score.value(), 100);

    let ampel = AmpelConfig::default().scoring.ampel.classify(score.value());
    assert_eq!(ampel, Ampel::Green);
    assert_eq!(ampel.label(), "BUY");
    assert_eq!(option_bias(&s, score.value()), OptionBias::Call);
}

#[test]
fn closed_market_day_trade_is_red_with_single_reason() {
    let s = MarketSnapshot::new(SnapshotFields {
        market_phase: MarketPhase::Closed,
        ..reference_fields()
    })
    .unwrap();
    let d = gate_daytrade(&s);
    assert_eq!(d.ampel, Ampel::Red);
    assert_eq!(d.outcome, GateOutcome::Vetoed);
    assert_eq!(d.reasons, vec![GateReason::MarketClosed]);
    assert_eq!(d.reason_texts(), vec!["market closed"]);
}

#[test]
fn plan_reference_levels() {
    let s = MarketSnapshot::new(SnapshotFields {
        symbol: "PLTR".into(),
        price: 50.0,
        atr: 5.0,
        ..reference_fields()
    })
    .unwrap();
    let p = plan(&s, 70).unwrap();
    assert_eq!((p.entry, p.stop, p.target, p.reward_risk), (50.0, 44.0, 62.0, 2.0));
    assert!(plan(&s, 60).is_none());

    let legacy = legacy_plan(&s);
    assert_eq!((legacy.stop, legacy.target), (42.5, 65.0));
}

#[test]
fn swing_gate_on_reference_snapshot() {
    let s = MarketSnapshot::new(reference_fields()).unwrap();
    let d = gate_swing(&s);
    // 30 + 15 + 10: the default swing cuts top out at Yellow
    assert_eq!(d.score(), Some(55));
    assert_eq!(d.ampel, Ampel::Yellow);
}

#[test]
fn builder_from_bars_to_decision() {
    let start = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
    let bars = climbing_bars(start, 120);
    let builder = SnapshotBuilder::new(
        IndicatorConfig::default(),
        Box::new(StaticClock::new(MarketPhase::Open)),
    );
    let s = builder.evaluate("NVDA", &bars).unwrap();

    assert_eq!(s.price(), bars[119].close);
    assert!(s.is_bullish_stack());
    assert!((0.0..=100.0).contains(&s.rsi()));
    assert!(s.atr() > 0.0);
    assert!(s.volume_ratio() > 0.0);

    let score = calculate_trend_score(&s);
    assert!(score.value() >= 30, "bullish stack earns at least 30, got {score}");
}

#[test]
fn evaluate_at_uses_exchange_schedule() {
    // 2024-03-05 is a Tuesday; 13:00 UTC = 08:00 New York (EST)
    let start = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
    let bars = climbing_bars(start, 61);
    let builder = SnapshotBuilder::new(IndicatorConfig::default(), Box::new(ExchangeClock::nyse()));

    let last = bars[60].timestamp;
    assert_eq!(builder.clock().phase_at(last), MarketPhase::Pre);
    let s = builder.evaluate_at("NVDA", &bars, last).unwrap();
    assert_eq!(s.market_phase(), MarketPhase::Pre);

    let saturday = Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap();
    let s = builder.evaluate_at("NVDA", &bars, saturday).unwrap();
    assert_eq!(s.market_phase(), MarketPhase::Closed);
    assert!(gate_daytrade(&s).is_vetoed());
}

#[test]
fn evaluator_combines_every_stage() {
    let start = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
    let bars = climbing_bars(start, 80);
    let evaluator = Evaluator::new(
        AmpelConfig::default(),
        Box::new(StaticClock::new(MarketPhase::Open)),
    );
    let eval = evaluator.evaluate("NVDA", &bars).unwrap();

    assert_eq!(eval.symbol(), "NVDA");
    assert_eq!(
        eval.ampel,
        evaluator.config().scoring.ampel.classify(eval.score.value())
    );
    assert_eq!(eval.plan.is_some(), plan(&eval.snapshot, eval.score.value()).is_some());

    let json = serde_json::to_value(&eval).unwrap();
    assert_eq!(json["snapshot"]["symbol"], "NVDA");
    assert!(json["score"].is_u64());
}

#[test]
fn two_tier_preset_changes_the_light_not_the_score() {
    let s = MarketSnapshot::new(SnapshotFields {
        volume_ratio: 1.0,
        market_phase: MarketPhase::Closed,
        ..reference_fields()
    })
    .unwrap();
    // 30 + 20 + 0 + 15 + 0
    let score = calculate_trend_score(&s).value();
    assert_eq!(score, 65);

    let mut config = AmpelConfig::default();
    assert_eq!(config.scoring.ampel.classify(score), Ampel::Yellow);
    config.scoring.ampel = ampel_core::scoring::AmpelThresholds::two_tier();
    assert_eq!(config.scoring.ampel.classify(score), Ampel::Green);
}
