//! Ampel CLI: evaluate, scan, gap and momentum commands.
//!
//! Commands:
//! - `evaluate`: score one symbol from a CSV directory
//! - `scan`: evaluate the whole watchlist and rank it by trend score
//! - `gaps`: pre-market gap movers against the previous daily close
//! - `momentum`: last-bar return and volume spike candidates
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use ampel_core::clock::{ExchangeClock, MarketClock, StaticClock};
use ampel_core::config::AmpelConfig;
use ampel_core::data::{
    AlpacaBarSource, BarRequest, BarSource, CachedBarSource, CsvBarSource, Timeframe,
};
use ampel_core::domain::MarketPhase;
use ampel_core::gates::GateDecision;
use ampel_core::plan::legacy_plan;
use ampel_core::scan::{
    scan_gap_movers, scan_momentum, scan_watchlist, Evaluation, Evaluator, GapScanReport,
    MomentumCandidate, ScanReport,
};
use ampel_core::scoring::{intraday_setup_score, IntradaySetup};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ampel",
    about = "Ampel: momentum traffic lights for stocks and options"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single symbol from CSV bars.
    Evaluate {
        /// Directory holding `<SYMBOL>.csv` or `<timeframe>/<SYMBOL>.csv`.
        #[arg(long)]
        csv_dir: PathBuf,

        /// Symbol to evaluate.
        #[arg(long)]
        symbol: String,

        #[command(flatten)]
        common: CommonArgs,

        /// Bar timeframe.
        #[arg(long, default_value = "minute", value_parser = parse_timeframe)]
        timeframe: Timeframe,

        /// Number of most recent bars to load.
        #[arg(long, default_value_t = 390)]
        limit: usize,

        /// Override the market phase instead of reading the exchange clock.
        #[arg(long, value_parser = parse_phase)]
        phase: Option<MarketPhase>,
    },

    /// Evaluate every watchlist symbol and rank by trend score.
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        common: CommonArgs,

        /// Bar timeframe.
        #[arg(long, default_value = "minute", value_parser = parse_timeframe)]
        timeframe: Timeframe,

        /// Number of most recent bars to load per symbol.
        #[arg(long, default_value_t = 390)]
        limit: usize,

        /// Override the market phase instead of reading the exchange clock.
        #[arg(long, value_parser = parse_phase)]
        phase: Option<MarketPhase>,

        /// Symbols to scan. Defaults to the configured watchlist.
        symbols: Vec<String>,
    },

    /// Find gap movers against the previous daily close.
    Gaps {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        common: CommonArgs,

        /// Symbols to scan. Defaults to the configured watchlist.
        symbols: Vec<String>,
    },

    /// Find last-bar momentum candidates.
    Momentum {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        common: CommonArgs,

        /// Symbols to scan. Defaults to the configured watchlist.
        symbols: Vec<String>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SourceArgs {
    /// Read bars from CSV files in this directory.
    #[arg(long, conflicts_with = "alpaca")]
    csv_dir: Option<PathBuf>,

    /// Fetch bars from the Alpaca market data API
    /// (APCA_API_KEY_ID / APCA_API_SECRET_KEY).
    #[arg(long)]
    alpaca: bool,
}

fn parse_timeframe(s: &str) -> Result<Timeframe, String> {
    s.parse()
}

fn parse_phase(s: &str) -> Result<MarketPhase, String> {
    s.parse()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            csv_dir,
            symbol,
            common,
            timeframe,
            limit,
            phase,
        } => run_evaluate(&csv_dir, &symbol, &common, timeframe, limit, phase),
        Commands::Scan {
            source,
            common,
            timeframe,
            limit,
            phase,
            symbols,
        } => run_scan(&source, &common, timeframe, limit, phase, symbols),
        Commands::Gaps {
            source,
            common,
            symbols,
        } => run_gaps(&source, &common, symbols),
        Commands::Momentum {
            source,
            common,
            symbols,
        } => run_momentum(&source, &common, symbols),
    }
}

fn load_config(path: Option<&Path>) -> Result<AmpelConfig> {
    match path {
        Some(path) => AmpelConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AmpelConfig::default()),
    }
}

fn build_evaluator(config: AmpelConfig, phase: Option<MarketPhase>) -> Result<Evaluator> {
    let clock: Box<dyn MarketClock> = match phase {
        Some(phase) => Box::new(StaticClock::new(phase)),
        None => Box::new(ExchangeClock::from_config(&config.clock)?),
    };
    Ok(Evaluator::new(config, clock))
}

fn open_source(args: &SourceArgs) -> Result<Box<dyn BarSource>> {
    match (&args.csv_dir, args.alpaca) {
        (Some(dir), false) => Ok(Box::new(CachedBarSource::new(CsvBarSource::new(dir)))),
        (None, true) => {
            let source = AlpacaBarSource::from_env().context("configuring Alpaca source")?;
            Ok(Box::new(CachedBarSource::new(source)))
        }
        (Some(_), true) => bail!("--csv-dir and --alpaca are mutually exclusive"),
        (None, false) => bail!("one of --csv-dir or --alpaca is required"),
    }
}

fn resolve_symbols(config: &AmpelConfig, symbols: Vec<String>) -> Vec<String> {
    if symbols.is_empty() {
        config.symbols()
    } else {
        symbols.iter().map(|s| s.trim().to_ascii_uppercase()).collect()
    }
}

fn run_evaluate(
    csv_dir: &Path,
    symbol: &str,
    common: &CommonArgs,
    timeframe: Timeframe,
    limit: usize,
    phase: Option<MarketPhase>,
) -> Result<()> {
    let config = load_config(common.config.as_deref())?;
    let evaluator = build_evaluator(config, phase)?;
    if limit < evaluator.required_bars() {
        bail!(
            "--limit {limit} is below the {} bars the indicators need",
            evaluator.required_bars()
        );
    }

    let symbol = symbol.trim().to_ascii_uppercase();
    let source = CsvBarSource::new(csv_dir);
    let bars = source
        .fetch(&BarRequest::latest(symbol.as_str(), timeframe, limit))
        .with_context(|| format!("loading bars for {symbol}"))?;
    let evaluation = evaluator
        .evaluate(&symbol, &bars)
        .with_context(|| format!("evaluating {symbol}"))?;

    // VWAP resets per session, so the setup score only applies to minute bars
    let setup = match timeframe {
        Timeframe::Minute => {
            let exchange = ExchangeClock::from_config(&evaluator.config().clock)?;
            intraday_setup_score(exchange.session_bars(&bars), &evaluator.config().intraday).ok()
        }
        Timeframe::Day => None,
    };

    if common.json {
        let out = serde_json::json!({ "evaluation": evaluation, "intraday": setup });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_evaluation(&evaluation);
        if let Some(setup) = &setup {
            print_intraday(setup);
        }
    }
    Ok(())
}

fn run_scan(
    source_args: &SourceArgs,
    common: &CommonArgs,
    timeframe: Timeframe,
    limit: usize,
    phase: Option<MarketPhase>,
    symbols: Vec<String>,
) -> Result<()> {
    let config = load_config(common.config.as_deref())?;
    let symbols = resolve_symbols(&config, symbols);
    let source = open_source(source_args)?;
    let evaluator = build_evaluator(config, phase)?;

    info!(
        source = source.name(),
        symbols = symbols.len(),
        %timeframe,
        limit,
        "scanning watchlist"
    );
    let template = BarRequest::latest("", timeframe, limit);
    let report = scan_watchlist(source.as_ref(), &template, &symbols, &evaluator);

    if common.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_scan(&report);
    }

    if !symbols.is_empty() && report.evaluated_count() == 0 {
        bail!("no symbol could be evaluated");
    }
    Ok(())
}

fn run_gaps(source_args: &SourceArgs, common: &CommonArgs, symbols: Vec<String>) -> Result<()> {
    let config = load_config(common.config.as_deref())?;
    let symbols = resolve_symbols(&config, symbols);
    let source = open_source(source_args)?;

    info!(source = source.name(), symbols = symbols.len(), "scanning gap movers");
    let report = scan_gap_movers(source.as_ref(), &symbols, &config.gap_scan);

    if common.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_gaps(&report);
    }
    Ok(())
}

fn run_momentum(
    source_args: &SourceArgs,
    common: &CommonArgs,
    symbols: Vec<String>,
) -> Result<()> {
    let config = load_config(common.config.as_deref())?;
    let symbols = resolve_symbols(&config, symbols);
    let source = open_source(source_args)?;

    info!(source = source.name(), symbols = symbols.len(), "scanning momentum");
    let candidates = scan_momentum(source.as_ref(), &symbols, &config.momentum);

    if common.json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else {
        print_momentum(&candidates);
    }
    Ok(())
}

fn gate_line(decision: &GateDecision) -> String {
    let score = match decision.score() {
        Some(score) => format!("{score:>3}"),
        None => "  -".to_string(),
    };
    format!(
        "{} {score}  {}",
        decision.ampel.color(),
        decision.reason_texts().join(", ")
    )
}

fn print_evaluation(e: &Evaluation) {
    let s = &e.snapshot;
    println!();
    println!("=== {} ({}) ===", s.symbol(), s.market_phase());
    println!("Price:          {:.2}", s.price());
    println!(
        "EMA f/m/s:      {:.2} / {:.2} / {:.2}",
        s.ema_fast(),
        s.ema_mid(),
        s.ema_slow()
    );
    println!("RSI:            {:.1}", s.rsi());
    println!("ATR:            {:.2}", s.atr());
    println!("Volume ratio:   {:.2}x", s.volume_ratio());
    println!();
    println!("--- Decision ---");
    println!("Trend score:    {}", e.score);
    println!("Ampel:          {} ({})", e.ampel, e.ampel.label());
    println!("Option bias:    {}", e.bias);
    println!("Day trade:      {}", gate_line(&e.day_trade));
    println!("Swing:          {}", gate_line(&e.swing));
    println!();
    match &e.plan {
        Some(p) => {
            println!("--- Trade Plan ---");
            println!("Entry:          {:.2}", p.entry);
            println!("Stop:           {:.2}", p.stop);
            println!("Target:         {:.2}", p.target);
            println!("Reward:risk     {:.2}", p.reward_risk);
        }
        None => {
            let legacy = legacy_plan(s);
            println!("No trade plan (score or reward:risk too low)");
            println!(
                "Reference:      stop {:.2} / target {:.2} ({})",
                legacy.stop, legacy.target, legacy.label
            );
        }
    }
}

fn print_intraday(setup: &IntradaySetup) {
    let mark = |hit: bool| if hit { "yes" } else { "no" };
    println!();
    println!("--- Intraday Setup ---");
    println!("Score:          {} ({:?})", setup.score, setup.quality);
    println!(
        "Above VWAP:     {} (close {:.2}, vwap {:.2})",
        mark(setup.above_vwap),
        setup.close,
        setup.vwap
    );
    println!("EMA rising:     {}", mark(setup.ema_rising));
    println!(
        "Strong move:    {} ({:+.2}%)",
        mark(setup.strong_move),
        setup.return_pct
    );
    println!("Volume > avg:   {}", mark(setup.volume_above_average));
}

fn print_scan(report: &ScanReport) {
    println!();
    println!(
        "{:<8} {:>9} {:>5} {:<7} {:<5} {:<10} {:<10} {:>8}",
        "Symbol", "Price", "Score", "Ampel", "Bias", "Day", "Swing", "Plan RR"
    );
    for e in report.ranked() {
        let rr = e
            .plan
            .as_ref()
            .map(|p| format!("{:.2}", p.reward_risk))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>9.2} {:>5} {:<7} {:<5} {:<10} {:<10} {:>8}",
            e.symbol(),
            e.snapshot.price(),
            e.score,
            e.ampel.color(),
            e.bias,
            e.day_trade.ampel.color(),
            e.swing.ampel.color(),
            rr
        );
    }

    let skipped: Vec<_> = report.skipped().collect();
    if !skipped.is_empty() {
        println!();
        println!("--- Skipped ---");
        for (symbol, reason) in skipped {
            println!("{symbol:<8} {reason}");
        }
    }
    println!();
    println!(
        "{} evaluated, {} skipped",
        report.evaluated_count(),
        report.skipped_count()
    );
}

fn print_gaps(report: &GapScanReport) {
    println!();
    if report.movers.is_empty() {
        println!("No gap movers.");
    } else {
        println!(
            "{:<8} {:>9} {:>10} {:>8} {:<9} {:>12}",
            "Symbol", "Price", "Prev close", "Gap %", "Direction", "Volume"
        );
        for m in &report.movers {
            println!(
                "{:<8} {:>9.2} {:>10.2} {:>8.2} {:<9} {:>12}",
                m.symbol,
                m.price,
                m.previous_close,
                m.gap_pct,
                m.direction.to_string(),
                m.volume
            );
        }
    }
    if report.failed > 0 || report.incomplete > 0 {
        println!();
        println!(
            "WARNING: {} symbol(s) failed, {} with incomplete data",
            report.failed, report.incomplete
        );
    }
}

fn print_momentum(candidates: &[MomentumCandidate]) {
    println!();
    if candidates.is_empty() {
        println!("No momentum candidates.");
        return;
    }
    println!(
        "{:<8} {:>9} {:>9} {:>10} {:>10}  {}",
        "Symbol", "Close", "Return %", "Volume", "Avg vol", "Signal"
    );
    for c in candidates {
        println!(
            "{:<8} {:>9.2} {:>9.2} {:>10} {:>10.0}  {}",
            c.symbol,
            c.close,
            c.return_pct,
            c.volume,
            c.average_volume,
            c.signal.label()
        );
    }
}
