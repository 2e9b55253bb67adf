//! Watchlist scan: fetch → evaluate for every symbol, with an explicit
//! outcome per symbol. Missing data and upstream failures never abort the
//! scan; they become `Skipped` outcomes.

use super::evaluator::{Evaluation, Evaluator};
use crate::data::{BarRequest, BarSource, DataError};
use crate::domain::SnapshotError;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The source had no bars for the request.
    NoData,
    /// The source failed (network, auth, rate limit, parse).
    Upstream { message: String },
    /// Fewer bars than the indicators need.
    InsufficientData { needed: usize, available: usize },
    /// Indicator values produced an out-of-domain snapshot.
    InvalidSnapshot { message: String },
}

impl SkipReason {
    fn from_data_error(err: &DataError) -> Self {
        if err.is_no_data() {
            SkipReason::NoData
        } else {
            SkipReason::Upstream {
                message: err.to_string(),
            }
        }
    }

    fn from_snapshot_error(err: &SnapshotError) -> Self {
        match *err {
            SnapshotError::InsufficientData { needed, available } => {
                SkipReason::InsufficientData { needed, available }
            }
            _ => SkipReason::InvalidSnapshot {
                message: err.to_string(),
            },
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => f.write_str("no data"),
            SkipReason::Upstream { message } => write!(f, "upstream failure: {message}"),
            SkipReason::InsufficientData { needed, available } => {
                write!(f, "insufficient data: need {needed} bars, have {available}")
            }
            SkipReason::InvalidSnapshot { message } => write!(f, "invalid snapshot: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    Evaluated(Box<Evaluation>),
    Skipped { symbol: String, reason: SkipReason },
}

impl ScanOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            ScanOutcome::Evaluated(e) => e.symbol(),
            ScanOutcome::Skipped { symbol, .. } => symbol,
        }
    }
}

/// Outcomes in watchlist order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub outcomes: Vec<ScanOutcome>,
}

impl ScanReport {
    pub fn evaluated(&self) -> impl Iterator<Item = &Evaluation> {
        self.outcomes.iter().filter_map(|o| match o {
            ScanOutcome::Evaluated(e) => Some(e.as_ref()),
            ScanOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.outcomes.iter().filter_map(|o| match o {
            ScanOutcome::Skipped { symbol, reason } => Some((symbol.as_str(), reason)),
            ScanOutcome::Evaluated(_) => None,
        })
    }

    /// Evaluations sorted by trend score, best first. Ties keep watchlist order.
    pub fn ranked(&self) -> Vec<&Evaluation> {
        let mut ranked: Vec<&Evaluation> = self.evaluated().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    pub fn evaluated_count(&self) -> usize {
        self.evaluated().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }
}

/// Scan every symbol with the template's timeframe and window.
pub fn scan_watchlist<T: AsRef<str>>(
    source: &dyn BarSource,
    template: &BarRequest,
    symbols: &[T],
    evaluator: &Evaluator,
) -> ScanReport {
    let total = symbols.len();
    let mut outcomes = Vec::with_capacity(total);

    for (i, symbol) in symbols.iter().enumerate() {
        let symbol = symbol.as_ref();

        // Bail out early once the source refuses requests.
        if !source.is_available() {
            warn!(symbol, source = source.name(), "source unavailable, skipping");
            outcomes.push(ScanOutcome::Skipped {
                symbol: symbol.to_string(),
                reason: SkipReason::from_data_error(&DataError::CircuitBreakerTripped),
            });
            continue;
        }

        debug!(symbol, index = i + 1, total, "scanning");
        let outcome = scan_symbol(source, &template.for_symbol(symbol), evaluator);
        if let ScanOutcome::Skipped { reason, .. } = &outcome {
            warn!(symbol, %reason, "skipped");
        }
        outcomes.push(outcome);
    }

    let report = ScanReport { outcomes };
    info!(
        evaluated = report.evaluated_count(),
        skipped = report.skipped_count(),
        total,
        "watchlist scan complete"
    );
    report
}

fn scan_symbol(source: &dyn BarSource, request: &BarRequest, evaluator: &Evaluator) -> ScanOutcome {
    let skipped = |reason| ScanOutcome::Skipped {
        symbol: request.symbol.clone(),
        reason,
    };

    let bars = match source.fetch(request) {
        Ok(bars) => bars,
        Err(e) => return skipped(SkipReason::from_data_error(&e)),
    };
    match evaluator.evaluate(&request.symbol, &bars) {
        Ok(evaluation) => ScanOutcome::Evaluated(Box::new(evaluation)),
        Err(e) => skipped(SkipReason::from_snapshot_error(&e)),
    }
}
