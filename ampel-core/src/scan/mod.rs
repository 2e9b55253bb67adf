//! Scanners: watchlist evaluation, momentum candidates, gap movers.

pub mod evaluator;
pub mod gaps;
pub mod momentum;
pub mod watchlist;

pub use evaluator::{Evaluation, Evaluator};
pub use gaps::{gap_mover, rank_movers, scan_gap_movers, GapDirection, GapMover, GapScanConfig, GapScanReport};
pub use momentum::{
    momentum_candidates, momentum_check, momentum_signal, scan_momentum, MomentumCandidate,
    MomentumConfig, MomentumSignal,
};
pub use watchlist::{scan_watchlist, ScanOutcome, ScanReport, SkipReason};
