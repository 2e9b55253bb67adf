//! Domain types for Ampel

pub mod bar;
pub mod phase;
pub mod snapshot;

pub use bar::{canonicalize, validate_series, Bar, BarError};
pub use phase::MarketPhase;
pub use snapshot::{MarketSnapshot, SnapshotError, SnapshotFields};
