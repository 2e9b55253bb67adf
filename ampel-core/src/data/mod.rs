//! Bar sources: trait, CSV files, Alpaca HTTP, TTL cache.

pub mod alpaca;
pub mod cache;
pub mod circuit_breaker;
pub mod csv_source;
pub mod provider;

pub use alpaca::{AlpacaBarSource, AlpacaCredentials};
pub use cache::{CachedBarSource, DEFAULT_TTL};
pub use circuit_breaker::CircuitBreaker;
pub use csv_source::CsvBarSource;
pub use provider::{BarRequest, BarSource, BarWindow, DataError, Timeframe};
