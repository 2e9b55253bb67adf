//! CSV bar source.
//!
//! Layout: `{dir}/{timeframe}/{SYMBOL}.csv`, falling back to
//! `{dir}/{SYMBOL}.csv`. Header: `timestamp,open,high,low,close,volume`
//! with RFC 3339 timestamps. Rows that fail the OHLC sanity check are
//! dropped; the rest are sorted, de-duplicated and trimmed to the window.

use super::provider::{BarRequest, BarSource, DataError};
use crate::domain::{canonicalize, Bar};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct CsvBarSource {
    dir: PathBuf,
}

impl CsvBarSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a request, if any.
    pub fn path_for(&self, request: &BarRequest) -> Option<PathBuf> {
        let file = format!("{}.csv", request.symbol.to_uppercase());
        let by_timeframe = self.dir.join(request.timeframe.as_str()).join(&file);
        if by_timeframe.is_file() {
            return Some(by_timeframe);
        }
        let flat = self.dir.join(&file);
        flat.is_file().then_some(flat)
    }

    fn read_file(&self, symbol: &str, path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let mut bars = Vec::new();
        let mut dropped = 0usize;
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| {
                DataError::Csv(format!("{}: row {}: {e}", path.display(), line + 2))
            })?;
            let bar = Bar {
                symbol: symbol.to_string(),
                timestamp: row.timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: if row.volume.is_finite() && row.volume > 0.0 {
                    row.volume.round() as u64
                } else {
                    0
                },
            };
            if bar.is_sane() {
                bars.push(bar);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(symbol, dropped, path = %path.display(), "dropped malformed bars");
        }
        Ok(bars)
    }
}

impl BarSource for CsvBarSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, request: &BarRequest) -> Result<Vec<Bar>, DataError> {
        let symbol = request.symbol.to_uppercase();
        let Some(path) = self.path_for(request) else {
            debug!(symbol = %symbol, dir = %self.dir.display(), "no CSV file");
            return Err(DataError::NoData { symbol });
        };

        let bars = request
            .window
            .apply(canonicalize(self.read_file(&symbol, &path)?));
        debug!(symbol = %symbol, bars = bars.len(), path = %path.display(), "loaded CSV bars");

        if bars.is_empty() {
            return Err(DataError::NoData { symbol });
        }
        Ok(bars)
    }
}
