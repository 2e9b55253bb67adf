//! In-memory TTL cache in front of a bar source.
//!
//! Entries are keyed by the full request (symbol, timeframe, window) and
//! expire after the TTL. Only successful fetches are cached.

use super::provider::{BarRequest, BarSource, DataError};
use crate::domain::Bar;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    fetched_at: Instant,
    bars: Vec<Bar>,
}

pub struct CachedBarSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<BarRequest, CacheEntry>>,
}

impl<S: BarSource> CachedBarSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<BarRequest, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let ttl = self.ttl;
        self.entries()
            .values()
            .filter(|e| e.fetched_at.elapsed() < ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl<S: BarSource> BarSource for CachedBarSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, request: &BarRequest) -> Result<Vec<Bar>, DataError> {
        {
            let mut entries = self.entries();
            match entries.get(request) {
                Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                    debug!(symbol = %request.symbol, timeframe = %request.timeframe, "bar cache hit");
                    return Ok(entry.bars.clone());
                }
                Some(_) => {
                    entries.remove(request);
                }
                None => {}
            }
        }

        // The lock is not held across the upstream call.
        let bars = self.inner.fetch(request)?;
        let ttl = self.ttl;
        let mut entries = self.entries();
        entries.retain(|_, e| e.fetched_at.elapsed() < ttl);
        entries.insert(
            request.clone(),
            CacheEntry {
                fetched_at: Instant::now(),
                bars: bars.clone(),
            },
        );
        Ok(bars)
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
