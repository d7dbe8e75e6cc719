//! Time-based caching of fact records.
//!
//! [`FactCache`] is the plain state machine (value, fetch time, ttl) and is
//! driven with explicit instants so it can be tested without a clock.
//! [`CachedProvider`] wraps a [`ContentProvider`] and holds the cache lock for
//! the duration of a refresh, so at most one fetch is in flight per expiry.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::provider::{ContentProvider, FactRecord};
use crate::Result;

#[derive(Debug, Clone)]
pub struct FactCache {
    value: Option<FactRecord>,
    fetched_at: Option<Instant>,
    ttl: Duration,
}

impl FactCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            value: None,
            fetched_at: None,
            ttl,
        }
    }

    /// Whether a stored value is younger than the ttl at `now`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        match (&self.value, self.fetched_at) {
            (Some(_), Some(at)) => now.saturating_duration_since(at) < self.ttl,
            _ => false,
        }
    }

    /// The cached value if it is still fresh at `now`.
    pub fn get(&self, now: Instant) -> Option<&FactRecord> {
        if self.is_fresh(now) {
            self.value.as_ref()
        } else {
            None
        }
    }

    pub fn store(&mut self, record: FactRecord, now: Instant) {
        self.value = Some(record);
        self.fetched_at = Some(now);
    }

    /// Return the fresh cached value or call `fetch` and cache its result.
    /// The new value is stamped when the fetch completes, not at `now`.
    /// A failed fetch leaves the cache untouched.
    pub fn refresh_or_cached<F>(&mut self, now: Instant, fetch: F) -> Result<FactRecord>
    where
        F: FnOnce() -> Result<FactRecord>,
    {
        if let Some(hit) = self.get(now) {
            log::debug!("Fact cache hit");
            return Ok(hit.clone());
        }
        log::debug!("Fact cache miss, refreshing");
        let record = fetch()?;
        self.store(record.clone(), Instant::now().max(now));
        Ok(record)
    }
}

/// A provider with a shared cache in front of it.
pub struct CachedProvider {
    provider: Box<dyn ContentProvider>,
    cache: Mutex<FactCache>,
    last_update: Mutex<Option<DateTime<Utc>>>,
}

impl CachedProvider {
    pub fn new(provider: Box<dyn ContentProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            cache: Mutex::new(FactCache::new(ttl)),
            last_update: Mutex::new(None),
        }
    }

    /// Current fact, refreshing if the cache expired. Fetch failures are
    /// logged and reported as `None`.
    pub fn get(&self) -> Option<FactRecord> {
        self.get_at(Instant::now())
    }

    pub fn get_at(&self, now: Instant) -> Option<FactRecord> {
        let mut cache = lock(&self.cache);
        let was_fresh = cache.is_fresh(now);
        match cache.refresh_or_cached(now, || self.provider.fetch()) {
            Ok(record) => {
                if !was_fresh {
                    *lock(&self.last_update) = Some(Utc::now());
                }
                Some(record)
            }
            Err(e) => {
                log::error!("Error fetching Chuck Norris fact: {}", e);
                None
            }
        }
    }

    /// Wall-clock time of the last successful refresh.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *lock(&self.last_update)
    }
}

// A poisoned lock only means another request panicked mid-refresh; the
// cache state itself is always consistent.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
