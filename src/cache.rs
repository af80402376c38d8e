//! In-process, time-boxed caching of fork listings
//!
//! Entries are keyed by `owner/repo`. An entry older than the cache TTL is
//! stale: lookups treat it as a miss so a fresh fetch is triggered, but the
//! entry itself stays in place until a later fetch overwrites it.
//!
//! A listing cut short by rate limiting is stored as a partial entry. It never
//! satisfies [`ListingCache::get_fresh`], so the full listing is retried, but
//! [`ListingCache::get_usable`] hands it out for searching what is already
//! known.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::github::RepositoryDescriptor;

/// Source of the current time for TTL decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.origin + offset
    }
}

/// One cached listing
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub fetched_at: Instant,
    pub entries: Vec<RepositoryDescriptor>,
    /// Whether every page was fetched
    pub complete: bool,
}

/// Cache of fork listings shared by every discovery call of one run
#[derive(Clone)]
pub struct ListingCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl ListingCache {
    /// Create a new empty cache with the given TTL and clock
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get a complete listing if one was stored less than one TTL ago
    pub fn get_fresh(&self, key: &str) -> Result<Option<Vec<RepositoryDescriptor>>> {
        self.fresh(key, |entry| entry.complete)
    }

    /// Get a listing stored less than one TTL ago, partial or not
    pub fn get_usable(&self, key: &str) -> Result<Option<Vec<RepositoryDescriptor>>> {
        self.fresh(key, |_| true)
    }

    /// Store a complete listing, superseding any previous entry for the key
    pub fn insert(&self, key: &str, entries: Vec<RepositoryDescriptor>) -> Result<()> {
        self.store(key, entries, true)
    }

    /// Store a partial listing. A fresh complete entry is kept instead.
    pub fn insert_partial(&self, key: &str, entries: Vec<RepositoryDescriptor>) -> Result<()> {
        if self.get_fresh(key)?.is_some() {
            return Ok(());
        }
        self.store(key, entries, false)
    }

    fn fresh(
        &self,
        key: &str,
        accept: impl Fn(&CacheEntry) -> bool,
    ) -> Result<Option<Vec<RepositoryDescriptor>>> {
        let cache = self.lock()?;
        let now = self.clock.now();
        Ok(cache
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .filter(|entry| accept(entry))
            .map(|entry| entry.entries.clone()))
    }

    fn store(&self, key: &str, entries: Vec<RepositoryDescriptor>, complete: bool) -> Result<()> {
        let fetched_at = self.clock.now();
        let mut cache = self.lock()?;
        cache.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                fetched_at,
                entries,
                complete,
            },
        );
        Ok(())
    }

    /// Get an entry regardless of its age
    pub fn entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let cache = self.lock()?;
        Ok(cache.get(key).cloned())
    }

    /// Get the number of cached entries, stale ones included
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.cache.lock().map_err(|_| Error::LockPoisoned {
            context: "fork listing cache".to_string(),
        })
    }
}

impl std::fmt::Debug for ListingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
