//! Time-bounded in-memory cache for the unified catalog

use crate::models::CardRecord;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The cached catalog together with the time it was loaded
pub struct CatalogCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    records: Option<Arc<Vec<CardRecord>>>,
    loaded_at: Option<DateTime<Utc>>,
}

impl CatalogCache {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            records: None,
            loaded_at: None,
        }
    }

    /// Store a freshly loaded catalog and restart the freshness window
    pub fn store(&mut self, records: Arc<Vec<CardRecord>>) {
        self.records = Some(records);
        self.loaded_at = Some(self.clock.now());
    }

    /// Swap in a new list without restarting the freshness window (price refresh).
    ///
    /// Returns false and keeps the cache empty when nothing is cached.
    pub fn replace_records(&mut self, records: Arc<Vec<CardRecord>>) -> bool {
        if self.records.is_none() {
            return false;
        }
        self.records = Some(records);
        true
    }

    /// True when nothing is cached or the cached list is older than the TTL
    pub fn is_stale(&self) -> bool {
        match self.loaded_at {
            Some(loaded_at) => self.clock.now() - loaded_at >= self.ttl,
            None => true,
        }
    }

    /// Drop the cached catalog; the next read reloads
    pub fn invalidate(&mut self) {
        self.records = None;
        self.loaded_at = None;
    }

    /// The cached list if it is still within the freshness window
    pub fn fresh(&self) -> Option<Arc<Vec<CardRecord>>> {
        if self.is_stale() {
            None
        } else {
            self.records.clone()
        }
    }

    /// The cached list regardless of age
    pub fn current(&self) -> Option<Arc<Vec<CardRecord>>> {
        self.records.clone()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}
