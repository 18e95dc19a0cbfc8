//! In-memory cache of successful fetches for recent past dates.
//!
//! Entries live for [`CACHE_TTL`] and are checked lazily on read; there is no
//! background eviction. Only dates inside the [`CACHE_HORIZON_DAYS`] window
//! before today are cached: today's data is still accumulating and older dates
//! are rarely asked for again.

use crate::clock::{Clock, SystemClock};
use crate::types::record::{FetchOutcome, PrecipitationRecord};
use crate::types::station_window::StationWindow;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

pub const CACHE_TTL: TimeDelta = TimeDelta::hours(6);
pub const CACHE_HORIZON_DAYS: i64 = 31;

#[derive(Debug, Clone)]
struct CacheEntry {
    records: Vec<PrecipitationRecord>,
    stored_at: DateTime<Utc>,
}

/// Thread-safe cache keyed by [`StationWindow`].
///
/// Backed by a sharded map, so workers touching different keys do not contend.
/// Two workers racing on the same key may both fetch; the later `put` wins.
pub struct ResultCache {
    entries: DashMap<StationWindow, CacheEntry>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl ResultCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            ttl: CACHE_TTL,
        }
    }

    /// True iff `today - 31 days <= date < today`.
    pub fn is_cache_eligible(date: NaiveDate, today: NaiveDate) -> bool {
        today - TimeDelta::days(CACHE_HORIZON_DAYS) <= date && date < today
    }

    /// Returns the stored outcome for `key`, or `None` on a miss or when the
    /// entry is older than the TTL. Expired entries are dropped here.
    pub fn get(&self, key: &StationWindow) -> Option<FetchOutcome> {
        let now = self.clock.now();
        let hit = self.entries.get(key).and_then(|entry| {
            (!self.is_expired(&entry, now)).then(|| FetchOutcome::Success(entry.records.clone()))
        });

        if hit.is_none() {
            if self
                .entries
                .remove_if(key, |_, entry| self.is_expired(entry, now))
                .is_some()
            {
                debug!("Cache entry for {} expired", key);
            }
        } else {
            debug!("Cache hit for {}", key);
        }
        hit
    }

    /// Stores a successful outcome. Failures are refused so that the next query
    /// retries instead of replaying the error; returns whether anything was stored.
    pub fn put(&self, key: StationWindow, outcome: &FetchOutcome) -> bool {
        match outcome {
            FetchOutcome::Success(records) => {
                self.entries.insert(
                    key,
                    CacheEntry {
                        records: records.clone(),
                        stored_at: self.clock.now(),
                    },
                );
                true
            }
            FetchOutcome::Failure(_) => false,
        }
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        before - self.entries.len()
    }

    /// Number of stored entries, expired ones included until they are read or purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.stored_at >= self.ttl
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
