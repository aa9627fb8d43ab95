use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use common::models::ForecastPayload;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

struct CacheEntry<V> {
    data: V,
    fetched_at: DateTime<Utc>,
}

/// In-memory store with a fixed time-to-live.
///
/// An entry counts as fresh while `now - fetched_at < ttl`. Stale entries are
/// dropped when their key is next looked up; nothing sweeps in the background.
/// The lock is never held across an await, so reads and writes are plain
/// synchronous calls.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

pub type ForecastCache = TtlCache<ForecastPayload>;

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Wall-clock cache. TTLs too large for `Duration` saturate.
    pub fn with_ttl(ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let fresh = match entries.get(key) {
            Some(entry) => now - entry.fetched_at < self.ttl,
            None => return None,
        };

        if fresh {
            entries.get(key).map(|entry| entry.data.clone())
        } else {
            entries.remove(key);
            debug!(key, "Evicted expired cache entry");
            None
        }
    }

    /// Store `data` stamped with the current time, replacing whatever was there.
    pub fn set(&self, key: impl Into<String>, data: V) {
        let fetched_at = self.clock.now();
        self.entries
            .lock()
            .insert(key.into(), CacheEntry { data, fetched_at });
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Stored entries, including expired ones no lookup has evicted yet.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
