use std::sync::Arc;
use std::time::Duration;

use airing_core::Clock;
use dashmap::DashMap;

/// Detail records live for a day.
pub const DETAILS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CacheEntry<T> {
    payload: T,
    stored_at: i64,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now_millis: i64) -> bool {
        let age = now_millis.saturating_sub(self.stored_at);
        age <= i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

/// TTL-keyed response store. Expiry is enforced on every read; nothing sweeps in the background.
pub struct ResponseCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now_millis();
        if self
            .entries
            .remove_if(key, |_, entry| !entry.is_fresh(now))
            .is_some()
        {
            tracing::debug!(key, "Cache entry expired");
            return None;
        }
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.payload.clone())
    }

    pub fn put(&self, key: impl Into<String>, payload: T, ttl: Duration) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                payload,
                stored_at: self.clock.now_millis(),
                ttl,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Stored entries, including ones that have expired but not been read since.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn details_key(id: airing_core::MediaId) -> String {
    format!("anime_{}", id)
}
