use std::collections::HashMap;
use std::sync::Arc;

use airing_core::{
    Clock, KeyValueStore, MediaId, NewTrackedItem, PartialRecord, TrackedItem, WatchError,
    WatchResult,
};
use tokio::sync::Mutex;

use crate::{LAST_UPDATE_KEY, WATCHLIST_KEY};

/// Ordered, id-unique collection of tracked items persisted under one key.
///
/// Every mutation is a full read-modify-write of the list, serialized by
/// `write_lock` so a refresh merge and a user add/remove never interleave.
pub struct WatchlistStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl WatchlistStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            kv,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> WatchResult<Vec<TrackedItem>> {
        match self.kv.get(WATCHLIST_KEY).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| WatchError::Storage(format!("corrupt watchlist: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, items: &[TrackedItem]) -> WatchResult<()> {
        let value =
            serde_json::to_value(items).map_err(|e| WatchError::Storage(e.to_string()))?;
        self.kv.set(WATCHLIST_KEY, value).await
    }

    /// Snapshot in insertion order.
    pub async fn list(&self) -> WatchResult<Vec<TrackedItem>> {
        self.load().await
    }

    pub async fn ids(&self) -> WatchResult<Vec<MediaId>> {
        Ok(self.load().await?.iter().map(|item| item.id).collect())
    }

    /// Append a new item. Returns false (and writes nothing) if the id is already tracked.
    pub async fn add(&self, item: NewTrackedItem) -> WatchResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        if items.iter().any(|existing| existing.id == item.id) {
            tracing::debug!(media_id = item.id, "Already on watchlist");
            return Ok(false);
        }

        let media_id = item.id;
        items.push(TrackedItem::from_new(item, self.clock.now_millis()));
        self.save(&items).await?;
        tracing::info!(media_id, "Added to watchlist");
        Ok(true)
    }

    /// Returns true if an item was removed.
    pub async fn remove(&self, id: MediaId) -> WatchResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }

        self.save(&items).await?;
        tracing::info!(media_id = id, "Removed from watchlist");
        Ok(true)
    }

    /// Overlay refreshed fields onto tracked items present in `records`.
    ///
    /// Never adds, removes or reorders entries. Returns the number of items updated.
    pub async fn merge_refresh(&self, records: &HashMap<MediaId, PartialRecord>) -> WatchResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        let now = self.clock.now_millis();

        let mut updated = 0;
        for item in items.iter_mut() {
            if let Some(record) = records.get(&item.id) {
                item.apply_refresh(record, now);
                updated += 1;
            }
        }

        if updated > 0 {
            self.save(&items).await?;
        }
        Ok(updated)
    }

    /// Epoch millis of the last completed refresh cycle, if any.
    pub async fn last_update(&self) -> WatchResult<Option<i64>> {
        Ok(self
            .kv
            .get(LAST_UPDATE_KEY)
            .await?
            .and_then(|value| value.as_i64()))
    }

    pub async fn record_update(&self) -> WatchResult<i64> {
        let now = self.clock.now_millis();
        self.kv.set(LAST_UPDATE_KEY, serde_json::Value::from(now)).await?;
        Ok(now)
    }
}
