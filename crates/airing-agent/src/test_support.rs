//! Shared fakes for engine, command and route tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use airing_core::{
    CatalogTransport, Clock, GraphQlRequest, ManualClock, MediaId, MediaStatus, MediaTitle,
    NewTrackedItem, NextAiring, NotificationContent, NotificationDisplay, TransportResponse,
    WatchResult,
};
use anilist_client::{CatalogClient, ClientConfig};
use async_trait::async_trait;
use notification_service::NotificationScheduler;
use serde_json::{json, Value};
use watchlist_store::{MemoryKvStore, SettingsStore, WatchlistStore};

use crate::engine::WatchEngine;

pub const START_MS: i64 = 1_700_000_000_000;

/// Catalog answering from a fixed set of ids. Every known id reports episode 8.
pub struct FakeCatalog {
    records: HashMap<MediaId, Value>,
    requests: Mutex<Vec<GraphQlRequest>>,
    forced_status: AtomicU16,
}

impl FakeCatalog {
    pub fn new(ids: impl IntoIterator<Item = MediaId>) -> Self {
        let records = ids
            .into_iter()
            .map(|id| {
                (
                    id,
                    json!({
                        "id": id,
                        "title": { "romaji": format!("Show {id}") },
                        "status": "RELEASING",
                        "episodes": 24,
                        "nextAiringEpisode": { "episode": 8, "airingAt": 1_800_000_000 },
                    }),
                )
            })
            .collect();
        Self {
            records,
            requests: Mutex::new(Vec::new()),
            forced_status: AtomicU16::new(0),
        }
    }

    pub fn fail_with(&self, status: u16) {
        self.forced_status.store(status, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogTransport for FakeCatalog {
    async fn execute(&self, request: &GraphQlRequest) -> WatchResult<TransportResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let forced = self.forced_status.load(Ordering::SeqCst);
        if forced != 0 {
            return Ok(TransportResponse { status: forced, body: Value::Null });
        }

        let vars = &request.variables;
        let body = if let Some(ids) = vars.get("ids").and_then(|v| v.as_array()) {
            let media: Vec<Value> = ids
                .iter()
                .filter_map(|id| id.as_i64())
                .filter_map(|id| self.records.get(&id).cloned())
                .collect();
            json!({ "data": { "Page": { "media": media } } })
        } else if let Some(id) = vars.get("id").and_then(|v| v.as_i64()) {
            match self.records.get(&id) {
                Some(record) => json!({ "data": { "Media": record } }),
                None => {
                    return Ok(TransportResponse {
                        status: 404,
                        body: json!({ "errors": [{ "message": "Not Found.", "status": 404 }] }),
                    })
                }
            }
        } else {
            let media: Vec<Value> = self.records.values().cloned().collect();
            json!({ "data": { "Page": { "media": media } } })
        };

        Ok(TransportResponse { status: 200, body })
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    shown: Mutex<Vec<String>>,
    cleared: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDisplay for RecordingDisplay {
    async fn create(&self, id: &str, _content: &NotificationContent) -> WatchResult<String> {
        self.shown.lock().unwrap().push(id.to_string());
        Ok(id.to_string())
    }

    async fn clear(&self, id: &str) -> WatchResult<()> {
        self.cleared.lock().unwrap().push(id.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub struct Harness {
    pub engine: Arc<WatchEngine>,
    pub transport: Arc<FakeCatalog>,
    pub display: Arc<RecordingDisplay>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub async fn new(known_ids: impl IntoIterator<Item = MediaId>) -> Self {
        let clock = Arc::new(ManualClock::new(START_MS));
        let transport = Arc::new(FakeCatalog::new(known_ids));
        let display = Arc::new(RecordingDisplay::default());
        let kv = Arc::new(MemoryKvStore::new());

        let client = CatalogClient::new(transport.clone(), &ClientConfig::default(), clock.clone());
        let settings = SettingsStore::new(kv.clone());
        settings.seed_defaults().await.unwrap();
        let watchlist = WatchlistStore::new(kv, clock.clone());
        let scheduler = NotificationScheduler::new(display.clone(), clock.clone());

        let engine = Arc::new(WatchEngine::new(
            Arc::new(client),
            Arc::new(watchlist),
            Arc::new(settings),
            Arc::new(scheduler),
        ));

        Self {
            engine,
            transport,
            display,
            clock,
        }
    }

    pub fn clock_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn clock_secs(&self) -> i64 {
        self.clock.now_secs()
    }
}

pub fn new_item(id: MediaId, episode: u32, airing_at: i64) -> NewTrackedItem {
    NewTrackedItem {
        id,
        title: MediaTitle::romaji(format!("Show {id}")),
        cover_image: None,
        status: MediaStatus::Releasing,
        episodes: Some(24),
        next_airing_episode: Some(NextAiring { episode, airing_at }),
        notifications_enabled: None,
    }
}
