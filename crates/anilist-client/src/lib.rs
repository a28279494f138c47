//! Rate-limited, cached client for the AniList GraphQL catalog.

mod cache;
mod queries;
mod rate_limiter;
mod retry;
mod transport;
mod wire;

pub use cache::{details_key, ResponseCache, DETAILS_TTL};
pub use rate_limiter::RateLimiter;
pub use retry::{retry_with_backoff, BackoffPolicy};
pub use transport::{HttpTransport, ANILIST_API_URL};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use airing_core::{
    CatalogTransport, Clock, GraphQlRequest, MediaDetails, MediaId, MediaSummary, PartialRecord,
    TransportResponse, WatchError, WatchResult,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::queries::{BULK_STATUS_QUERY, DETAILS_QUERY, SEARCH_PAGE_SIZE, SEARCH_QUERY};
use crate::wire::{GraphQlEnvelope, MediaData, PageData};

/// Upstream accepts at most this many ids per `id_in` lookup.
pub const BULK_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub max_requests: usize,
    pub window: Duration,
    /// Fixed wait after a 429 before re-issuing the request
    pub throttle_wait: Duration,
    pub max_throttle_retries: u32,
    pub details_ttl: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: ANILIST_API_URL.to_string(),
            max_requests: 90,
            window: Duration::from_millis(60_000),
            throttle_wait: Duration::from_secs(60),
            max_throttle_retries: 5,
            details_ttl: DETAILS_TTL,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct CatalogClient {
    transport: Arc<dyn CatalogTransport>,
    rate_limiter: RateLimiter,
    details_cache: ResponseCache<MediaDetails>,
    throttle_wait: Duration,
    max_throttle_retries: u32,
    details_ttl: Duration,
}

impl CatalogClient {
    pub fn new(
        transport: Arc<dyn CatalogTransport>,
        config: &ClientConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            rate_limiter: RateLimiter::new(config.max_requests, config.window),
            details_cache: ResponseCache::new(clock),
            throttle_wait: config.throttle_wait,
            max_throttle_retries: config.max_throttle_retries,
            details_ttl: config.details_ttl,
        }
    }

    /// Client over the real HTTP transport.
    pub fn connect(config: &ClientConfig, clock: Arc<dyn Clock>) -> WatchResult<Self> {
        let transport = HttpTransport::new(config.api_url.clone(), config.timeout)?;
        Ok(Self::new(Arc::new(transport), config, clock))
    }

    pub fn clear_cache(&self) {
        self.details_cache.clear();
    }

    /// Send a request with rate limiting and bounded 429 retry.
    async fn send_request(&self, request: &GraphQlRequest) -> WatchResult<TransportResponse> {
        let attempts = self.max_throttle_retries + 1;

        for attempt in 1..=attempts {
            self.rate_limiter.acquire().await;
            let response = self.transport.execute(request).await?;

            if response.status != 429 {
                return Ok(response);
            }

            if attempt == attempts {
                break;
            }
            tracing::warn!(
                "Catalog 429 rate limited, waiting {}s before retry {}/{}",
                self.throttle_wait.as_secs(),
                attempt,
                self.max_throttle_retries
            );
            tokio::time::sleep(self.throttle_wait).await;
        }

        Err(WatchError::RateLimited {
            retry_after: self.throttle_wait,
        })
    }

    /// Search by title. Never cached.
    pub async fn search(&self, query: &str) -> WatchResult<Vec<MediaSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let request = GraphQlRequest {
            query: SEARCH_QUERY.to_string(),
            variables: json!({ "search": query, "perPage": SEARCH_PAGE_SIZE }),
        };
        let response = self.send_request(&request).await?;
        ensure_success(&response)?;

        let page: PageData<MediaSummary> = decode_data(response.body)?;
        Ok(page.page.map(|p| p.media).unwrap_or_default())
    }

    /// Full record for one id, served from cache while fresh.
    pub async fn get_details(&self, id: MediaId) -> WatchResult<MediaDetails> {
        let cache_key = details_key(id);
        if let Some(cached) = self.details_cache.get(&cache_key) {
            tracing::debug!(media_id = id, "Details served from cache");
            return Ok(cached);
        }

        let request = GraphQlRequest {
            query: DETAILS_QUERY.to_string(),
            variables: json!({ "id": id }),
        };
        let response = self.send_request(&request).await?;
        if response.status == 404 {
            return Err(WatchError::NotFound(id));
        }
        ensure_success(&response)?;

        let data: MediaData = decode_data(response.body)?;
        let details: MediaDetails = data.media.ok_or(WatchError::NotFound(id))?.into();

        self.details_cache
            .put(cache_key, details.clone(), self.details_ttl);
        Ok(details)
    }

    /// Status-only refresh for many ids, one sequential request per batch.
    ///
    /// Ids without an upstream record are omitted from the result.
    pub async fn bulk_refresh(&self, ids: &[MediaId]) -> WatchResult<Vec<PartialRecord>> {
        let mut seen = HashSet::new();
        let unique: Vec<MediaId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let batch_count = unique.len().div_ceil(BULK_BATCH_SIZE);
        let mut results = Vec::with_capacity(unique.len());

        for (index, batch) in unique.chunks(BULK_BATCH_SIZE).enumerate() {
            let request = GraphQlRequest {
                query: BULK_STATUS_QUERY.to_string(),
                variables: json!({ "ids": batch, "perPage": batch.len() }),
            };
            let response = self.send_request(&request).await?;
            ensure_success(&response)?;

            let page: PageData<serde_json::Value> = decode_data(response.body)?;
            let records: Vec<PartialRecord> = page
                .page
                .map(|p| p.media)
                .unwrap_or_default()
                .into_iter()
                .filter_map(decode_partial)
                .collect();
            tracing::debug!(
                batch = index + 1,
                batches = batch_count,
                requested = batch.len(),
                returned = records.len(),
                "Bulk refresh batch complete"
            );
            results.extend(records);
        }

        Ok(results)
    }
}

fn ensure_success(response: &TransportResponse) -> WatchResult<()> {
    if response.is_success() {
        return Ok(());
    }
    let detail = response
        .body
        .get("errors")
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("no error detail");
    Err(WatchError::Network(format!(
        "HTTP {}: {}",
        response.status, detail
    )))
}

/// One malformed entry is dropped on its own rather than failing the batch.
fn decode_partial(entry: serde_json::Value) -> Option<PartialRecord> {
    let id = entry.get("id").and_then(|v| v.as_i64());
    match serde_json::from_value::<PartialRecord>(entry) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(media_id = ?id, "Skipping malformed bulk record: {}", e);
            None
        }
    }
}

fn decode_data<T: DeserializeOwned>(body: serde_json::Value) -> WatchResult<T> {
    let envelope: GraphQlEnvelope<T> = serde_json::from_value(body)?;
    match envelope.data {
        Some(data) => Ok(data),
        None => {
            let message = envelope
                .errors
                .first()
                .map(|e| format!("{} (status {:?})", e.message, e.status))
                .unwrap_or_else(|| "response carried no data".to_string());
            Err(WatchError::InvalidResponse(message))
        }
    }
}
