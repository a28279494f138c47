use async_trait::async_trait;

use crate::{GraphQlRequest, NotificationContent, TransportResponse, WatchResult};

/// Async key-value persistence. Each `set` is atomic.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> WatchResult<Option<serde_json::Value>>;
    async fn set(&self, key: &str, value: serde_json::Value) -> WatchResult<()>;
}

/// Opaque request/response function to the catalog. Timeouts are the transport's concern.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn execute(&self, request: &GraphQlRequest) -> WatchResult<TransportResponse>;
}

/// Platform notification capability
#[async_trait]
pub trait NotificationDisplay: Send + Sync {
    /// Show a notification and return the platform handle.
    async fn create(&self, id: &str, content: &NotificationContent) -> WatchResult<String>;
    async fn clear(&self, id: &str) -> WatchResult<()>;
    fn name(&self) -> &str;
}
