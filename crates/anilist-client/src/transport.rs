use std::time::Duration;

use airing_core::{CatalogTransport, GraphQlRequest, TransportResponse, WatchError, WatchResult};
use async_trait::async_trait;
use reqwest::Client;

pub const ANILIST_API_URL: &str = "https://graphql.anilist.co";

/// reqwest-backed GraphQL transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> WatchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn execute(&self, request: &GraphQlRequest) -> WatchResult<TransportResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| WatchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| WatchError::Network(e.to_string()))?;

        // Error pages are not always JSON; keep the status and drop the body.
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);

        Ok(TransportResponse { status, body })
    }
}
