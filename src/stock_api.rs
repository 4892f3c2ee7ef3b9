// Client for the Stock inventory API (classified search endpoint)

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

use crate::{config::Settings, error::StockApiError, models::UpstreamQuery};

const SEARCH_ENDPOINT: &str = "/classified/search";
const USER_AGENT: &str = concat!("stock-search/", env!("CARGO_PKG_VERSION"));

// The single outbound call the search pipeline depends on
pub trait InventoryApi {
    async fn search(&self, query: &UpstreamQuery) -> Result<Value, StockApiError>;
}

// Builds the shared HTTP client; created once in main and handed around in an Arc
pub fn build_http_client(settings: &Settings) -> Result<Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .context("Failed to build reqwest client")
}

#[derive(Clone)]
pub struct StockApiClient {
    http_client: Arc<Client>,
    settings: Arc<Settings>,
}

impl StockApiClient {
    pub fn new(http_client: Arc<Client>, settings: Arc<Settings>) -> Self {
        Self { http_client, settings }
    }

    // {base}/{country}/{key}{endpoint}
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/{}{}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.country,
            self.settings.api_key,
            endpoint
        )
    }
}

impl InventoryApi for StockApiClient {
    async fn search(&self, query: &UpstreamQuery) -> Result<Value, StockApiError> {
        let url = self.endpoint_url(SEARCH_ENDPOINT);
        // The URL embeds the API key, so only the endpoint is logged
        tracing::info!(endpoint = SEARCH_ENDPOINT, country = %self.settings.country, ?query, "Calling Stock API");

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Stock API returned an error status");
            return Err(StockApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.text().await?;
        let preview: String = body.chars().take(200).collect();
        tracing::debug!(response = %preview, "Stock API response");

        serde_json::from_str(&body).map_err(|e| StockApiError::Decode(e.to_string()))
    }
}
