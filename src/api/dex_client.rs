//! DexScreener client for fetching new and trending pair listings.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::models::PairData;

use super::types::*;

pub const DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com/latest/dex";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const NEW_PAIR_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;
const TRENDING_LIMIT: usize = 20;

/// Client for the DexScreener public API (read-only).
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
}

impl DexScreenerClient {
    /// Create a new client against the public API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEXSCREENER_API_BASE.to_string())
    }

    /// Create with custom base URL (for testing or a proxy).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a search query and return the raw listings.
    async fn search(&self, query: &str) -> Result<Vec<PairResponse>> {
        let url = format!("{}/search/?q={}", self.base_url, query);

        debug!(url = %url, "Fetching pairs");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch pairs")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Search request failed: {} - {}", status, body);
        }

        let search: SearchResponse = response
            .json()
            .await
            .context("Failed to parse search response")?;

        Ok(search.pairs.unwrap_or_default())
    }

    /// Fetch recently created pairs, keeping those listed within 24 hours.
    pub async fn get_new_pairs(&self, limit: usize) -> Result<Vec<PairData>> {
        let pairs: Vec<PairData> = self
            .search("created")
            .await?
            .into_iter()
            .take(limit)
            .map(PairData::from)
            .collect();

        let fetched = pairs.len();
        let recent = filter_recent(pairs, Utc::now());

        debug!(fetched, recent = recent.len(), "Filtered new pairs");
        Ok(recent)
    }

    /// Fetch pairs ranked by volume.
    pub async fn get_trending_pairs(&self) -> Result<Vec<PairData>> {
        let pairs = self
            .search("volume")
            .await?
            .into_iter()
            .take(TRENDING_LIMIT)
            .map(PairData::from)
            .collect();

        Ok(pairs)
    }
}

/// Keep pairs created less than 24 hours before `now`. Pairs with no
/// creation time count as created at the epoch and are dropped.
pub fn filter_recent(pairs: Vec<PairData>, now: DateTime<Utc>) -> Vec<PairData> {
    let now_ms = now.timestamp_millis();

    pairs
        .into_iter()
        .filter(|p| {
            now_ms.saturating_sub(p.pair_created_at_millis.unwrap_or(0)) < NEW_PAIR_WINDOW_MS
        })
        .collect()
}

/// Parse pairs from a JSON document: a search response or a bare array.
pub fn pairs_from_json(json: &str) -> Result<Vec<PairData>> {
    let doc: PairsDocument = serde_json::from_str(json).context("Failed to parse pairs JSON")?;
    Ok(doc.into_pairs().into_iter().map(PairData::from).collect())
}
