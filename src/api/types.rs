//! API response types for the DexScreener search endpoint.

use serde::Deserialize;

use crate::models::PairData;

/// Response from /search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub schema_version: String,
    #[serde(default)]
    pub pairs: Option<Vec<PairResponse>>,
}

/// A single pair listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairResponse {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pair_address: String,
    #[serde(default)]
    pub base_token: Option<TokenResponse>,
    #[serde(default)]
    pub quote_token: Option<TokenResponse>,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub volume: Option<WindowedValues>,
    #[serde(default)]
    pub price_change: Option<WindowedValues>,
    #[serde(default)]
    pub liquidity: Option<LiquidityResponse>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pair_created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Values reported per rolling window (5m, 1h, 6h, 24h).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowedValues {
    #[serde(default)]
    pub m5: Option<f64>,
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h6: Option<f64>,
    #[serde(default)]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiquidityResponse {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub base: Option<f64>,
    #[serde(default)]
    pub quote: Option<f64>,
}

/// A JSON document holding pairs: either a full search response or a bare
/// array of pair listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PairsDocument {
    List(Vec<PairResponse>),
    Search(SearchResponse),
}

impl PairsDocument {
    pub fn into_pairs(self) -> Vec<PairResponse> {
        match self {
            PairsDocument::List(pairs) => pairs,
            PairsDocument::Search(resp) => resp.pairs.unwrap_or_default(),
        }
    }
}

impl From<PairResponse> for PairData {
    fn from(p: PairResponse) -> Self {
        let base = p.base_token.unwrap_or_default();

        PairData {
            liquidity_usd: p.liquidity.and_then(|l| l.usd),
            // DexScreener reports percent; the scorer works in fractions
            price_change_h24: p.price_change.and_then(|c| c.h24).map(|pct| pct / 100.0),
            volume_h24_usd: p.volume.and_then(|v| v.h24),
            pair_created_at_millis: p.pair_created_at,
            base_token_symbol: base.symbol,
            base_token_name: base.name,
            pair_address: Some(p.pair_address).filter(|a| !a.is_empty()),
            chain_id: Some(p.chain_id).filter(|c| !c.is_empty()),
            price_usd: p.price_usd.and_then(|s| s.parse::<f64>().ok()),
        }
    }
}
