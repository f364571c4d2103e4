//! Pair model representing one freshly listed DEX trading pair.

use serde::{Deserialize, Serialize};

/// Market snapshot of a DEX pair as handed to the scoring engine.
///
/// Every field is optional: upstream listings are frequently incomplete, and
/// the engine substitutes its own defaults for anything missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairData {
    /// Pool liquidity in USD
    #[serde(default)]
    pub liquidity_usd: Option<f64>,

    /// 24h price change as a fraction (0.5 = +50%)
    #[serde(default)]
    pub price_change_h24: Option<f64>,

    /// 24h traded volume in USD
    #[serde(default)]
    pub volume_h24_usd: Option<f64>,

    /// Pair creation time in epoch milliseconds
    #[serde(default)]
    pub pair_created_at_millis: Option<i64>,

    /// Base token ticker (e.g., "PEPE")
    #[serde(default)]
    pub base_token_symbol: Option<String>,

    /// Base token display name
    #[serde(default)]
    pub base_token_name: Option<String>,

    /// On-chain pair address
    #[serde(default)]
    pub pair_address: Option<String>,

    /// Chain the pair lives on (e.g., "solana")
    #[serde(default)]
    pub chain_id: Option<String>,

    /// Last quoted price of the base token in USD
    #[serde(default)]
    pub price_usd: Option<f64>,
}

impl PairData {
    /// Liquidity in USD, zero when absent.
    pub fn liquidity(&self) -> f64 {
        self.liquidity_usd.unwrap_or(0.0)
    }

    /// 24h fractional price change, zero when absent.
    pub fn price_change(&self) -> f64 {
        self.price_change_h24.unwrap_or(0.0)
    }

    /// 24h volume in USD, zero when absent.
    pub fn volume(&self) -> f64 {
        self.volume_h24_usd.unwrap_or(0.0)
    }

    /// Symbol used as the ledger key; falls back to the pair address.
    pub fn symbol(&self) -> Option<&str> {
        self.base_token_symbol
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.pair_address.as_deref())
    }

    /// Human-readable label for tables and logs.
    pub fn display_name(&self) -> String {
        match (&self.base_token_symbol, &self.base_token_name) {
            (Some(symbol), Some(name)) => format!("{} ({})", symbol, name),
            (Some(symbol), None) => symbol.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => self
                .pair_address
                .clone()
                .unwrap_or_else(|| "<unknown>".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let pair = PairData::default();

        assert_eq!(pair.liquidity(), 0.0);
        assert_eq!(pair.price_change(), 0.0);
        assert_eq!(pair.volume(), 0.0);
        assert!(pair.symbol().is_none());
    }

    #[test]
    fn test_symbol_falls_back_to_pair_address() {
        let pair = PairData {
            base_token_symbol: Some(String::new()),
            pair_address: Some("0xpair".to_string()),
            ..Default::default()
        };
        assert_eq!(pair.symbol(), Some("0xpair"));

        let pair = PairData {
            base_token_symbol: Some("WOJAK".to_string()),
            pair_address: Some("0xpair".to_string()),
            ..Default::default()
        };
        assert_eq!(pair.symbol(), Some("WOJAK"));
    }
}
