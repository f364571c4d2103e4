//! Trade record appended to the ledger's history on every fill.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a simulated fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// Immutable record of one executed paper trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Ledger key of the traded token
    pub symbol: String,

    /// Trade direction
    pub action: TradeSide,

    /// Number of tokens filled
    pub shares: Decimal,

    /// Fill price per token in USD
    pub price: Decimal,

    /// `shares * price`
    pub value: Decimal,

    /// When the fill was recorded
    pub timestamp: DateTime<Utc>,
}

impl TradeRecord {
    /// Build a record, or `None` if `shares * price` overflows.
    pub fn new(
        symbol: impl Into<String>,
        action: TradeSide,
        shares: Decimal,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        Some(Self {
            symbol: symbol.into(),
            action,
            shares,
            price,
            value: shares.checked_mul(price)?,
            timestamp,
        })
    }

    /// Signed cash movement caused by this trade.
    pub fn cash_delta(&self) -> Decimal {
        match self.action {
            TradeSide::Buy => -self.value,
            TradeSide::Sell => self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_value_and_cash_delta() {
        let buy = TradeRecord::new("PEPE", TradeSide::Buy, dec!(5), dec!(10), Utc::now()).unwrap();
        assert_eq!(buy.value, dec!(50));
        assert_eq!(buy.cash_delta(), dec!(-50));

        let sell =
            TradeRecord::new("PEPE", TradeSide::Sell, dec!(2.5), dec!(4), Utc::now()).unwrap();
        assert_eq!(sell.value, dec!(10));
        assert_eq!(sell.cash_delta(), dec!(10));
    }

    #[test]
    fn test_unrepresentable_value_has_no_record() {
        let record = TradeRecord::new("PEPE", TradeSide::Buy, dec!(2), Decimal::MAX, Utc::now());
        assert!(record.is_none());
    }
}
