//! Ledger configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tunables for a simulated portfolio ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Starting cash balance in USD
    pub initial_cash: Decimal,

    /// Fraction of cash put at risk per trade (0.0 to 1.0)
    pub risk_per_trade: Decimal,
}

impl LedgerConfig {
    pub fn new(initial_cash: Decimal, risk_per_trade: Decimal) -> Self {
        Self {
            initial_cash,
            risk_per_trade,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_cash: dec!(1000),   // $1000 paper capital
            risk_per_trade: dec!(0.02), // 2% risk per trade
        }
    }
}
