//! Risk-based position sizing with a per-position cap.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Calculator for share counts given a risk budget and a stop loss.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    risk_per_trade: Decimal,
    max_position_fraction: Decimal,
}

impl PositionSizer {
    /// Create a sizer risking `risk_per_trade` of cash per trade.
    pub fn new(risk_per_trade: Decimal) -> Self {
        Self {
            risk_per_trade,
            max_position_fraction: dec!(0.10), // Max 10% of cash in one position
        }
    }

    pub fn risk_per_trade(&self) -> Decimal {
        self.risk_per_trade
    }

    pub fn max_position_fraction(&self) -> Decimal {
        self.max_position_fraction
    }

    /// Number of shares to buy at `price` with a stop at `stop_loss`.
    ///
    /// shares = (cash * risk_per_trade) / |price - stop_loss|,
    /// capped at (cash * max_position_fraction) / price.
    ///
    /// Returns zero for degenerate input (no price risk, non-positive price);
    /// callers treat zero as "do not trade".
    pub fn calculate_size(&self, cash: Decimal, price: Decimal, stop_loss: Decimal) -> Decimal {
        let price_risk = price.saturating_sub(stop_loss).abs();
        if price_risk.is_zero() || price <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let Some(max_shares) = cash
            .checked_mul(self.max_position_fraction)
            .and_then(|value| value.checked_div(price))
        else {
            return Decimal::ZERO;
        };

        cash.checked_mul(self.risk_per_trade)
            .and_then(|risk| risk.checked_div(price_risk))
            .map_or(max_shares, |shares| shares.min(max_shares))
    }
}

impl Default for PositionSizer {
    fn default() -> Self {
        Self::new(dec!(0.02))
    }
}
