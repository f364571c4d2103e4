//! Position model representing the ledger's holdings in one token.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Open holding in a single token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Number of tokens held; always positive while the position exists
    pub shares: Decimal,

    /// Volume-weighted average purchase price
    pub cost_basis: Decimal,

    /// When the position was first opened
    pub entry_time: DateTime<Utc>,
}

impl Position {
    /// Open a new position from an initial fill.
    pub fn new(shares: Decimal, price: Decimal, entry_time: DateTime<Utc>) -> Self {
        Self {
            shares,
            cost_basis: price,
            entry_time,
        }
    }

    /// Add to position (averaging in).
    ///
    /// Returns `None` and leaves the position untouched if the new size or
    /// cost basis is not representable.
    pub fn add(&mut self, shares: Decimal, price: Decimal) -> Option<()> {
        let new_shares = self.shares.checked_add(shares)?;
        let total_cost = self
            .cost_basis
            .checked_mul(self.shares)?
            .checked_add(shares.checked_mul(price)?)?;

        self.cost_basis = total_cost.checked_div(new_shares)?;
        self.shares = new_shares;
        Some(())
    }

    /// Reduce position size, returning the number of shares actually removed.
    pub fn reduce(&mut self, shares: Decimal) -> Decimal {
        let removed = shares.min(self.shares);
        self.shares -= removed;
        removed
    }

    /// Check if the position is fully closed.
    pub fn is_closed(&self) -> bool {
        self.shares.is_zero()
    }

    /// Value of the holding at its cost basis.
    pub fn book_value(&self) -> Decimal {
        self.shares * self.cost_basis
    }

    /// Return on the cost basis at a quoted price, saturating at the
    /// representable range.
    pub fn return_pct(&self, price: Decimal) -> Decimal {
        if self.cost_basis.is_zero() {
            return Decimal::ZERO;
        }

        let gain = price.saturating_sub(self.cost_basis);
        gain.checked_div(self.cost_basis).unwrap_or(if gain.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
    }
}
