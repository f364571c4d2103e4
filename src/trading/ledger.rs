//! Simulated portfolio ledger: cash, open positions, and an append-only
//! trade history.
//!
//! Valuation is at cost basis. The ledger never sees live prices, so
//! `portfolio_value` is what was paid for the open positions plus cash,
//! not a mark-to-market figure.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Decision, Position, TradeRecord, TradeSide};

use super::{LedgerConfig, PositionSizer};

/// Why a trade was refused. The ledger is unchanged whenever one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeRejection {
    #[error("insufficient cash for {symbol}: need {required}, have {available}")]
    InsufficientCash {
        symbol: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("no open position in {0}")]
    NotHeld(String),

    #[error("decision {0} does not map to a trade")]
    UnsupportedDecision(Decision),

    #[error("price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("trade in {0} overflows the ledger's numeric range")]
    Overflow(String),
}

/// Cash and holdings owned by one ledger.
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    cash: Decimal,
    positions: HashMap<String, Position>,
    total_value: Decimal,
}

impl Portfolio {
    fn new(initial_cash: Decimal) -> Self {
        Self {
            cash: initial_cash,
            positions: HashMap::new(),
            total_value: initial_cash,
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    /// Value recorded at construction; not kept in sync with trades.
    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }
}

/// Paper-trading ledger with risk-based sizing.
pub struct PortfolioLedger {
    portfolio: Portfolio,
    trade_history: Vec<TradeRecord>,
    position_sizer: PositionSizer,
}

impl PortfolioLedger {
    /// Create a ledger holding only `config.initial_cash`.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            portfolio: Portfolio::new(config.initial_cash),
            trade_history: Vec::new(),
            position_sizer: PositionSizer::new(config.risk_per_trade),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn cash(&self) -> Decimal {
        self.portfolio.cash()
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.portfolio.position(symbol)
    }

    pub fn is_held(&self, symbol: &str) -> bool {
        self.portfolio.positions.contains_key(symbol)
    }

    pub fn trade_history(&self) -> &[TradeRecord] {
        &self.trade_history
    }

    /// Shares to buy given a stop loss; zero means "do not trade".
    pub fn size_position(&self, symbol: &str, price: Decimal, stop_loss: Decimal) -> Decimal {
        let shares = self
            .position_sizer
            .calculate_size(self.portfolio.cash, price, stop_loss);

        debug!(
            symbol = %symbol,
            price = %price,
            stop_loss = %stop_loss,
            shares = %shares,
            "Sized position"
        );
        shares
    }

    /// Apply a BUY or SELL to the ledger.
    ///
    /// BUY requires `amount * price <= cash` and averages into any existing
    /// position. SELL requires an open position; the amount is clamped to the
    /// shares held and the position is removed once it reaches zero. Every
    /// check, overflow included, runs before any state changes.
    pub fn execute_trade(
        &mut self,
        symbol: &str,
        decision: Decision,
        price: Decimal,
        amount: Decimal,
    ) -> Result<TradeRecord, TradeRejection> {
        let result = self.apply(symbol, decision, price, amount, Utc::now());

        match &result {
            Ok(record) => info!(
                symbol = %record.symbol,
                action = record.action.as_str(),
                shares = %record.shares,
                price = %record.price,
                value = %record.value,
                cash = %self.portfolio.cash,
                "Paper trade executed"
            ),
            Err(rejection) => warn!(
                symbol = %symbol,
                decision = %decision,
                error = %rejection,
                "Paper trade rejected"
            ),
        }

        result
    }

    fn apply(
        &mut self,
        symbol: &str,
        decision: Decision,
        price: Decimal,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TradeRecord, TradeRejection> {
        let side = match decision {
            Decision::Buy => TradeSide::Buy,
            Decision::Sell => TradeSide::Sell,
            Decision::Hold => return Err(TradeRejection::UnsupportedDecision(decision)),
        };
        if price <= Decimal::ZERO {
            return Err(TradeRejection::InvalidPrice(price));
        }
        if amount <= Decimal::ZERO {
            return Err(TradeRejection::InvalidAmount(amount));
        }

        let record = match side {
            TradeSide::Buy => self.buy(symbol, price, amount, now)?,
            TradeSide::Sell => self.sell(symbol, price, amount, now)?,
        };

        self.trade_history.push(record.clone());
        Ok(record)
    }

    fn buy(
        &mut self,
        symbol: &str,
        price: Decimal,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TradeRecord, TradeRejection> {
        let record = TradeRecord::new(symbol, TradeSide::Buy, amount, price, now)
            .ok_or_else(|| TradeRejection::Overflow(symbol.to_string()))?;

        if record.value > self.portfolio.cash {
            return Err(TradeRejection::InsufficientCash {
                symbol: symbol.to_string(),
                required: record.value,
                available: self.portfolio.cash,
            });
        }
        let cash = self.portfolio.cash + record.cash_delta();

        match self.portfolio.positions.get_mut(symbol) {
            Some(position) => position
                .add(amount, price)
                .ok_or_else(|| TradeRejection::Overflow(symbol.to_string()))?,
            None => {
                self.portfolio
                    .positions
                    .insert(symbol.to_string(), Position::new(amount, price, now));
            }
        }

        self.portfolio.cash = cash;
        Ok(record)
    }

    fn sell(
        &mut self,
        symbol: &str,
        price: Decimal,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TradeRecord, TradeRejection> {
        let Some(position) = self.portfolio.positions.get_mut(symbol) else {
            return Err(TradeRejection::NotHeld(symbol.to_string()));
        };

        let shares = amount.min(position.shares);
        let overflow = || TradeRejection::Overflow(symbol.to_string());
        let record = TradeRecord::new(symbol, TradeSide::Sell, shares, price, now)
            .ok_or_else(overflow)?;
        let cash = self
            .portfolio
            .cash
            .checked_add(record.cash_delta())
            .ok_or_else(overflow)?;

        position.reduce(shares);
        if position.is_closed() {
            self.portfolio.positions.remove(symbol);
        }

        self.portfolio.cash = cash;
        Ok(record)
    }

    /// Cash plus every open position at its cost basis.
    pub fn portfolio_value(&self) -> Decimal {
        self.portfolio
            .positions
            .values()
            .map(Position::book_value)
            .fold(self.portfolio.cash, Decimal::saturating_add)
    }

    /// Snapshot of the ledger for display.
    pub fn summary(&self) -> LedgerSummary {
        let value = self.portfolio_value();
        let initial = self.portfolio.total_value();
        let return_pct = value
            .saturating_sub(initial)
            .checked_div(initial)
            .unwrap_or(Decimal::ZERO);

        let buys = self
            .trade_history
            .iter()
            .filter(|t| t.action == TradeSide::Buy)
            .count();

        LedgerSummary {
            initial_cash: initial,
            cash: self.portfolio.cash,
            portfolio_value: value,
            return_pct,
            open_positions: self.portfolio.positions.len(),
            total_trades: self.trade_history.len(),
            buys,
            sells: self.trade_history.len() - buys,
        }
    }
}

/// Ledger statistics at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub initial_cash: Decimal,
    pub cash: Decimal,
    pub portfolio_value: Decimal,
    pub return_pct: Decimal,
    pub open_positions: usize,
    pub total_trades: usize,
    pub buys: usize,
    pub sells: usize,
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{:=^50}", " PAPER PORTFOLIO ")?;
        writeln!(f, "Initial Cash:     ${:.2}", self.initial_cash)?;
        writeln!(f, "Cash Available:   ${:.2}", self.cash)?;
        writeln!(f, "Value (at cost):  ${:.2}", self.portfolio_value)?;
        writeln!(f, "Return:           {:.2}%", self.return_pct * dec!(100))?;
        writeln!(f)?;
        writeln!(f, "Open Positions:   {}", self.open_positions)?;
        writeln!(
            f,
            "Trades:           {} ({} buys, {} sells)",
            self.total_trades, self.buys, self.sells
        )?;
        writeln!(f, "{:=^50}", "")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(cash: Decimal) -> PortfolioLedger {
        PortfolioLedger::new(LedgerConfig {
            initial_cash: cash,
            ..Default::default()
        })
    }

    #[test]
    fn test_repeated_buys_accumulate() {
        let mut ledger = ledger(dec!(1000));

        ledger.execute_trade("X", Decision::Buy, dec!(10), dec!(5)).unwrap();
        ledger.execute_trade("X", Decision::Buy, dec!(10), dec!(5)).unwrap();

        let pos = ledger.position("X").unwrap();
        assert_eq!(pos.shares, dec!(10));
        assert_eq!(pos.cost_basis, dec!(10));
        assert_eq!(ledger.cash(), dec!(900));
        assert_eq!(ledger.trade_history().len(), 2);
    }

    #[test]
    fn test_cost_basis_is_volume_weighted() {
        let mut ledger = ledger(dec!(1000));

        ledger.execute_trade("X", Decision::Buy, dec!(10), dec!(10)).unwrap();
        ledger.execute_trade("X", Decision::Buy, dec!(20), dec!(30)).unwrap();

        // (10*10 + 30*20) / 40 = 17.5
        let pos = ledger.position("X").unwrap();
        assert_eq!(pos.shares, dec!(40));
        assert_eq!(pos.cost_basis, dec!(17.5));
        assert_eq!(ledger.cash(), dec!(300));
    }

    #[test]
    fn test_sell_is_clamped_to_holdings() {
        let mut ledger = ledger(dec!(1000));
        ledger.execute_trade("X", Decision::Buy, dec!(10), dec!(5)).unwrap();
        let cash_before = ledger.cash();

        let record = ledger
            .execute_trade("X", Decision::Sell, dec!(10), dec!(100))
            .unwrap();

        assert_eq!(record.action, TradeSide::Sell);
        assert_eq!(record.shares, dec!(5));
        assert_eq!(record.value, dec!(50));
        assert_eq!(ledger.cash(), cash_before + dec!(50));
        assert!(ledger.position("X").is_none());
        assert!(!ledger.is_held("X"));
    }

    #[test]
    fn test_partial_sell_keeps_cost_basis() {
        let mut ledger = ledger(dec!(1000));
        ledger.execute_trade("X", Decision::Buy, dec!(10), dec!(5)).unwrap();

        ledger.execute_trade("X", Decision::Sell, dec!(12), dec!(2)).unwrap();

        let pos = ledger.position("X").unwrap();
        assert_eq!(pos.shares, dec!(3));
        assert_eq!(pos.cost_basis, dec!(10));
        assert_eq!(ledger.cash(), dec!(974));
    }

    #[test]
    fn test_buy_over_cash_is_rejected_without_side_effects() {
        let mut ledger = ledger(dec!(100));

        let result = ledger.execute_trade("Y", Decision::Buy, dec!(10), dec!(1000));

        assert!(matches!(
            result,
            Err(TradeRejection::InsufficientCash { .. })
        ));
        assert_eq!(ledger.cash(), dec!(100));
        assert!(ledger.trade_history().is_empty());
        assert!(ledger.position("Y").is_none());
    }

    #[test]
    fn test_buy_of_exactly_all_cash_succeeds() {
        let mut ledger = ledger(dec!(100));

        ledger.execute_trade("Y", Decision::Buy, dec!(10), dec!(10)).unwrap();
        assert_eq!(ledger.cash(), Decimal::ZERO);
    }

    #[test]
    fn test_sell_without_position_is_rejected() {
        let mut ledger = ledger(dec!(100));

        let result = ledger.execute_trade("Z", Decision::Sell, dec!(10), dec!(1));

        assert_eq!(result, Err(TradeRejection::NotHeld("Z".to_string())));
        assert_eq!(ledger.cash(), dec!(100));
        assert!(ledger.trade_history().is_empty());
    }

    #[test]
    fn test_hold_and_invalid_inputs_are_rejected() {
        let mut ledger = ledger(dec!(100));

        assert_eq!(
            ledger.execute_trade("X", Decision::Hold, dec!(1), dec!(1)),
            Err(TradeRejection::UnsupportedDecision(Decision::Hold))
        );
        assert_eq!(
            ledger.execute_trade("X", Decision::Buy, Decimal::ZERO, dec!(1)),
            Err(TradeRejection::InvalidPrice(Decimal::ZERO))
        );
        assert_eq!(
            ledger.execute_trade("X", Decision::Buy, dec!(1), dec!(-1)),
            Err(TradeRejection::InvalidAmount(dec!(-1)))
        );
        assert_eq!(ledger.cash(), dec!(100));
        assert!(ledger.trade_history().is_empty());
    }

    #[test]
    fn test_degenerate_sizing() {
        let ledger = ledger(dec!(1000));
        assert_eq!(ledger.size_position("X", dec!(10), dec!(10)), Decimal::ZERO);
    }

    #[test]
    fn test_sizing_does_not_mutate() {
        let ledger = ledger(dec!(1000));

        let shares = ledger.size_position("X", dec!(10), dec!(8));

        // $20 risk / $2 = 10, cap $100 / $10 = 10
        assert_eq!(shares, dec!(10));
        assert_eq!(ledger.cash(), dec!(1000));
    }

    #[test]
    fn test_portfolio_value_at_cost_basis() {
        let mut ledger = ledger(dec!(1000));
        ledger.execute_trade("A", Decision::Buy, dec!(2), dec!(50)).unwrap();
        ledger.execute_trade("B", Decision::Buy, dec!(0.5), dec!(300)).unwrap();

        // cash 1000 - 100 - 150 = 750
        let expected = ledger.cash() + dec!(50) * dec!(2) + dec!(300) * dec!(0.5);
        assert_eq!(ledger.portfolio_value(), expected);
        assert_eq!(ledger.portfolio_value(), dec!(1000));
        assert_eq!(ledger.portfolio().total_value(), dec!(1000));
    }

    #[test]
    fn test_summary_counts_trades() {
        let mut ledger = ledger(dec!(1000));
        ledger.execute_trade("A", Decision::Buy, dec!(10), dec!(10)).unwrap();
        ledger.execute_trade("A", Decision::Sell, dec!(12), dec!(10)).unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.cash, dec!(1020));
        assert_eq!(summary.return_pct, dec!(0.02));
        assert_eq!(summary.open_positions, 0);
        assert_eq!(summary.buys, 1);
        assert_eq!(summary.sells, 1);
        assert!(summary.to_string().contains("PAPER PORTFOLIO"));
    }

    #[test]
    fn test_overflowing_buy_is_rejected_without_side_effects() {
        let mut ledger = ledger(dec!(1000));

        let result = ledger.execute_trade("X", Decision::Buy, Decimal::MAX, dec!(2));

        assert_eq!(result, Err(TradeRejection::Overflow("X".to_string())));
        assert_eq!(ledger.cash(), dec!(1000));
        assert!(ledger.trade_history().is_empty());
        assert!(!ledger.is_held("X"));
    }

    #[test]
    fn test_overflowing_sell_proceeds_are_rejected() {
        let mut ledger = ledger(dec!(1000));
        ledger.execute_trade("X", Decision::Buy, dec!(1), dec!(10)).unwrap();

        let result = ledger.execute_trade("X", Decision::Sell, Decimal::MAX, dec!(10));

        assert_eq!(result, Err(TradeRejection::Overflow("X".to_string())));
        assert_eq!(ledger.cash(), dec!(990));
        assert_eq!(ledger.position("X").map(|p| p.shares), Some(dec!(10)));
        assert_eq!(ledger.trade_history().len(), 1);
    }
}
