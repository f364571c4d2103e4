//! Scanner: fetch pairs, score them, and paper-trade the signals.
//!
//! Handles:
//! - Scoring each pair and acting on BUY/SELL signals
//! - Risk-based sizing with a stop below the quoted price
//! - Take-profit / stop-loss exits for held tokens
//! - Polling the data source until interrupted

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::DexScreenerClient;
use crate::models::{AnalysisResult, Decision, PairData, TradeRecord};
use crate::scoring::ScoringEngine;
use crate::trading::{LedgerConfig, PortfolioLedger};

/// Scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Stop distance below entry used for sizing and exits (0.0 to 1.0)
    pub stop_loss_pct: Decimal,

    /// Gain on cost basis that closes a position (0.0 to 1.0)
    pub take_profit_pct: Decimal,

    /// Maximum pairs fetched per poll
    pub max_pairs: usize,

    /// Seconds between polls
    pub poll_interval_secs: u64,

    /// Scan volume-ranked pairs instead of newly created ones
    pub trending: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: dec!(0.15),   // 15% stop loss
            take_profit_pct: dec!(0.25), // 25% profit target
            max_pairs: 50,
            poll_interval_secs: 60,
            trending: false,
        }
    }
}

/// Why a held position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    SellSignal,
}

/// What the scanner did with one pair.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanAction {
    Bought(TradeRecord),
    Sold { record: TradeRecord, reason: ExitReason },
    Skipped(String),
    NoAction,
}

/// Analysis plus the resulting action for one pair.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub symbol: String,
    pub analysis: AnalysisResult,
    pub action: ScanAction,
}

/// Paper-trading scanner owning one ledger.
pub struct Scanner {
    config: ScannerConfig,
    engine: ScoringEngine,
    ledger: PortfolioLedger,
}

impl Scanner {
    pub fn new(config: ScannerConfig, ledger_config: LedgerConfig) -> Self {
        Self {
            config,
            engine: ScoringEngine::new(),
            ledger: PortfolioLedger::new(ledger_config),
        }
    }

    pub fn ledger(&self) -> &PortfolioLedger {
        &self.ledger
    }

    /// Score a batch of pairs and act on each in order.
    pub fn scan(&mut self, pairs: &[PairData], now: DateTime<Utc>) -> Vec<ScanOutcome> {
        pairs.iter().map(|p| self.process_pair(p, now)).collect()
    }

    /// Score one pair and apply the resulting trade, if any.
    pub fn process_pair(&mut self, pair: &PairData, now: DateTime<Utc>) -> ScanOutcome {
        let analysis = self.engine.analyze_at(pair, now);

        let Some(symbol) = pair.symbol().map(str::to_string) else {
            return ScanOutcome {
                symbol: pair.display_name(),
                analysis,
                action: ScanAction::Skipped("Pair has no symbol".to_string()),
            };
        };

        let price = quoted_price(pair);
        let action = if self.ledger.is_held(&symbol) {
            self.manage_position(&symbol, price, &analysis)
        } else if analysis.is_buy() {
            self.enter_position(&symbol, price)
        } else {
            ScanAction::NoAction
        };

        debug!(
            symbol = %symbol,
            score = %analysis.score,
            decision = %analysis.decision,
            "Processed pair"
        );

        ScanOutcome {
            symbol,
            analysis,
            action,
        }
    }

    fn enter_position(&mut self, symbol: &str, price: Option<Decimal>) -> ScanAction {
        let Some(price) = price else {
            return ScanAction::Skipped("No quoted price".to_string());
        };

        let stop_loss = price * (Decimal::ONE - self.config.stop_loss_pct);
        let shares = self.ledger.size_position(symbol, price, stop_loss);
        if shares <= Decimal::ZERO {
            return ScanAction::Skipped("Position size is zero".to_string());
        }

        match self.ledger.execute_trade(symbol, Decision::Buy, price, shares) {
            Ok(record) => ScanAction::Bought(record),
            Err(rejection) => ScanAction::Skipped(rejection.to_string()),
        }
    }

    fn manage_position(
        &mut self,
        symbol: &str,
        price: Option<Decimal>,
        analysis: &AnalysisResult,
    ) -> ScanAction {
        let Some(price) = price else {
            return ScanAction::Skipped("No quoted price".to_string());
        };

        let reason = match self.check_exit(symbol, price) {
            Some(reason) => reason,
            None if analysis.is_sell() => ExitReason::SellSignal,
            None => return ScanAction::NoAction,
        };

        let Some(shares) = self.ledger.position(symbol).map(|p| p.shares) else {
            return ScanAction::NoAction;
        };

        match self.ledger.execute_trade(symbol, Decision::Sell, price, shares) {
            Ok(record) => {
                info!(symbol = %symbol, reason = ?reason, "Closed position");
                ScanAction::Sold { record, reason }
            }
            Err(rejection) => ScanAction::Skipped(rejection.to_string()),
        }
    }

    /// Take-profit / stop-loss check against the position's cost basis.
    pub fn check_exit(&self, symbol: &str, price: Decimal) -> Option<ExitReason> {
        let position = self.ledger.position(symbol)?;
        let return_pct = position.return_pct(price);

        if return_pct >= self.config.take_profit_pct {
            Some(ExitReason::TakeProfit)
        } else if return_pct <= -self.config.stop_loss_pct {
            Some(ExitReason::StopLoss)
        } else {
            None
        }
    }

    /// Poll the data source and paper-trade until Ctrl+C (or once).
    pub async fn run(&mut self, client: &DexScreenerClient, once: bool) -> Result<()> {
        let period = Duration::from_secs(self.config.poll_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping scanner");
                    break;
                }
                _ = ticker.tick() => {
                    self.poll(client).await;
                    if once {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    async fn poll(&mut self, client: &DexScreenerClient) {
        let fetched = if self.config.trending {
            client.get_trending_pairs().await
        } else {
            client.get_new_pairs(self.config.max_pairs).await
        };

        let pairs = match fetched {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(error = %e, "Failed to fetch pairs");
                return;
            }
        };

        let outcomes = self.scan(&pairs, Utc::now());
        let mut traded = 0;
        for outcome in &outcomes {
            match &outcome.action {
                ScanAction::Bought(record) => {
                    traded += 1;
                    println!(
                        "  BUY  {} {:.4} @ ${:.8} (score {:.3})",
                        record.symbol, record.shares, record.price, outcome.analysis.score
                    );
                }
                ScanAction::Sold { record, reason } => {
                    traded += 1;
                    println!(
                        "  SELL {} {:.4} @ ${:.8} ({:?})",
                        record.symbol, record.shares, record.price, reason
                    );
                }
                ScanAction::Skipped(why) => {
                    debug!(symbol = %outcome.symbol, reason = %why, "Skipped signal")
                }
                ScanAction::NoAction => {}
            }
        }

        let summary = self.ledger.summary();
        println!(
            "[{}] Pairs: {} | Trades: {} | Cash: ${:.2} | Value: ${:.2} | Positions: {}",
            chrono::Local::now().format("%H:%M:%S"),
            pairs.len(),
            traded,
            summary.cash,
            summary.portfolio_value,
            summary.open_positions
        );
    }
}

fn quoted_price(pair: &PairData) -> Option<Decimal> {
    pair.price_usd
        .and_then(|p| Decimal::try_from(p).ok())
        .filter(|p| *p > Decimal::ZERO)
}
