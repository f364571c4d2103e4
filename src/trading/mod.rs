//! Paper trading: ledger configuration, position sizing, and the ledger.

mod config;
mod ledger;
mod position_sizer;

pub use config::LedgerConfig;
pub use ledger::PortfolioLedger;
pub use position_sizer::PositionSizer;
