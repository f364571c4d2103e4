//! Data models for pairs, analyses, positions, and trades.

mod analysis;
mod pair;
mod position;
mod trade;

pub use analysis::{AnalysisResult, Decision};
pub use pair::PairData;
pub use position::Position;
pub use trade::{TradeRecord, TradeSide};
