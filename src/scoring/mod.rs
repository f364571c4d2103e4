//! Pair scoring: bucketed sub-scores combined into a trading signal.

mod engine;
mod sub_score;

pub use engine::ScoringEngine;
pub use sub_score::SOCIAL_KEYWORDS;
