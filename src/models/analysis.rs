//! Analysis result produced by the scoring engine.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading signal derived from a pair's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
            Decision::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Decision::Buy),
            "SELL" => Ok(Decision::Sell),
            "HOLD" => Ok(Decision::Hold),
            other => Err(format!("unknown decision: {}", other)),
        }
    }
}

/// Outcome of scoring a single pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Weighted sum of the sub-scores, nominally in [0, 1]
    pub score: Decimal,

    /// Signal derived from the score
    pub decision: Decision,

    /// Mirrors `score`
    pub confidence: Decimal,

    /// Explanations in evaluation order
    pub reasons: Vec<String>,
}

impl AnalysisResult {
    /// Result with nothing accumulated yet.
    pub fn empty() -> Self {
        Self {
            score: Decimal::ZERO,
            decision: Decision::Hold,
            confidence: Decimal::ZERO,
            reasons: Vec::new(),
        }
    }

    pub fn is_buy(&self) -> bool {
        self.decision == Decision::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.decision == Decision::Sell
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self::empty()
    }
}
