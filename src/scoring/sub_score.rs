//! Individual sub-scores: bucketed step functions over one pair attribute.
//!
//! Each function maps its input onto a fixed set of levels in [0, 1]. Inputs
//! that carry no value (NaN, out-of-range timestamps) never propagate: the affected sub-score degrades to a fixed
//! fallback and carries the fault along for the caller to report.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::models::PairData;

/// Tokens whose presence in a symbol or name hints at meme/social traction.
pub const SOCIAL_KEYWORDS: [&str; 6] = ["elon", "moon", "doge", "shib", "pepe", "wojak"];

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Why a sub-score could not be computed from its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringFault {
    #[error("{field} is not representable: {value}")]
    NotRepresentable { field: &'static str, value: f64 },

    #[error("pair creation time {0}ms is out of range")]
    CreationTimeOutOfRange(i64),
}

/// A sub-score value, either measured or substituted after a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum SubScore {
    Measured(Decimal),
    Fallback { value: Decimal, fault: ScoringFault },
}

impl SubScore {
    pub fn value(&self) -> Decimal {
        match self {
            SubScore::Measured(v) => *v,
            SubScore::Fallback { value, .. } => *value,
        }
    }

    pub fn fault(&self) -> Option<&ScoringFault> {
        match self {
            SubScore::Measured(_) => None,
            SubScore::Fallback { fault, .. } => Some(fault),
        }
    }
}

/// Convert a wire float. Magnitudes beyond `Decimal`'s range (infinities
/// included) saturate so that larger inputs never score lower; only NaN is
/// a fault.
fn to_decimal(field: &'static str, value: f64) -> Result<Decimal, ScoringFault> {
    if value.is_nan() {
        return Err(ScoringFault::NotRepresentable { field, value });
    }

    Ok(Decimal::try_from(value).unwrap_or(if value.abs() < 1.0 {
        Decimal::ZERO
    } else if value > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    }))
}

/// Liquidity in USD. There is no fallback level: a bad liquidity figure
/// aborts the whole analysis.
pub fn liquidity(pair: &PairData) -> Result<(Decimal, Decimal), ScoringFault> {
    let usd = to_decimal("liquidity.usd", pair.liquidity())?;
    Ok((usd, liquidity_level(usd)))
}

pub fn liquidity_level(usd: Decimal) -> Decimal {
    if usd >= dec!(50000) {
        dec!(1.0)
    } else if usd >= dec!(25000) {
        dec!(0.8)
    } else if usd >= dec!(10000) {
        dec!(0.6)
    } else if usd >= dec!(5000) {
        dec!(0.4)
    } else {
        dec!(0.2)
    }
}

/// 24h fractional price change.
pub fn momentum(pair: &PairData) -> SubScore {
    match to_decimal("priceChange.h24", pair.price_change()) {
        Ok(change) => SubScore::Measured(momentum_level(change)),
        Err(fault) => SubScore::Fallback {
            value: dec!(0.5),
            fault,
        },
    }
}

pub fn momentum_level(change: Decimal) -> Decimal {
    if change > dec!(0.5) {
        dec!(0.9)
    } else if change > dec!(0.2) {
        dec!(0.7)
    } else if change > Decimal::ZERO {
        dec!(0.5)
    } else if change > dec!(-0.1) {
        dec!(0.3)
    } else {
        dec!(0.1)
    }
}

/// 24h traded volume in USD.
pub fn volume(pair: &PairData) -> SubScore {
    match to_decimal("volume.h24", pair.volume()) {
        Ok(usd) => SubScore::Measured(volume_level(usd)),
        Err(fault) => SubScore::Fallback {
            value: dec!(0.3),
            fault,
        },
    }
}

pub fn volume_level(usd: Decimal) -> Decimal {
    if usd > dec!(1000000) {
        dec!(1.0)
    } else if usd > dec!(500000) {
        dec!(0.8)
    } else if usd > dec!(100000) {
        dec!(0.6)
    } else if usd > dec!(50000) {
        dec!(0.4)
    } else {
        dec!(0.2)
    }
}

/// Hours since pair creation, relative to `now`.
///
/// A missing or zero timestamp means the listing did not report one and
/// scores the neutral 0.5 without a fault.
pub fn age(pair: &PairData, now: DateTime<Utc>) -> SubScore {
    let millis = match pair.pair_created_at_millis {
        Some(ms) if ms != 0 => ms,
        _ => return SubScore::Measured(dec!(0.5)),
    };

    let Some(created) = Utc.timestamp_millis_opt(millis).single() else {
        return SubScore::Fallback {
            value: dec!(0.5),
            fault: ScoringFault::CreationTimeOutOfRange(millis),
        };
    };

    let elapsed_ms = (now - created).num_milliseconds();
    let hours = Decimal::from(elapsed_ms) / Decimal::from(MILLIS_PER_HOUR);
    SubScore::Measured(age_level(hours))
}

pub fn age_level(hours: Decimal) -> Decimal {
    if hours <= dec!(1) {
        dec!(1.0)
    } else if hours <= dec!(6) {
        dec!(0.8)
    } else if hours <= dec!(24) {
        dec!(0.6)
    } else {
        dec!(0.3)
    }
}

/// Keyword hits across symbol and name, 0.2 per keyword, capped at 1.0.
pub fn social(pair: &PairData) -> Decimal {
    let symbol = pair.base_token_symbol.as_deref().unwrap_or("").to_lowercase();
    let name = pair.base_token_name.as_deref().unwrap_or("").to_lowercase();

    let matches = SOCIAL_KEYWORDS
        .iter()
        .filter(|kw| symbol.contains(*kw) || name.contains(*kw))
        .count();

    (Decimal::from(matches) * dec!(0.2)).min(Decimal::ONE)
}
