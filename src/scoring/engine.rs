//! Weighted scoring of DEX pairs into BUY/SELL/HOLD signals.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{AnalysisResult, Decision, PairData};

use super::sub_score::{self, ScoringFault, SubScore};

/// Relative weight of each sub-score in the final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub liquidity: Decimal,
    pub momentum: Decimal,
    pub volume: Decimal,
    pub age: Decimal,
    pub social: Decimal,
}

impl ScoreWeights {
    /// Sum of all weights.
    pub fn total(&self) -> Decimal {
        self.combine([Decimal::ONE; 5])
    }

    /// Weighted sum of sub-scores given as
    /// `[liquidity, momentum, volume, age, social]`.
    pub fn combine(&self, scores: [Decimal; 5]) -> Decimal {
        let [liquidity, momentum, volume, age, social] = scores;

        liquidity * self.liquidity
            + momentum * self.momentum
            + volume * self.volume
            + age * self.age
            + social * self.social
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            liquidity: dec!(0.30),
            momentum: dec!(0.25),
            volume: dec!(0.20),
            age: dec!(0.15),
            social: dec!(0.10),
        }
    }
}

/// Stateless pair scorer.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub const BUY_THRESHOLD: Decimal = Decimal::from_parts(7, 0, 0, false, 1);
    pub const SELL_THRESHOLD: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score a pair against the current wall clock.
    pub fn analyze(&self, pair: &PairData) -> AnalysisResult {
        self.analyze_at(pair, Utc::now())
    }

    /// Score a pair, measuring its age relative to `now`.
    ///
    /// Never fails. A fault in liquidity stops accumulation and the partial
    /// score is returned with an `Analysis error` reason, HOLD and zero
    /// confidence.
    pub fn analyze_at(&self, pair: &PairData, now: DateTime<Utc>) -> AnalysisResult {
        let mut analysis = AnalysisResult::empty();

        if let Err(fault) = self.accumulate(pair, now, &mut analysis) {
            warn!(
                pair = %pair.display_name(),
                error = %fault,
                partial_score = %analysis.score,
                "Analysis aborted"
            );
            analysis.reasons.push(format!("Analysis error: {}", fault));
            return analysis;
        }

        analysis.confidence = analysis.score;
        analysis.decision = Self::decide(analysis.score);
        analysis
    }

    /// Score several pairs and order them best first.
    pub fn rank<'a>(
        &self,
        pairs: &'a [PairData],
        now: DateTime<Utc>,
    ) -> Vec<(&'a PairData, AnalysisResult)> {
        let mut ranked: Vec<_> = pairs
            .iter()
            .map(|pair| (pair, self.analyze_at(pair, now)))
            .collect();
        ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        ranked
    }

    /// Map a final score onto a decision; both thresholds are inclusive.
    pub fn decide(score: Decimal) -> Decision {
        if score >= Self::BUY_THRESHOLD {
            Decision::Buy
        } else if score <= Self::SELL_THRESHOLD {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }

    fn accumulate(
        &self,
        pair: &PairData,
        now: DateTime<Utc>,
        analysis: &mut AnalysisResult,
    ) -> Result<(), ScoringFault> {
        // 1. Liquidity
        let (liquidity_usd, liquidity) = sub_score::liquidity(pair)?;
        if liquidity > dec!(0.7) {
            analysis
                .reasons
                .push(format!("Good liquidity: ${}", format_usd(liquidity_usd)));
        }

        // 2. Momentum
        let momentum = sub_score::momentum(pair);
        note_fallback("Momentum", &momentum, analysis);
        if momentum.value() > dec!(0.7) {
            analysis.reasons.push("Strong positive momentum".to_string());
        }

        // 3. Volume
        let volume = sub_score::volume(pair);
        note_fallback("Volume", &volume, analysis);
        if volume.value() > dec!(0.6) {
            analysis.reasons.push("High trading volume".to_string());
        }

        // 4. Age
        let age = sub_score::age(pair, now);
        note_fallback("Age", &age, analysis);
        if age.value() > dec!(0.8) {
            analysis.reasons.push("Fresh token launch".to_string());
        }

        // 5. Social
        let social = sub_score::social(pair);

        analysis.score = self.weights.combine([
            liquidity,
            momentum.value(),
            volume.value(),
            age.value(),
            social,
        ]);
        Ok(())
    }
}

fn note_fallback(label: &str, score: &SubScore, analysis: &mut AnalysisResult) {
    if let Some(fault) = score.fault() {
        debug!(sub_score = label, fallback = %score.value(), error = %fault, "Sub-score fallback");
        analysis.reasons.push(format!(
            "{} defaulted to {}: {}",
            label,
            score.value(),
            fault
        ));
    }
}

/// Format a dollar amount with thousands separators and no decimals.
pub fn format_usd(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn pair(
        liquidity: f64,
        change: f64,
        volume: f64,
        age: Option<Duration>,
        symbol: &str,
        name: &str,
    ) -> PairData {
        PairData {
            liquidity_usd: Some(liquidity),
            price_change_h24: Some(change),
            volume_h24_usd: Some(volume),
            pair_created_at_millis: age.map(|a| (now() - a).timestamp_millis()),
            base_token_symbol: Some(symbol.to_string()),
            base_token_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert_eq!(ScoreWeights::default().total(), Decimal::ONE);
    }

    #[test]
    fn test_perfect_sub_scores_combine_to_a_buy() {
        let engine = ScoringEngine::new();

        let score = engine.weights().combine([Decimal::ONE; 5]);
        assert_eq!(score, Decimal::ONE);
        assert_eq!(ScoringEngine::decide(score), Decision::Buy);

        let floor = engine.weights().combine([dec!(0.2), dec!(0.1), dec!(0.2), dec!(0.3), dec!(0)]);
        // 0.06 + 0.025 + 0.04 + 0.045
        assert_eq!(floor, dec!(0.17));
    }

    #[test]
    fn test_analyze_without_timestamp_ignores_clock() {
        let engine = ScoringEngine::new();
        let p = pair(60000.0, 0.6, 2_000_000.0, None, "PEPE", "Moon Pepe");

        let result = engine.analyze(&p);

        // 0.3 + 0.225 + 0.2 + 0.075 + 0.04
        assert_eq!(result.score, dec!(0.84));
        assert_eq!(result.decision, Decision::Buy);
        assert_eq!(result, engine.analyze_at(&p, now()));
    }

    #[test]
    fn test_huge_liquidity_scores_top_bucket() {
        let engine = ScoringEngine::new();
        let mut p = pair(60000.0, 0.6, 2_000_000.0, None, "PEPE", "Moon Pepe");
        let baseline = engine.analyze_at(&p, now());

        p.liquidity_usd = Some(1e29);
        let result = engine.analyze_at(&p, now());

        assert_eq!(result.score, baseline.score);
        assert_eq!(result.decision, Decision::Buy);
        assert!(!result.reasons.iter().any(|r| r.starts_with("Analysis error")));
    }

    #[test]
    fn test_decision_boundaries() {
        assert_eq!(ScoringEngine::decide(dec!(0.7)), Decision::Buy);
        assert_eq!(ScoringEngine::decide(dec!(0.3)), Decision::Sell);
        assert_eq!(ScoringEngine::decide(dec!(0.5)), Decision::Hold);
        assert_eq!(ScoringEngine::decide(dec!(0.6999)), Decision::Hold);
        assert_eq!(ScoringEngine::decide(dec!(0.3001)), Decision::Hold);
    }

    #[test]
    fn test_strong_fresh_pair_is_a_buy() {
        let engine = ScoringEngine::new();
        let p = pair(60000.0, 0.6, 2_000_000.0, Some(Duration::minutes(30)), "PEPE", "Moon Pepe");

        let result = engine.analyze_at(&p, now());

        // 0.3 + 0.225 + 0.2 + 0.15 + 0.04
        assert_eq!(result.score, dec!(0.915));
        assert_eq!(result.confidence, result.score);
        assert_eq!(result.decision, Decision::Buy);
        assert_eq!(
            result.reasons,
            vec![
                "Good liquidity: $60,000".to_string(),
                "Strong positive momentum".to_string(),
                "High trading volume".to_string(),
                "Fresh token launch".to_string(),
            ]
        );
    }

    #[test]
    fn test_score_of_exactly_buy_threshold() {
        let engine = ScoringEngine::new();
        // 0.3 + 0.175 + 0.16 + 0.045 + 0.02
        let p = pair(50000.0, 0.3, 600_000.0, Some(Duration::hours(48)), "DOGE2", "Two");

        let result = engine.analyze_at(&p, now());
        assert_eq!(result.score, dec!(0.7));
        assert_eq!(result.decision, Decision::Buy);
        assert_eq!(
            result.reasons,
            vec![
                "Good liquidity: $50,000".to_string(),
                "High trading volume".to_string(),
            ]
        );
    }

    #[test]
    fn test_score_of_exactly_sell_threshold() {
        let engine = ScoringEngine::new();
        // 0.06 + 0.075 + 0.04 + 0.045 + 0.08
        let p = pair(1000.0, -0.05, 10_000.0, Some(Duration::hours(48)), "ELONMOON", "Doge Shib Inu");

        let result = engine.analyze_at(&p, now());
        assert_eq!(result.score, dec!(0.3));
        assert_eq!(result.decision, Decision::Sell);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_empty_pair_uses_defaults() {
        let engine = ScoringEngine::new();
        let result = engine.analyze_at(&PairData::default(), now());

        // liquidity 0.2, momentum 0.3, volume 0.2, age 0.5, social 0
        // 0.06 + 0.075 + 0.04 + 0.075 + 0
        assert_eq!(result.score, dec!(0.25));
        assert_eq!(result.decision, Decision::Sell);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_sub_score_fault_is_recorded_and_recovered() {
        let engine = ScoringEngine::new();
        let mut p = pair(1000.0, 0.0, 10_000.0, None, "X", "Y");
        p.price_change_h24 = Some(f64::NAN);

        let result = engine.analyze_at(&p, now());

        // 0.06 + 0.5*0.25 + 0.04 + 0.075
        assert_eq!(result.score, dec!(0.3));
        assert_eq!(result.decision, Decision::Sell);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].starts_with("Momentum defaulted to 0.5"));
    }

    #[test]
    fn test_liquidity_fault_returns_partial_result() {
        let engine = ScoringEngine::new();
        let mut p = pair(60000.0, 0.6, 2_000_000.0, None, "PEPE", "Pepe");
        p.liquidity_usd = Some(f64::NAN);

        let result = engine.analyze_at(&p, now());

        assert_eq!(result.score, Decimal::ZERO);
        assert_eq!(result.decision, Decision::Hold);
        assert_eq!(result.confidence, Decimal::ZERO);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].starts_with("Analysis error:"));
    }

    #[test]
    fn test_rank_orders_best_first() {
        let engine = ScoringEngine::new();
        let pairs = vec![
            pair(1000.0, -0.5, 100.0, None, "DUD", "Dud"),
            pair(60000.0, 0.6, 2_000_000.0, Some(Duration::minutes(5)), "PEPE", "Pepe"),
            pair(12000.0, 0.1, 200_000.0, Some(Duration::hours(3)), "MID", "Mid"),
        ];

        let ranked = engine.rank(&pairs, now());
        let symbols: Vec<_> = ranked
            .iter()
            .map(|(p, _)| p.base_token_symbol.clone().unwrap_or_default())
            .collect();
        assert_eq!(symbols, vec!["PEPE", "MID", "DUD"]);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec!(0)), "0");
        assert_eq!(format_usd(dec!(999.4)), "999");
        assert_eq!(format_usd(dec!(25000)), "25,000");
        assert_eq!(format_usd(dec!(1234567.5)), "1,234,568");
        assert_eq!(format_usd(dec!(-1500)), "-1,500");
    }
}
