//! Batch ranking
//!
//! Prices every market of a run independently, collects the records and the
//! skips, then sorts once all results are in.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::devig::devig_market;
use super::edge::EdgeCalculator;
use super::kelly::KellyStaker;
use super::risk::RiskClassifier;
use crate::config::PipelineConfig;
use crate::error::EdgeError;
use crate::models::{EdgeRecord, Market, MarketKey, ModelEstimate, RankingBatch, SkippedMarket};

/// Model estimates addressed by market
pub type EstimateMap = HashMap<MarketKey, ModelEstimate>;

/// Rank a batch with the given configuration
pub fn rank(
    markets: &[Market],
    estimates: &EstimateMap,
    config: &PipelineConfig,
) -> Result<RankingBatch, EdgeError> {
    MarketRanker::new(*config).rank(markets, estimates)
}

/// Runs the pricing pipeline over a batch of markets
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketRanker {
    config: PipelineConfig,
    edge: EdgeCalculator,
    risk: RiskClassifier,
    kelly: KellyStaker,
}

impl MarketRanker {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            edge: EdgeCalculator::new(config.line_sensitivity),
            risk: RiskClassifier::new(config.risk),
            kelly: KellyStaker::new(config.kelly),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Price a single market against its model estimate
    pub fn price_market(
        &self,
        market: &Market,
        estimates: &EstimateMap,
    ) -> Result<EdgeRecord, EdgeError> {
        let estimate = estimates
            .get(&market.key)
            .ok_or_else(|| EdgeError::MissingModelEstimate {
                market: market.key.to_string(),
            })?;

        let mut seen = HashSet::with_capacity(market.quotes.len());
        if let Some(dup) = market.quotes.iter().find(|q| !seen.insert(q.side)) {
            return Err(EdgeError::IncompatibleMarketType {
                reason: format!("{} is quoted twice", dup.side.label()),
            });
        }

        let implied = market
            .quotes
            .iter()
            .map(|q| q.implied_probability())
            .collect::<Result<Vec<_>, _>>()?;
        let devigged = devig_market(&implied)?;

        let outcome = self.edge.evaluate(market, &devigged, estimate)?;
        let quote = &market.quotes[outcome.quote_index];
        let risk = self
            .risk
            .classify(market.key.market_type.pricing_mode(), outcome.diff);
        let kelly_pct = self.kelly.stake_pct(outcome.model_probability, quote.american)?;

        debug!(
            market = %market.key,
            book = %market.book,
            edge = outcome.edge,
            kelly_pct,
            "priced market"
        );

        Ok(EdgeRecord {
            market: market.key.clone(),
            book: market.book.clone(),
            side: outcome.side,
            american: quote.american,
            line: market.line,
            implied,
            devigged,
            model_probability: outcome.model_probability,
            book_probability: outcome.book_probability,
            fair_value: outcome.fair_value,
            book_value: outcome.book_value,
            diff: outcome.diff,
            edge: outcome.edge,
            risk,
            kelly_pct,
        })
    }

    /// Price and order a whole batch
    ///
    /// Per-market failures become skips. An invalid configuration or a market
    /// without any quotes fails the call, since the input itself is then
    /// malformed.
    pub fn rank(
        &self,
        markets: &[Market],
        estimates: &EstimateMap,
    ) -> Result<RankingBatch, EdgeError> {
        self.config
            .validate()
            .map_err(|e| EdgeError::InvalidConfig {
                reason: e.to_string(),
            })?;

        if let Some(empty) = markets.iter().find(|m| m.quotes.is_empty()) {
            return Err(EdgeError::MalformedBatch {
                reason: format!("{} at {} has no quotes", empty.key, empty.book),
            });
        }

        let results: Vec<(usize, Result<EdgeRecord, EdgeError>)> = markets
            .par_iter()
            .enumerate()
            .map(|(idx, market)| (idx, self.price_market(market, estimates)))
            .collect();

        let mut ranked: Vec<(usize, EdgeRecord)> = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();

        for (idx, result) in results {
            match result {
                Ok(record) => ranked.push((idx, record)),
                Err(error) => {
                    let market = &markets[idx];
                    warn!(
                        market = %market.key,
                        book = %market.book,
                        "skipping market: {}",
                        error
                    );
                    skipped.push(SkippedMarket {
                        market: market.key.clone(),
                        book: market.book.clone(),
                        error,
                    });
                }
            }
        }

        ranked.sort_by(|(ia, a), (ib, b)| {
            b.edge
                .abs()
                .total_cmp(&a.edge.abs())
                .then(a.risk.cmp(&b.risk))
                .then(ia.cmp(ib))
        });

        info!(
            "Ranked {} markets ({} skipped)",
            ranked.len(),
            skipped.len()
        );

        Ok(RankingBatch {
            records: ranked.into_iter().map(|(_, r)| r).collect(),
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketType, OddsQuote, RiskTier, Side};

    fn two_way(game: &str, market_type: MarketType, line: Option<f64>, a: i32, b: i32) -> Market {
        let (sa, sb) = match market_type {
            MarketType::Moneyline | MarketType::Spread => (Side::Home, Side::Away),
            _ => (Side::Over, Side::Under),
        };
        Market {
            key: MarketKey::new(game, market_type),
            book: "DK".to_string(),
            line,
            quotes: vec![OddsQuote::new(sa, a, "DK"), OddsQuote::new(sb, b, "DK")],
        }
    }

    fn ml_estimate(game: &str, p: f64) -> (MarketKey, ModelEstimate) {
        (
            MarketKey::new(game, MarketType::Moneyline),
            ModelEstimate::probability(Side::Home, p),
        )
    }

    #[test]
    fn test_scenario_edge_and_tier() {
        let markets = vec![two_way("g1", MarketType::Moneyline, None, -110, -110)];
        let estimates: EstimateMap = [ml_estimate("g1", 0.55)].into_iter().collect();

        let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        let record = &batch.records[0];
        assert!((record.book_probability - 0.5).abs() < 1e-12);
        assert!((record.edge - 0.05).abs() < 1e-9);
        assert_eq!(record.risk, RiskTier::Med);
        assert!((record.kelly_pct - 1.0).abs() < 1e-12);

        let estimates: EstimateMap = [ml_estimate("g1", 0.56)].into_iter().collect();
        let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        assert_eq!(batch.records[0].risk, RiskTier::High);
    }

    #[test]
    fn test_negative_kelly_is_a_record_not_a_skip() {
        let markets = vec![two_way("g1", MarketType::Moneyline, None, -110, -110)];
        let estimates: EstimateMap = [ml_estimate("g1", 0.40)].into_iter().collect();

        let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].kelly_pct, 0.0);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn test_missing_estimate_is_skipped() {
        let markets = vec![
            two_way("g1", MarketType::Moneyline, None, -110, -110),
            two_way("g2", MarketType::Moneyline, None, -150, 130),
            two_way("g3", MarketType::Moneyline, None, 120, -140),
        ];
        let estimates: EstimateMap = [ml_estimate("g1", 0.53), ml_estimate("g3", 0.48)]
            .into_iter()
            .collect();

        let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].market.game_id, "g2");
        assert!(matches!(
            batch.skipped[0].error,
            EdgeError::MissingModelEstimate { .. }
        ));
    }

    #[test]
    fn test_bad_market_does_not_abort_batch() {
        let markets = vec![
            two_way("g1", MarketType::Moneyline, None, -110, 50),
            two_way("g2", MarketType::Moneyline, None, -110, -110),
        ];
        let estimates: EstimateMap = [ml_estimate("g1", 0.5), ml_estimate("g2", 0.52)]
            .into_iter()
            .collect();

        let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped[0].error, EdgeError::InvalidOdds { odds: 50 });
    }

    #[test]
    fn test_single_quote_market_is_skipped() {
        let mut market = two_way("g1", MarketType::Moneyline, None, -110, -110);
        market.quotes.truncate(1);
        let estimates: EstimateMap = [ml_estimate("g1", 0.5)].into_iter().collect();

        let batch = rank(&[market], &estimates, &PipelineConfig::default()).unwrap();
        assert_eq!(
            batch.skipped[0].error,
            EdgeError::InsufficientMarket { quotes: 1 }
        );
    }

    #[test]
    fn test_invalid_config_fails_batch() {
        let markets = vec![two_way("g1", MarketType::Moneyline, None, -110, -110)];
        let estimates: EstimateMap = [ml_estimate("g1", 0.56)].into_iter().collect();

        for cap_pct in [-1.0, f64::NAN] {
            let mut config = PipelineConfig::default();
            config.kelly.cap_pct = cap_pct;
            let err = rank(&markets, &estimates, &config).unwrap_err();
            assert!(matches!(err, EdgeError::InvalidConfig { .. }));
            assert_eq!(err.kind(), "invalid_config");
        }
    }

    #[test]
    fn test_underround_market_rejected() {
        let markets = vec![two_way("g1", MarketType::Moneyline, None, 120, 120)];
        let estimates: EstimateMap = [ml_estimate("g1", 0.5)].into_iter().collect();

        let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        assert!(batch.records.is_empty());
        assert!(matches!(
            batch.skipped[0].error,
            EdgeError::UnderroundMarket { .. }
        ));
    }

    #[test]
    fn test_empty_market_is_fatal() {
        let mut market = two_way("g1", MarketType::Moneyline, None, -110, -110);
        market.quotes.clear();

        let err = rank(&[market], &EstimateMap::new(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, EdgeError::MalformedBatch { .. }));
    }

    #[test]
    fn test_duplicate_side_skipped() {
        let mut market = two_way("g1", MarketType::Moneyline, None, -110, -110);
        market.quotes[1].side = Side::Home;
        let estimates: EstimateMap = [ml_estimate("g1", 0.5)].into_iter().collect();

        let batch = rank(&[market], &estimates, &PipelineConfig::default()).unwrap();
        assert!(matches!(
            batch.skipped[0].error,
            EdgeError::IncompatibleMarketType { .. }
        ));
    }

    #[test]
    fn test_sorted_by_edge_magnitude() {
        let markets = vec![
            two_way("g1", MarketType::Moneyline, None, -110, -110),
            two_way("g2", MarketType::Moneyline, None, -110, -110),
            two_way("g3", MarketType::Moneyline, None, -110, -110),
        ];
        let estimates: EstimateMap = [
            ml_estimate("g1", 0.51),
            ml_estimate("g2", 0.42),
            ml_estimate("g3", 0.54),
        ]
        .into_iter()
        .collect();

        let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        let order: Vec<&str> = batch
            .records
            .iter()
            .map(|r| r.market.game_id.as_str())
            .collect();
        assert_eq!(order, vec!["g2", "g3", "g1"]);
    }

    #[test]
    fn test_ties_break_on_risk_then_input_order() {
        // All three carry a 0.1 edge: the spread is Med on its 1 point gap,
        // both moneylines are High.
        let spread = two_way("g1", MarketType::Spread, Some(-3.5), -110, -110);
        let ml_a = two_way("g2", MarketType::Moneyline, None, -110, -110);
        let ml_b = two_way("g3", MarketType::Moneyline, None, -110, -110);

        let mut config = PipelineConfig::default();
        config.risk.line.medium = 5.0;
        let estimates: EstimateMap = [
            (
                MarketKey::new("g1", MarketType::Spread),
                ModelEstimate::fair_line(Side::Home, -4.5),
            ),
            ml_estimate("g2", 0.6),
            ml_estimate("g3", 0.6),
        ]
        .into_iter()
        .collect();

        let batch = rank(&[ml_a, spread, ml_b], &estimates, &config).unwrap();
        let order: Vec<(&str, RiskTier)> = batch
            .records
            .iter()
            .map(|r| (r.market.game_id.as_str(), r.risk))
            .collect();
        assert_eq!(
            order,
            vec![
                ("g1", RiskTier::Med),
                ("g2", RiskTier::High),
                ("g3", RiskTier::High)
            ]
        );
    }

    #[test]
    fn test_parallel_map_is_deterministic() {
        let markets: Vec<Market> = (0..200)
            .map(|i| two_way(&format!("g{}", i), MarketType::Moneyline, None, -110, -110))
            .collect();
        let estimates: EstimateMap = (0..200)
            .filter(|i| i % 7 != 0)
            .map(|i| ml_estimate(&format!("g{}", i), 0.45 + (i % 10) as f64 * 0.01))
            .collect();

        let first = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        let second = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.skipped, second.skipped);
        assert_eq!(first.skipped.len(), 29);
    }
}
