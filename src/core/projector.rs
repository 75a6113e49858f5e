//! Game summary aggregation
//!
//! Folds a game's per-market fair values back into one projection: fair
//! moneyline, home margin, total, and the projected score implied by margin
//! and total together.

use super::odds::to_american_odds;
use super::ranker::EstimateMap;
use crate::models::{
    GameOdds, GameSummary, MarketKey, MarketType, ModelValue, RankingBatch, Side,
};

fn estimate_value(
    estimates: &EstimateMap,
    game_id: &str,
    market_type: MarketType,
) -> Option<(Side, ModelValue)> {
    estimates
        .get(&MarketKey::new(game_id, market_type))
        .map(|e| (e.side, e.value))
}

/// Home win probability from the moneyline estimate
fn fair_home_probability(estimates: &EstimateMap, game_id: &str) -> Option<f64> {
    match estimate_value(estimates, game_id, MarketType::Moneyline)? {
        (Side::Home, ModelValue::Probability(p)) => Some(p),
        (Side::Away, ModelValue::Probability(p)) => Some(1.0 - p),
        _ => None,
    }
    .filter(|p| *p > 0.0 && *p < 1.0)
}

/// Home margin from the spread estimate (fair home handicap, negated)
fn fair_home_margin(estimates: &EstimateMap, game_id: &str) -> Option<f64> {
    match estimate_value(estimates, game_id, MarketType::Spread)? {
        (_, ModelValue::FairLine(handicap)) => Some(-handicap),
        _ => None,
    }
}

fn fair_total(estimates: &EstimateMap, game_id: &str) -> Option<f64> {
    match estimate_value(estimates, game_id, MarketType::Total)? {
        (Side::Over | Side::Under, ModelValue::FairLine(total)) => Some(total),
        _ => None,
    }
}

/// Builds the per-game summary view
#[derive(Debug, Clone, Copy, Default)]
pub struct GameProjector;

impl GameProjector {
    pub fn project(
        &self,
        game: &GameOdds,
        estimates: &EstimateMap,
        batch: &RankingBatch,
    ) -> GameSummary {
        let fair_ml_home = fair_home_probability(estimates, &game.game_id);
        let fair_ml_away = fair_ml_home.map(|p| 1.0 - p);
        let fair_spread = fair_home_margin(estimates, &game.game_id);
        let fair_total = fair_total(estimates, &game.game_id);

        let (projected_home, projected_away) = match (fair_spread, fair_total) {
            (Some(margin), Some(total)) => {
                (Some((total + margin) / 2.0), Some((total - margin) / 2.0))
            }
            _ => (None, None),
        };

        let mut game_records = batch.records_for_game(&game.game_id);
        // records are already ranked, so the first one carries the top edge
        let top_edge = game_records.next().map(|r| r.edge);
        let ranked_markets = top_edge.map_or(0, |_| 1 + game_records.count());

        GameSummary {
            game_id: game.game_id.clone(),
            matchup: game.matchup(),
            projected_home,
            projected_away,
            fair_ml_home,
            fair_ml_away,
            fair_odds_home: fair_ml_home.and_then(|p| to_american_odds(p).ok()),
            fair_odds_away: fair_ml_away.and_then(|p| to_american_odds(p).ok()),
            fair_spread,
            fair_total,
            ranked_markets,
            top_edge,
        }
    }

    pub fn project_all(
        &self,
        games: &[GameOdds],
        estimates: &EstimateMap,
        batch: &RankingBatch,
    ) -> Vec<GameSummary> {
        games
            .iter()
            .map(|game| self.project(game, estimates, batch))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::core::ranker::rank;
    use crate::models::{Market, ModelEstimate, OddsQuote};
    use chrono::NaiveDate;

    fn game() -> GameOdds {
        GameOdds {
            game_id: "bos-nyk".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 24).unwrap(),
            home: "New York Knicks".to_string(),
            away: "Boston Celtics".to_string(),
            markets: vec![Market {
                key: MarketKey::new("bos-nyk", MarketType::Moneyline),
                book: "DK".to_string(),
                line: None,
                quotes: vec![
                    OddsQuote::new(Side::Home, 150, "DK"),
                    OddsQuote::new(Side::Away, -170, "DK"),
                ],
            }],
        }
    }

    fn estimates() -> EstimateMap {
        [
            (
                MarketKey::new("bos-nyk", MarketType::Moneyline),
                ModelEstimate::probability(Side::Home, 0.4),
            ),
            (
                MarketKey::new("bos-nyk", MarketType::Spread),
                ModelEstimate::fair_line(Side::Home, 4.0),
            ),
            (
                MarketKey::new("bos-nyk", MarketType::Total),
                ModelEstimate::fair_line(Side::Over, 224.0),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_project_full_game() {
        let game = game();
        let estimates = estimates();
        let batch = rank(&game.markets, &estimates, &PipelineConfig::default()).unwrap();

        let summary = GameProjector.project(&game, &estimates, &batch);
        assert_eq!(summary.matchup, "Boston Celtics @ New York Knicks");
        assert_eq!(summary.fair_spread, Some(-4.0));
        assert_eq!(summary.projected_home, Some(110.0));
        assert_eq!(summary.projected_away, Some(114.0));
        assert_eq!(summary.fair_odds_home, Some(150));
        assert_eq!(summary.fair_odds_away, Some(-150));
        assert_eq!(summary.ranked_markets, 1);
        assert!(summary.top_edge.is_some());
    }

    #[test]
    fn test_project_without_estimates() {
        let game = game();
        let summary = GameProjector.project(&game, &EstimateMap::new(), &RankingBatch::default());
        assert_eq!(summary.fair_ml_home, None);
        assert_eq!(summary.projected_home, None);
        assert_eq!(summary.ranked_markets, 0);
        assert_eq!(summary.top_edge, None);
    }

    #[test]
    fn test_away_side_estimates_flip() {
        let game = game();
        let estimates: EstimateMap = [
            (
                MarketKey::new("bos-nyk", MarketType::Moneyline),
                ModelEstimate::probability(Side::Away, 0.7),
            ),
            (
                MarketKey::new("bos-nyk", MarketType::Spread),
                ModelEstimate::fair_line(Side::Away, -6.0),
            ),
        ]
        .into_iter()
        .collect();

        let summary = GameProjector.project(&game, &estimates, &RankingBatch::default());
        assert!((summary.fair_ml_home.unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(summary.fair_spread, Some(6.0));
        assert_eq!(summary.projected_home, None);
    }
}
