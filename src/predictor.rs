//! Fallback projection model
//!
//! Used when no external model feed is supplied. Team and player ratings are
//! synthesized deterministically from names, so a replay always prices the
//! same way.

use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::HashSet;
use tracing::debug;

use crate::core::ranker::EstimateMap;
use crate::models::{GameOdds, MarketKey, MarketType, ModelEstimate, Side};

/// Home win probability bounds for the spread-to-moneyline conversion
const MIN_HOME_PROBABILITY: f64 = 0.05;
const MAX_HOME_PROBABILITY: f64 = 0.95;
/// Prop outcome spread: std = max(1.5, 0.18 × mean)
const MIN_PROP_STD: f64 = 1.5;
const PROP_STD_RATIO: f64 = 0.18;
const PROP_PROBABILITY_FLOOR: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamRatings {
    pub pace: f64,
    pub offensive_rating: f64,
    pub defensive_rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerRatings {
    pub minutes: f64,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub threes: f64,
}

/// Projected outcome of one game
#[derive(Debug, Clone, PartialEq)]
pub struct GameProjection {
    pub game_id: String,
    pub home_score: f64,
    pub away_score: f64,
    pub fair_ml_home: f64,
    /// Home margin
    pub fair_spread: f64,
    pub fair_total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropProjection {
    pub market: MarketKey,
    pub mean: f64,
    pub over_probability: f64,
}

fn name_seed(name: &str, modulus: u32) -> f64 {
    let sum: u32 = name.chars().map(|c| c as u32).sum();
    (sum % modulus) as f64
}

pub fn team_ratings(team: &str) -> TeamRatings {
    let base = name_seed(team, 10);
    TeamRatings {
        pace: 95.0 + base,
        offensive_rating: 108.0 + base * 0.7,
        defensive_rating: 105.0 - base * 0.5,
    }
}

pub fn player_ratings(player: &str) -> PlayerRatings {
    let base = name_seed(player, 12);
    PlayerRatings {
        minutes: 28.0 + base,
        points: 15.0 + base * 0.8,
        rebounds: 5.0 + base * 0.3,
        assists: 4.0 + base * 0.25,
        threes: 1.5 + base * 0.1,
    }
}

/// One-line team description for the summary sheet
pub fn team_card(team: &str) -> String {
    let ratings = team_ratings(team);
    format!("Pace {:.1}, ORtg {:.1}", ratings.pace, ratings.offensive_rating)
}

/// Expected stat line against an opponent; unknown stats fall back to points
pub fn project_player_mean(player: &PlayerRatings, opponent: &TeamRatings, stat: &str) -> f64 {
    match stat {
        "points" => player.points * (opponent.pace / 100.0),
        "rebounds" => player.rebounds * (100.0 / opponent.defensive_rating),
        "assists" => player.assists * (opponent.pace / 98.0),
        "threes" => player.threes * (opponent.pace / 100.0),
        "pra" => ["points", "rebounds", "assists"]
            .iter()
            .map(|s| project_player_mean(player, opponent, s))
            .sum(),
        _ => player.points,
    }
}

/// Probability that a normally distributed stat finishes above `line`
pub fn over_probability(mean: f64, line: f64) -> Option<f64> {
    let std = MIN_PROP_STD.max(mean * PROP_STD_RATIO);
    let dist = Normal::new(mean, std).ok()?;
    let p = 1.0 - dist.cdf(line);
    p.is_finite()
        .then(|| p.clamp(PROP_PROBABILITY_FLOOR, 1.0 - PROP_PROBABILITY_FLOOR))
}

/// Name-seeded ratings model
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackModel;

impl FallbackModel {
    pub fn new() -> Self {
        Self
    }

    pub fn project_game(&self, game: &GameOdds) -> GameProjection {
        let home = team_ratings(&game.home);
        let away = team_ratings(&game.away);
        let pace_factor = (home.pace + away.pace) / 2.0 / 100.0;

        let home_score = 100.0 + (home.offensive_rating - away.defensive_rating) * pace_factor;
        let away_score = 100.0 + (away.offensive_rating - home.defensive_rating) * pace_factor;
        let fair_spread = home_score - away_score;

        GameProjection {
            game_id: game.game_id.clone(),
            home_score,
            away_score,
            fair_ml_home: (0.5 + fair_spread / 20.0)
                .clamp(MIN_HOME_PROBABILITY, MAX_HOME_PROBABILITY),
            fair_spread,
            fair_total: home_score + away_score,
        }
    }

    /// Project every distinct prop market quoted for `game`
    ///
    /// The player's team is not known from the odds feed, so the home side
    /// stands in as the opponent.
    pub fn project_props(&self, game: &GameOdds) -> Vec<PropProjection> {
        let opponent = team_ratings(&game.home);
        let mut seen = HashSet::new();

        game.markets
            .iter()
            .filter(|m| m.key.market_type == MarketType::PlayerProp)
            .filter_map(|m| {
                let player = m.key.player.as_deref()?;
                let stat = m.key.stat.as_deref()?;
                let line = m.line?;
                if !seen.insert((&m.key, line.to_bits())) {
                    return None;
                }
                let mean = project_player_mean(&player_ratings(player), &opponent, stat);
                Some(PropProjection {
                    market: m.key.clone(),
                    mean,
                    over_probability: over_probability(mean, line)?,
                })
            })
            .collect()
    }

    /// Model estimates for every market of every game
    pub fn estimates(&self, games: &[GameOdds]) -> EstimateMap {
        let mut estimates = EstimateMap::new();

        for game in games {
            let projection = self.project_game(game);
            debug!(
                "{}: {:.1}-{:.1}, home p={:.3}",
                game.game_id, projection.home_score, projection.away_score, projection.fair_ml_home
            );

            estimates.insert(
                MarketKey::new(&game.game_id, MarketType::Moneyline),
                ModelEstimate::probability(Side::Home, projection.fair_ml_home),
            );
            estimates.insert(
                MarketKey::new(&game.game_id, MarketType::Spread),
                ModelEstimate::fair_line(Side::Home, -projection.fair_spread),
            );
            estimates.insert(
                MarketKey::new(&game.game_id, MarketType::Total),
                ModelEstimate::fair_line(Side::Over, projection.fair_total),
            );

            for prop in self.project_props(game) {
                estimates.entry(prop.market).or_insert_with(|| {
                    ModelEstimate::probability(Side::Over, prop.over_probability)
                });
            }
        }

        estimates
    }
}
