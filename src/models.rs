use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PipelineConfig;
use crate::core::odds::to_implied_probability;
use crate::error::EdgeError;

/// Market type as quoted by a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Moneyline,
    Spread,
    Total,
    PlayerProp,
}

/// How a market is priced, which decides the edge formula and risk table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    Probability,
    Line,
}

impl MarketType {
    pub fn pricing_mode(self) -> PricingMode {
        match self {
            MarketType::Moneyline | MarketType::PlayerProp => PricingMode::Probability,
            MarketType::Spread | MarketType::Total => PricingMode::Line,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketType::Moneyline => "ML",
            MarketType::Spread => "Spread",
            MarketType::Total => "Total",
            MarketType::PlayerProp => "Prop",
        }
    }

    /// Parse a replay fixture market key ("ml", "spread", "total")
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "ml" | "moneyline" | "h2h" => Some(MarketType::Moneyline),
            "spread" | "spreads" => Some(MarketType::Spread),
            "total" | "totals" => Some(MarketType::Total),
            _ => None,
        }
    }
}

/// Side label of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
    Over,
    Under,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
            Side::Over => "Over",
            Side::Under => "Under",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "home" => Some(Side::Home),
            "away" => Some(Side::Away),
            "over" => Some(Side::Over),
            "under" => Some(Side::Under),
            _ => None,
        }
    }
}

/// Identifies a market independently of the book quoting it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketKey {
    pub game_id: String,
    pub market_type: MarketType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
}

impl MarketKey {
    pub fn new(game_id: impl Into<String>, market_type: MarketType) -> Self {
        Self {
            game_id: game_id.into(),
            market_type,
            player: None,
            stat: None,
        }
    }

    pub fn prop(
        game_id: impl Into<String>,
        player: impl Into<String>,
        stat: impl Into<String>,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            market_type: MarketType::PlayerProp,
            player: Some(player.into()),
            stat: Some(stat.into()),
        }
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.game_id, self.market_type.label())?;
        if let Some(player) = &self.player {
            write!(f, " {}", player)?;
        }
        if let Some(stat) = &self.stat {
            write!(f, " {}", stat)?;
        }
        Ok(())
    }
}

/// One side of a market at one book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub side: Side,
    pub american: i32,
    pub book: String,
}

impl OddsQuote {
    pub fn new(side: Side, american: i32, book: impl Into<String>) -> Self {
        Self {
            side,
            american,
            book: book.into(),
        }
    }

    /// Raw (vigged) implied probability of this price
    pub fn implied_probability(&self) -> Result<f64, EdgeError> {
        to_implied_probability(self.american)
    }
}

/// A set of mutually exclusive quotes for one market at one book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub key: MarketKey,
    pub book: String,
    /// Posted line for spread/total/prop markets; spreads carry the home
    /// handicap for both sides (-3.5 means home must win by 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<f64>,
    pub quotes: Vec<OddsQuote>,
}

impl Market {
    pub fn quote(&self, side: Side) -> Option<&OddsQuote> {
        self.quotes.iter().find(|q| q.side == side)
    }

    pub fn position(&self, side: Side) -> Option<usize> {
        self.quotes.iter().position(|q| q.side == side)
    }
}

/// Model output for one side of a market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ModelValue {
    /// Win probability for the side
    Probability(f64),
    /// Fair line in the same convention as the posted line for the side
    FairLine(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub side: Side,
    pub value: ModelValue,
}

impl ModelEstimate {
    pub fn probability(side: Side, probability: f64) -> Self {
        Self {
            side,
            value: ModelValue::Probability(probability),
        }
    }

    pub fn fair_line(side: Side, line: f64) -> Self {
        Self {
            side,
            value: ModelValue::FairLine(line),
        }
    }
}

/// Risk bucket; declaration order is the ranking tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Med,
    High,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Med => "Med",
            RiskTier::High => "High",
        }
    }
}

/// Priced market, one per market per ranking run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub market: MarketKey,
    pub book: String,
    pub side: Side,
    pub american: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<f64>,
    /// Raw implied probabilities of every quote, in quote order
    pub implied: Vec<f64>,
    /// De-vigged probabilities of every quote, in quote order
    pub devigged: Vec<f64>,
    pub model_probability: f64,
    pub book_probability: f64,
    /// Model value in the market's native unit (probability or line)
    pub fair_value: f64,
    /// Book value in the market's native unit (probability or line)
    pub book_value: f64,
    /// Absolute model/market disagreement in the native unit
    pub diff: f64,
    pub edge: f64,
    pub risk: RiskTier,
    pub kelly_pct: f64,
}

/// Market excluded from a batch and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedMarket {
    pub market: MarketKey,
    pub book: String,
    pub error: EdgeError,
}

/// Output of one ranking run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankingBatch {
    pub records: Vec<EdgeRecord>,
    pub skipped: Vec<SkippedMarket>,
}

impl RankingBatch {
    /// (Low, Med, High) record counts
    pub fn risk_counts(&self) -> (usize, usize, usize) {
        self.records
            .iter()
            .fold((0, 0, 0), |(low, med, high), r| match r.risk {
                RiskTier::Low => (low + 1, med, high),
                RiskTier::Med => (low, med + 1, high),
                RiskTier::High => (low, med, high + 1),
            })
    }

    pub fn records_for_game<'a>(
        &'a self,
        game_id: &'a str,
    ) -> impl Iterator<Item = &'a EdgeRecord> {
        self.records
            .iter()
            .filter(move |r| r.market.game_id == game_id)
    }
}

/// Per-game aggregate fair values for the summary view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: String,
    pub matchup: String,
    pub projected_home: Option<f64>,
    pub projected_away: Option<f64>,
    pub fair_ml_home: Option<f64>,
    pub fair_ml_away: Option<f64>,
    pub fair_odds_home: Option<i32>,
    pub fair_odds_away: Option<i32>,
    /// Home margin (home score minus away score)
    pub fair_spread: Option<f64>,
    pub fair_total: Option<f64>,
    pub ranked_markets: usize,
    pub top_edge: Option<f64>,
}

/// One game as delivered by an odds supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOdds {
    pub game_id: String,
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
    pub markets: Vec<Market>,
}

impl GameOdds {
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away, self.home)
    }
}

/// Model estimate addressed by market, as carried over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyedEstimate {
    pub market: MarketKey,
    pub estimate: ModelEstimate,
}

/// Rank request
#[derive(Debug, Serialize, Deserialize)]
pub struct RankRequest {
    pub markets: Vec<Market>,
    pub estimates: Vec<KeyedEstimate>,
    #[serde(default)]
    pub config: Option<PipelineConfig>,
}

/// De-vig request
#[derive(Debug, Serialize, Deserialize)]
pub struct DevigRequest {
    pub odds: Vec<i32>,
}

/// De-vig response
#[derive(Debug, Serialize, Deserialize)]
pub struct DevigResponse {
    pub implied: Vec<f64>,
    pub devigged: Vec<f64>,
    pub overround: f64,
    pub fair_odds: Vec<i32>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
