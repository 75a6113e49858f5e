//! Replay odds JSON loading
//!
//! A fixture holds one game object or an array of them:
//!
//! ```json
//! {
//!   "game_id": "2024-02-24-bos-nyk",
//!   "date": "2024-02-24",
//!   "home": "NYK",
//!   "away": "BOS",
//!   "books": {
//!     "DK": {
//!       "ml": {"home": 140, "away": -160},
//!       "spread": {"line": 3.5, "home": -110, "away": -110},
//!       "total": {"line": 221.5, "over": -108, "under": -112}
//!     }
//!   },
//!   "props": [
//!     {"player": "Jalen Brunson", "market": "points", "line": 27.5,
//!      "over": -115, "under": -105, "book": "DK"}
//!   ]
//! }
//! ```
//!
//! Spread lines are the home handicap.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::mapping::canonical_team;
use super::supplier::SupplierError;
use crate::config::PROPS_MARKETS;
use crate::models::{GameOdds, Market, MarketKey, MarketType, OddsQuote, Side};

/// One game as written in a replay fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayGame {
    pub game_id: String,
    pub date: String,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub books: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub props: Vec<ReplayProp>,
}

/// Player prop line as written in a replay fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayProp {
    pub player: String,
    pub market: String,
    pub line: f64,
    #[serde(default)]
    pub over: Value,
    #[serde(default)]
    pub under: Value,
    #[serde(default)]
    pub book: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayPayload {
    Many(Vec<ReplayGame>),
    One(ReplayGame),
}

/// Parse a `--replay` argument: `odds=<path>` or a bare path
pub fn parse_replay_arg(value: &str) -> Result<PathBuf, SupplierError> {
    match value.split_once('=') {
        Some(("odds", path)) => Ok(PathBuf::from(path)),
        Some((key, _)) => Err(SupplierError::UnsupportedReplayArg(key.to_string())),
        None => Ok(PathBuf::from(value)),
    }
}

/// Parse a fixture date, accepting a plain date or a timestamp
pub fn parse_game_date(value: &str) -> Result<NaiveDate, SupplierError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime.date());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|_| SupplierError::InvalidDate(value.to_string()))
}

/// Parse a price given as a JSON number or a string like "+150"
fn parse_price(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().trim_start_matches('+').parse().ok(),
        _ => None,
    }
}

/// Build a market from a `{line?, side: price...}` object
fn parse_market(game_id: &str, book: &str, market_key: &str, value: &Value) -> Option<Market> {
    let Some(market_type) = MarketType::from_key(market_key) else {
        debug!("Ignoring unknown market '{}' for {}", market_key, game_id);
        return None;
    };
    let Some(fields) = value.as_object() else {
        warn!("Market '{}' for {} at {} is not an object", market_key, game_id, book);
        return None;
    };

    let line = fields.get("line").and_then(Value::as_f64);
    let mut quotes = Vec::new();
    for (side_key, price) in fields.iter().filter(|(k, _)| k.as_str() != "line") {
        match (Side::from_key(side_key), parse_price(price)) {
            (Some(side), Some(american)) => quotes.push(OddsQuote::new(side, american, book)),
            _ => warn!(
                "Ignoring {}={} in {} market for {} at {}",
                side_key, price, market_key, game_id, book
            ),
        }
    }
    if quotes.is_empty() {
        warn!("Dropping {} market for {} at {}: no prices", market_key, game_id, book);
        return None;
    }
    quotes.sort_by_key(|q| q.side);

    Some(Market {
        key: MarketKey::new(game_id, market_type),
        book: book.to_string(),
        line,
        quotes,
    })
}

fn parse_prop(
    game_id: &str,
    default_book: Option<&str>,
    prop: &ReplayProp,
) -> Option<(String, Market)> {
    let book = prop.book.as_deref().or(default_book)?;
    let stat = prop.market.trim().to_lowercase();
    if !PROPS_MARKETS.contains(&stat.as_str()) {
        warn!("Ignoring unsupported prop market '{}' for {}", prop.market, prop.player);
        return None;
    }
    let quotes: Vec<OddsQuote> = [(Side::Over, &prop.over), (Side::Under, &prop.under)]
        .iter()
        .filter_map(|(side, price)| parse_price(price).map(|p| OddsQuote::new(*side, p, book)))
        .collect();
    if quotes.is_empty() {
        warn!("Dropping {} {} prop for {}: no prices", prop.player, stat, game_id);
        return None;
    }

    Some((
        book.to_string(),
        Market {
            key: MarketKey::prop(game_id, prop.player.trim(), stat),
            book: book.to_string(),
            line: Some(prop.line),
            quotes,
        },
    ))
}

impl ReplayGame {
    /// Convert to supplier output, keeping only the requested books
    pub fn into_game_odds(self, books: &[String]) -> Result<GameOdds, SupplierError> {
        let date = parse_game_date(&self.date)?;
        let wanted = |book: &str| books.iter().any(|b| b.eq_ignore_ascii_case(book));

        let mut markets = Vec::new();
        for (book, book_markets) in &self.books {
            if !wanted(book.as_str()) {
                continue;
            }
            markets.extend(
                book_markets
                    .iter()
                    .filter_map(|(key, value)| parse_market(&self.game_id, book, key, value)),
            );
        }

        let default_book = books.first().map(String::as_str);
        markets.extend(
            self.props
                .iter()
                .filter_map(|prop| parse_prop(&self.game_id, default_book, prop))
                .filter(|(book, _)| wanted(book.as_str()))
                .map(|(_, market)| market),
        );

        Ok(GameOdds {
            game_id: self.game_id,
            date,
            home: canonical_team(&self.home),
            away: canonical_team(&self.away),
            markets,
        })
    }
}

/// Parse replay fixture content
pub fn parse_replay(content: &str, books: &[String]) -> Result<Vec<GameOdds>, SupplierError> {
    let games = match serde_json::from_str::<ReplayPayload>(content)? {
        ReplayPayload::Many(games) => games,
        ReplayPayload::One(game) => vec![game],
    };

    games
        .into_iter()
        .map(|game| game.into_game_odds(books))
        .collect()
}

/// Load a replay fixture from disk
pub fn load_replay<P: AsRef<Path>>(
    path: P,
    books: &[String],
) -> Result<Vec<GameOdds>, SupplierError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SupplierError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_replay(&content, books)
}
