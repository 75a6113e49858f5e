//! Odds suppliers

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use super::odds_loader::load_replay;
use crate::models::GameOdds;

/// Odds supplier errors
#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse odds JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid game date '{0}'")]
    InvalidDate(String),

    #[error("Unsupported replay argument '{0}', expected odds=<path>")]
    UnsupportedReplayArg(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Source of posted odds for a slate
pub trait OddsSupplier {
    /// Short name recorded in the audit sheet
    fn name(&self) -> &'static str;

    fn fetch(&self, date: NaiveDate, books: &[String]) -> Result<Vec<GameOdds>, SupplierError>;
}

/// Reads a recorded JSON fixture
#[derive(Debug, Clone)]
pub struct ReplayOddsSupplier {
    path: PathBuf,
}

impl ReplayOddsSupplier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OddsSupplier for ReplayOddsSupplier {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn fetch(&self, date: NaiveDate, books: &[String]) -> Result<Vec<GameOdds>, SupplierError> {
        info!("Replaying odds for {} from {:?}", date, self.path);
        let games = load_replay(&self.path, books)?;
        info!("Loaded {} games from fixture", games.len());
        Ok(games)
    }
}

/// Live odds feed; not available in offline builds
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveOddsSupplier;

impl OddsSupplier for LiveOddsSupplier {
    fn name(&self) -> &'static str {
        "live"
    }

    fn fetch(&self, _date: NaiveDate, _books: &[String]) -> Result<Vec<GameOdds>, SupplierError> {
        Err(SupplierError::Unavailable(
            "Live odds are not available in the offline build. Use --replay odds=<path>"
                .to_string(),
        ))
    }
}
