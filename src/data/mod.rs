//! Odds ingestion and team mapping

pub mod mapping;
pub mod odds_loader;
pub mod supplier;

// Re-export commonly used types
pub use mapping::{canonical_team, conference_for_team, Conference};
pub use odds_loader::{load_replay, parse_replay, parse_replay_arg};
pub use supplier::{LiveOddsSupplier, OddsSupplier, ReplayOddsSupplier, SupplierError};
