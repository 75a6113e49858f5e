//! Hoops Edge - NBA betting edge scanner
//!
//! This library provides:
//! - American odds conversion and proportional de-vigging
//! - Model vs market edge for moneyline, spread, total and player prop markets
//! - Risk tiers and capped Kelly stake sizing
//! - Parallel batch ranking and per-game summaries
//! - Replay odds ingestion and CSV report sheets
//!
//! # Example
//!
//! ```no_run
//! use hoops_edge::config::PipelineConfig;
//! use hoops_edge::core::rank;
//! use hoops_edge::data::parse_replay;
//! use hoops_edge::predictor::FallbackModel;
//!
//! let content = std::fs::read_to_string("fixtures/odds.json").unwrap();
//! let games = parse_replay(&content, &["DK".to_string()]).unwrap();
//! let estimates = FallbackModel::new().estimates(&games);
//!
//! let markets: Vec<_> = games.iter().flat_map(|g| g.markets.clone()).collect();
//! let batch = rank(&markets, &estimates, &PipelineConfig::default()).unwrap();
//! for record in &batch.records {
//!     println!("{} {:?} edge {:.3}", record.market, record.side, record.edge);
//! }
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod predictor;
pub mod report;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use core::{rank, EstimateMap, GameProjector, MarketRanker};
pub use data::{Conference, OddsSupplier, ReplayOddsSupplier};
pub use error::EdgeError;
pub use models::{
    EdgeRecord, GameOdds, GameSummary, Market, MarketKey, MarketType, ModelEstimate, OddsQuote,
    RankingBatch, RiskTier, Side,
};
pub use predictor::FallbackModel;
pub use report::{ReportWriter, ScanReport};
