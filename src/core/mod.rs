//! Core pricing pipeline

pub mod devig;
pub mod edge;
pub mod kelly;
pub mod odds;
pub mod projector;
pub mod ranker;
pub mod risk;

// Re-export commonly used types
pub use devig::{devig, devig_american, devig_market, overround};
pub use edge::{EdgeCalculator, EdgeOutcome};
pub use kelly::{kelly_fraction, stake_pct, KellyStaker, StakeSizing};
pub use odds::{to_american_odds, to_decimal_odds, to_implied_probability};
pub use projector::GameProjector;
pub use ranker::{rank, EstimateMap, MarketRanker};
pub use risk::RiskClassifier;
