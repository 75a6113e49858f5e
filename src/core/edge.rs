//! Model vs market edge
//!
//! Probability markets compare probabilities directly. Line markets go
//! through a linear proxy: the point advantage of the model's fair line over
//! the posted line is turned into a win probability with a per-market
//! sensitivity. The proxy is not a probability model of the score
//! distribution.

use serde::{Deserialize, Serialize};

use crate::config::LineSensitivity;
use crate::error::EdgeError;
use crate::models::{Market, MarketType, ModelEstimate, ModelValue, PricingMode, Side};

/// Bounds of the line-market probability proxy
const PROXY_MIN_PROBABILITY: f64 = 0.01;
const PROXY_MAX_PROBABILITY: f64 = 0.99;

/// Edge of one side of one market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeOutcome {
    pub side: Side,
    pub quote_index: usize,
    pub model_probability: f64,
    pub book_probability: f64,
    pub fair_value: f64,
    pub book_value: f64,
    pub diff: f64,
    pub edge: f64,
}

fn incompatible(reason: impl Into<String>) -> EdgeError {
    EdgeError::IncompatibleMarketType {
        reason: reason.into(),
    }
}

/// Whether `side` is a valid selection for `market_type`
pub fn side_allowed(market_type: MarketType, side: Side) -> bool {
    match market_type {
        MarketType::Moneyline | MarketType::Spread => matches!(side, Side::Home | Side::Away),
        MarketType::Total | MarketType::PlayerProp => matches!(side, Side::Over | Side::Under),
    }
}

/// `model - book` for two probabilities of the same side
pub fn probability_edge(model_probability: f64, book_probability: f64) -> Result<f64, EdgeError> {
    for probability in [model_probability, book_probability] {
        if !(probability > 0.0 && probability < 1.0) {
            return Err(EdgeError::InvalidProbability { probability });
        }
    }
    Ok(model_probability - book_probability)
}

/// Points by which the fair line favors `side` over the posted line
///
/// Spread lines are quoted as the home handicap (-3.5 means home must win by
/// 4), so a fair handicap below the posted one favors home and one above it
/// favors away. Totals favor the over when the fair total is above the posted
/// total.
pub fn line_advantage(
    market_type: MarketType,
    side: Side,
    posted: f64,
    fair: f64,
) -> Result<f64, EdgeError> {
    match (market_type, side) {
        (MarketType::Spread, Side::Home) => Ok(posted - fair),
        (MarketType::Spread, Side::Away) => Ok(fair - posted),
        (MarketType::Total, Side::Over) => Ok(fair - posted),
        (MarketType::Total, Side::Under) => Ok(posted - fair),
        _ => Err(incompatible(format!(
            "{} is not a line side of a {} market",
            side.label(),
            market_type.label()
        ))),
    }
}

/// Linear proxy: `0.5 + advantage × sensitivity`, clamped to [0.01, 0.99]
pub fn proxy_probability(advantage: f64, sensitivity: f64) -> f64 {
    (0.5 + advantage * sensitivity).clamp(PROXY_MIN_PROBABILITY, PROXY_MAX_PROBABILITY)
}

/// Edge calculator bound to a line sensitivity table
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeCalculator {
    sensitivity: LineSensitivity,
}

impl EdgeCalculator {
    pub fn new(sensitivity: LineSensitivity) -> Self {
        Self { sensitivity }
    }

    /// Price the estimate's side of `market`
    ///
    /// `devigged` holds the de-vigged probabilities in `market.quotes` order.
    pub fn evaluate(
        &self,
        market: &Market,
        devigged: &[f64],
        estimate: &ModelEstimate,
    ) -> Result<EdgeOutcome, EdgeError> {
        let market_type = market.key.market_type;
        let side = estimate.side;

        if !side_allowed(market_type, side) {
            return Err(incompatible(format!(
                "estimate side {} does not belong to a {} market",
                side.label(),
                market_type.label()
            )));
        }
        let quote_index = market.position(side).ok_or_else(|| {
            incompatible(format!("{} is not quoted by {}", side.label(), market.book))
        })?;
        let book_probability = *devigged.get(quote_index).ok_or_else(|| {
            incompatible("de-vigged probabilities do not cover every quote")
        })?;

        match (market_type.pricing_mode(), estimate.value) {
            (PricingMode::Probability, ModelValue::Probability(model_probability)) => {
                let edge = probability_edge(model_probability, book_probability)?;
                Ok(EdgeOutcome {
                    side,
                    quote_index,
                    model_probability,
                    book_probability,
                    fair_value: model_probability,
                    book_value: book_probability,
                    diff: edge.abs(),
                    edge,
                })
            }
            (PricingMode::Line, ModelValue::FairLine(fair)) => {
                let posted = market
                    .line
                    .ok_or_else(|| incompatible("line market has no posted line"))?;
                if !fair.is_finite() {
                    return Err(incompatible(format!("fair line {} is not finite", fair)));
                }
                let sensitivity = self.sensitivity.for_market(market_type).ok_or_else(|| {
                    incompatible(format!("no sensitivity for {}", market_type.label()))
                })?;

                let advantage = line_advantage(market_type, side, posted, fair)?;
                let model_probability = proxy_probability(advantage, sensitivity);
                let edge = probability_edge(model_probability, book_probability)?;

                Ok(EdgeOutcome {
                    side,
                    quote_index,
                    model_probability,
                    book_probability,
                    fair_value: fair,
                    book_value: posted,
                    diff: (fair - posted).abs(),
                    edge,
                })
            }
            (PricingMode::Probability, ModelValue::FairLine(_)) => Err(incompatible(format!(
                "{} is priced by probability but the estimate is a fair line",
                market_type.label()
            ))),
            (PricingMode::Line, ModelValue::Probability(_)) => Err(incompatible(format!(
                "{} is priced by line but the estimate is a probability",
                market_type.label()
            ))),
        }
    }
}
