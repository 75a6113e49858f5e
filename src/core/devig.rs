//! Margin removal
//!
//! Proportional (multiplicative) de-vig: each implied probability is divided
//! by the market total so the result is a proper distribution.

use super::odds::to_implied_probability;
use crate::error::EdgeError;

/// Raw implied probabilities may undershoot 1 by float noise only
const UNDERROUND_TOLERANCE: f64 = 1e-9;

/// Normalize a market's implied probabilities so they sum to 1
pub fn devig(implied: &[f64]) -> Result<Vec<f64>, EdgeError> {
    if implied.len() < 2 {
        return Err(EdgeError::InsufficientMarket {
            quotes: implied.len(),
        });
    }

    let total: f64 = implied.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(EdgeError::ZeroOverround { sum: total });
    }

    if let Some(&probability) = implied.iter().find(|&&p| !(p > 0.0 && p < 1.0)) {
        return Err(EdgeError::InvalidProbability { probability });
    }

    Ok(implied.iter().map(|p| p / total).collect())
}

/// De-vig a quoted market, rejecting books that sum below 1
///
/// A raw sum under 1 means the prices cannot all come from one book, so
/// normalizing it would invent a margin that is not there.
pub fn devig_market(implied: &[f64]) -> Result<Vec<f64>, EdgeError> {
    let devigged = devig(implied)?;

    let sum: f64 = implied.iter().sum();
    if sum < 1.0 - UNDERROUND_TOLERANCE {
        return Err(EdgeError::UnderroundMarket { sum });
    }

    Ok(devigged)
}

/// Convert American prices and de-vig them in one step
///
/// Returns `(raw implied, de-vigged)`, both in input order.
pub fn devig_american(odds: &[i32]) -> Result<(Vec<f64>, Vec<f64>), EdgeError> {
    let implied = odds
        .iter()
        .map(|&o| to_implied_probability(o))
        .collect::<Result<Vec<_>, _>>()?;
    let devigged = devig_market(&implied)?;
    Ok((implied, devigged))
}

/// Bookmaker margin: sum of implied probabilities minus one
pub fn overround(implied: &[f64]) -> f64 {
    implied.iter().sum::<f64>() - 1.0
}
