//! Kelly Criterion Bet Sizing
//!
//! Stake sizing from model probability and American odds.
//!
//! The Kelly criterion formula:
//!     f* = (b*p - q) / b
//!
//! Where:
//!     f* = fraction of bankroll to bet
//!     b = net payout per unit staked (100/|odds| for favorites, odds/100 for dogs)
//!     p = model probability of winning
//!     q = 1 - p
//!
//! The recommended stake is `f* × multiplier`, expressed in percent of
//! bankroll, floored at 0 and capped at `cap_pct`.

use serde::{Deserialize, Serialize};

use super::odds::payout_ratio;
use crate::config::KellyConfig;
use crate::error::EdgeError;

/// Bet sizing recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeSizing {
    pub probability: f64,
    pub american: i32,
    pub payout_ratio: f64,
    pub expected_value: f64, // per unit staked
    pub kelly_fraction: f64, // Full Kelly, may be negative
    pub stake_pct: f64,      // After multiplier, floor and cap
}

impl StakeSizing {
    /// Stake in currency units for a given bankroll
    pub fn stake_amount(&self, bankroll: f64) -> f64 {
        bankroll * self.stake_pct / 100.0
    }
}

/// Full Kelly fraction for a single bet
///
/// Negative values mean the price offers no edge.
///
/// # Examples
/// ```
/// use hoops_edge::core::kelly::kelly_fraction;
/// let kelly = kelly_fraction(0.55, 100).unwrap(); // b = 1
/// assert!((kelly - 0.10).abs() < 1e-9);
/// ```
pub fn kelly_fraction(probability: f64, american: i32) -> Result<f64, EdgeError> {
    if !(probability > 0.0 && probability < 1.0) {
        return Err(EdgeError::InvalidProbability { probability });
    }
    let b = payout_ratio(american)?;
    let q = 1.0 - probability;

    Ok((b * probability - q) / b)
}

/// Recommended stake in percent of bankroll, within `[0, cap_pct]`
pub fn stake_pct(probability: f64, american: i32, config: &KellyConfig) -> Result<f64, EdgeError> {
    let kelly = kelly_fraction(probability, american)?;

    if kelly <= 0.0 {
        return Ok(0.0);
    }

    let pct = kelly * config.multiplier * 100.0;
    Ok(pct.min(config.cap_pct).max(0.0))
}

/// Kelly calculator bound to one sizing configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct KellyStaker {
    pub config: KellyConfig,
}

impl KellyStaker {
    pub fn new(config: KellyConfig) -> Self {
        Self { config }
    }

    /// Create with a custom multiplier and cap
    pub fn with_limits(multiplier: f64, cap_pct: f64) -> Self {
        Self {
            config: KellyConfig {
                multiplier,
                cap_pct,
            },
        }
    }

    pub fn stake_pct(&self, probability: f64, american: i32) -> Result<f64, EdgeError> {
        stake_pct(probability, american, &self.config)
    }

    /// Calculate bet sizing for a single bet
    pub fn size(&self, probability: f64, american: i32) -> Result<StakeSizing, EdgeError> {
        let kelly = kelly_fraction(probability, american)?;
        let b = payout_ratio(american)?;
        let stake_pct = self.stake_pct(probability, american)?;

        Ok(StakeSizing {
            probability,
            american,
            payout_ratio: b,
            expected_value: probability * b - (1.0 - probability),
            kelly_fraction: kelly,
            stake_pct,
        })
    }
}
