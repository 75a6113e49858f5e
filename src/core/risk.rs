//! Risk tiers from model/market disagreement

use crate::config::{RiskTable, RiskThresholds};
use crate::models::{PricingMode, RiskTier};

/// Slack for boundary comparisons so that a computed 0.55 - 0.50 still lands
/// on the 0.05 boundary
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Bucket a magnitude against one threshold pair (upper bounds inclusive)
pub fn classify_magnitude(thresholds: &RiskThresholds, magnitude: f64) -> RiskTier {
    let magnitude = magnitude.abs();
    if magnitude <= thresholds.low + BOUNDARY_EPSILON {
        RiskTier::Low
    } else if magnitude <= thresholds.medium + BOUNDARY_EPSILON {
        RiskTier::Med
    } else {
        RiskTier::High
    }
}

/// Stateless classifier over a threshold table
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier {
    table: RiskTable,
}

impl RiskClassifier {
    pub fn new(table: RiskTable) -> Self {
        Self { table }
    }

    /// Classify `magnitude`: |edge| for probability markets, |line difference|
    /// in points for line markets
    pub fn classify(&self, mode: PricingMode, magnitude: f64) -> RiskTier {
        classify_magnitude(self.table.for_mode(mode), magnitude)
    }
}
