//! Pipeline configuration
//!
//! Every tunable of the pricing pipeline lives in [`PipelineConfig`], which is
//! passed into the ranker by value. Nothing here is process-global.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::models::{MarketType, PricingMode};

pub const DEFAULT_BOOKS: &[&str] = &["DK"];
pub const SUPPORTED_BOOKS: &[&str] = &["DK", "FD"];
pub const PROPS_MARKETS: &[&str] = &["points", "rebounds", "assists", "threes", "pra"];
pub const OUTPUT_DIR: &str = "outputs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Upper bounds of the Low and Med buckets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low: f64,
    pub medium: f64,
}

impl RiskThresholds {
    pub fn probability() -> Self {
        Self {
            low: 0.02,
            medium: 0.05,
        }
    }

    pub fn line() -> Self {
        Self {
            low: 0.5,
            medium: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTable {
    pub probability: RiskThresholds,
    pub line: RiskThresholds,
}

impl Default for RiskTable {
    fn default() -> Self {
        Self {
            probability: RiskThresholds::probability(),
            line: RiskThresholds::line(),
        }
    }
}

impl RiskTable {
    pub fn for_mode(&self, mode: PricingMode) -> &RiskThresholds {
        match mode {
            PricingMode::Probability => &self.probability,
            PricingMode::Line => &self.line,
        }
    }
}

/// Kelly sizing settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KellyConfig {
    /// Fraction of full Kelly to stake before the cap (1.0 = full Kelly)
    pub multiplier: f64,
    /// Maximum stake in percent of bankroll
    pub cap_pct: f64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            cap_pct: 1.0,
        }
    }
}

/// Win-probability shift per point of line disagreement.
///
/// This drives a linear proxy, not a probability model; the values are
/// tuning parameters supplied by whoever owns the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSensitivity {
    pub spread: f64,
    pub total: f64,
}

impl Default for LineSensitivity {
    fn default() -> Self {
        Self {
            spread: 0.10,
            total: 0.10,
        }
    }
}

impl LineSensitivity {
    /// Sensitivity for a line market, `None` for probability markets
    pub fn for_market(&self, market_type: MarketType) -> Option<f64> {
        match market_type {
            MarketType::Spread => Some(self.spread),
            MarketType::Total => Some(self.total),
            MarketType::Moneyline | MarketType::PlayerProp => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub risk: RiskTable,
    pub kelly: KellyConfig,
    pub line_sensitivity: LineSensitivity,
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, t) in [("probability", &self.risk.probability), ("line", &self.risk.line)] {
            if !(t.low >= 0.0 && t.low <= t.medium) {
                return Err(ConfigError::Invalid(format!(
                    "{} risk thresholds must satisfy 0 <= low <= medium, got {} / {}",
                    name, t.low, t.medium
                )));
            }
        }
        if !(self.kelly.multiplier >= 0.0 && self.kelly.multiplier.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "kelly multiplier must be non-negative, got {}",
                self.kelly.multiplier
            )));
        }
        if !(self.kelly.cap_pct >= 0.0 && self.kelly.cap_pct <= 100.0) {
            return Err(ConfigError::Invalid(format!(
                "kelly cap must be within 0..=100 percent, got {}",
                self.kelly.cap_pct
            )));
        }
        if !(self.line_sensitivity.spread > 0.0 && self.line_sensitivity.total > 0.0) {
            return Err(ConfigError::Invalid(
                "line sensitivities must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.risk.probability, RiskThresholds { low: 0.02, medium: 0.05 });
        assert_eq!(config.risk.line, RiskThresholds { low: 0.5, medium: 1.5 });
        assert!((config.kelly.cap_pct - 1.0).abs() < 1e-12);
        assert!((config.kelly.multiplier - 1.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"kelly": {"multiplier": 0.25}}"#).unwrap();
        assert!((config.kelly.multiplier - 0.25).abs() < 1e-12);
        assert!((config.kelly.cap_pct - 1.0).abs() < 1e-12);
        assert_eq!(config.line_sensitivity, LineSensitivity::default());
    }

    #[test]
    fn test_sensitivity_lookup() {
        let s = LineSensitivity {
            spread: 0.08,
            total: 0.05,
        };
        assert_eq!(s.for_market(MarketType::Spread), Some(0.08));
        assert_eq!(s.for_market(MarketType::Total), Some(0.05));
        assert_eq!(s.for_market(MarketType::Moneyline), None);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = PipelineConfig::default();
        config.risk.line = RiskThresholds {
            low: 2.0,
            medium: 1.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"line_sensitivity": {"spread": 0.07}}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert!((config.line_sensitivity.spread - 0.07).abs() < 1e-12);
        assert!((config.line_sensitivity.total - 0.10).abs() < 1e-12);

        fs::write(&path, r#"{"kelly": {"cap_pct": -1.0}}"#).unwrap();
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
