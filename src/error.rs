use serde::Serialize;
use thiserror::Error;

/// Pricing pipeline errors
///
/// Everything except `MalformedBatch` and `InvalidConfig` is scoped to a
/// single market: the ranker turns those into skips instead of aborting the
/// batch.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeError {
    #[error("invalid American odds {odds}: magnitude must be at least 100")]
    InvalidOdds { odds: i32 },

    #[error("invalid probability {probability}: must lie strictly between 0 and 1")]
    InvalidProbability { probability: f64 },

    #[error("market needs at least 2 quotes, got {quotes}")]
    InsufficientMarket { quotes: usize },

    #[error("implied probabilities sum to {sum}, cannot normalize")]
    ZeroOverround { sum: f64 },

    #[error("implied probabilities sum to {sum} (< 1), market is not a complete book")]
    UnderroundMarket { sum: f64 },

    #[error("model estimate does not match market: {reason}")]
    IncompatibleMarketType { reason: String },

    #[error("no model estimate for {market}")]
    MissingModelEstimate { market: String },

    #[error("malformed batch: {reason}")]
    MalformedBatch { reason: String },

    #[error("rejected pipeline config: {reason}")]
    InvalidConfig { reason: String },
}

impl EdgeError {
    /// Short machine-readable name, used by the audit sheet and API skips
    pub fn kind(&self) -> &'static str {
        match self {
            EdgeError::InvalidOdds { .. } => "invalid_odds",
            EdgeError::InvalidProbability { .. } => "invalid_probability",
            EdgeError::InsufficientMarket { .. } => "insufficient_market",
            EdgeError::ZeroOverround { .. } => "zero_overround",
            EdgeError::UnderroundMarket { .. } => "underround_market",
            EdgeError::IncompatibleMarketType { .. } => "incompatible_market_type",
            EdgeError::MissingModelEstimate { .. } => "missing_model_estimate",
            EdgeError::MalformedBatch { .. } => "malformed_batch",
            EdgeError::InvalidConfig { .. } => "invalid_config",
        }
    }
}

#[cfg(feature = "api")]
pub use api::{validate_odds_list, AppError};

#[cfg(feature = "api")]
mod api {
    use actix_web::{http::StatusCode, HttpResponse, ResponseError};
    use std::fmt;

    use super::EdgeError;
    use crate::models::ErrorResponse;

    /// Application error types
    #[derive(Debug)]
    pub enum AppError {
        /// Invalid request data
        ValidationError(String),
        /// Pipeline rejected the whole batch
        PricingError(EdgeError),
        /// Internal server error
        InternalError(String),
    }

    impl fmt::Display for AppError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
                AppError::PricingError(err) => write!(f, "Pricing error: {}", err),
                AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            }
        }
    }

    impl std::error::Error for AppError {}

    impl From<EdgeError> for AppError {
        fn from(err: EdgeError) -> Self {
            AppError::PricingError(err)
        }
    }

    impl ResponseError for AppError {
        fn status_code(&self) -> StatusCode {
            match self {
                AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
                AppError::PricingError(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn error_response(&self) -> HttpResponse {
            let (error_code, message) = match self {
                AppError::ValidationError(msg) => ("validation_error", msg.clone()),
                AppError::PricingError(err) => (err.kind(), err.to_string()),
                AppError::InternalError(msg) => ("internal_error", msg.clone()),
            };

            HttpResponse::build(self.status_code()).json(ErrorResponse {
                error: error_code.to_string(),
                message,
            })
        }
    }

    /// Validation functions
    pub fn validate_odds_list(odds: &[i32]) -> Result<(), AppError> {
        if odds.len() < 2 {
            return Err(AppError::ValidationError(format!(
                "At least 2 prices required, got {}",
                odds.len()
            )));
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EdgeError::InvalidOdds { odds: 50 };
        assert!(err.to_string().contains("50"));
        assert_eq!(err.kind(), "invalid_odds");
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let err = EdgeError::InsufficientMarket { quotes: 1 };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "insufficient_market");
        assert_eq!(json["quotes"], 1);
    }
}
