use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use hoops_edge::core::{devig_american, overround, to_american_odds, EstimateMap, MarketRanker};
use hoops_edge::error::{validate_odds_list, AppError};
use hoops_edge::models::{DevigRequest, DevigResponse, RankRequest};

/// Rank a batch of markets against model estimates
pub async fn rank_markets(
    state: web::Data<Arc<AppState>>,
    req: web::Json<RankRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();

    let ranker = match req.config {
        Some(config) => {
            config
                .validate()
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
            MarketRanker::new(config)
        }
        None => state.ranker,
    };

    let estimates: EstimateMap = req
        .estimates
        .into_iter()
        .map(|keyed| (keyed.market, keyed.estimate))
        .collect();

    let batch = ranker.rank(&req.markets, &estimates)?;
    info!(
        "Ranked request: {} records, {} skipped",
        batch.records.len(),
        batch.skipped.len()
    );

    Ok(HttpResponse::Ok().json(batch))
}

/// De-vig one market's prices
pub async fn devig_prices(req: web::Json<DevigRequest>) -> Result<HttpResponse, AppError> {
    validate_odds_list(&req.odds)?;

    let (implied, devigged) = devig_american(&req.odds)?;
    let fair_odds = devigged
        .iter()
        .map(|p| to_american_odds(*p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(DevigResponse {
        overround: overround(&implied),
        implied,
        devigged,
        fair_odds,
    }))
}
