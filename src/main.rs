use actix_web::{middleware, web, App, HttpServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod handlers;

use handlers::{health, rank};
use hoops_edge::config::PipelineConfig;
use hoops_edge::core::MarketRanker;

/// Application state shared across handlers
#[derive(Debug, Default)]
pub struct AppState {
    pub ranker: MarketRanker,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    let config = match std::env::var("PIPELINE_CONFIG").map(PathBuf::from) {
        Ok(path) => match PipelineConfig::load(&path) {
            Ok(config) => {
                info!("Loaded pipeline config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load config {:?}: {}. Using defaults.", path, e);
                PipelineConfig::default()
            }
        },
        Err(_) => PipelineConfig::default(),
    };

    let app_state = Arc::new(AppState {
        ranker: MarketRanker::new(config),
    });

    info!("Starting hoops-edge API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route("/rank", web::post().to(rank::rank_markets))
            .route("/devig", web::post().to(rank::devig_prices))
    })
    .bind(&addr)?
    .run()
    .await
}
