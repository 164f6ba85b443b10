use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware, error, http::StatusCode};
use lostfound_matcher::config::Settings;
use lostfound_matcher::core::Matcher;
use lostfound_matcher::models::{ErrorResponse, ScoringWeights};
use lostfound_matcher::routes::{self, matching::AppState};
use lostfound_matcher::services::{
    EmbeddingProvider, ItemRegistry, MatchingEngine, RemoteEmbeddingProvider, ZeroEmbeddingProvider,
};
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ErrorResponse::new(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ErrorResponse::new(StatusCode::BAD_REQUEST, "invalid_query", format!("Invalid query: {}", err)).into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Initialize logging; LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Lost & Found matching service...");

    // Initialize embedding provider (optional - clients can send embeddings)
    let embedding = &settings.embedding;
    let embeddings: Arc<dyn EmbeddingProvider> = match &embedding.endpoint {
        Some(endpoint) => {
            let provider = RemoteEmbeddingProvider::new(
                endpoint.clone(),
                embedding.text_dim,
                embedding.image_dim,
                embedding.timeout_secs,
                embedding.cache_size,
            )
            .map_err(|e| {
                error!("Failed to create embedding client: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            info!("Embedding service at {} (text cache: {} entries)", endpoint, embedding.cache_size);
            Arc::new(provider)
        }
        None => {
            warn!("No embedding endpoint configured, items must be registered with embeddings");
            Arc::new(ZeroEmbeddingProvider::new(embedding.text_dim, embedding.image_dim))
        }
    };

    // Initialize matcher with configured weights and thresholds
    let weights = ScoringWeights::from(&settings.scoring.weights);
    let thresholds = settings.matching.thresholds();
    let matcher = Matcher::new(weights, thresholds);

    info!("Matcher initialized with weights: {:?}, thresholds: {:?}", weights, thresholds);

    let engine = MatchingEngine::new(Arc::new(ItemRegistry::new()), embeddings, matcher)
        .with_top_k(settings.matching.top_k, settings.matching.max_top_k);

    // Build application state
    let app_state = AppState { engine };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024).error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
