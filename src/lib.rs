pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod prompting;
pub mod store;

#[cfg(test)]
mod test_utils;

use axum::http::HeaderValue;
use axum::Router;
use config::AppConfig;
use db::AppState;
use llm::RecommendationClient;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Router with CORS and request tracing applied
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
  commands::router(state)
    .layer(cors_layer(allowed_origins))
    .layer(TraceLayer::new_for_http())
}

/// A `*` entry opens CORS to every origin; credentials can't be combined
/// with a wildcard, so they are only allowed for an explicit origin list.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
  if allowed_origins.iter().any(|origin| origin == "*") {
    return CorsLayer::new()
      .allow_origin(Any)
      .allow_methods(Any)
      .allow_headers(Any);
  }

  let origins: Vec<HeaderValue> = allowed_origins
    .iter()
    .filter_map(|origin| match HeaderValue::from_str(origin) {
      Ok(value) => Some(value),
      Err(_) => {
        warn!(origin = %origin, "Ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods(tower_http::cors::AllowMethods::mirror_request())
    .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
    .allow_credentials(true)
}

/// Load config, prepare the store and serve until Ctrl-C
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  info!(app = %config.app_name, "Starting");

  let pool = db::initialize_db(&config.database_url).await?;
  db::seed_defaults(&pool).await?;

  let llm = RecommendationClient::from_config(&config.llm)?;
  if llm.is_live() {
    info!(model = %config.llm.model, api_url = %config.llm.api_url, "LLM client ready");
  } else {
    warn!("LLM_API_KEY not set, serving canned recommendations");
  }

  let state = Arc::new(AppState { db: pool, llm });
  let app = build_router(state, &config.allowed_origins);

  let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
  info!(addr = %config.bind_addr, "Listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!("Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
