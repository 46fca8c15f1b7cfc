pub mod coach;
pub mod logs;
pub mod profile;

use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::db::AppState;

/// All API routes, bound to the shared state
pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/profile", get(profile::get_profile).put(profile::update_profile))
    .route(
      "/system-prompt",
      get(profile::get_system_prompt).put(profile::update_system_prompt),
    )
    .route("/logs", get(logs::list_logs))
    .route("/coach", post(coach::coach))
    .route("/health", get(health))
    .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
  Json(serde_json::json!({ "status": "ok" }))
}

/// ---------------------------------------------------------------------------
/// Router Tests
/// ---------------------------------------------------------------------------
