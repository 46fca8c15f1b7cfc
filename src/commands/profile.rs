use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::db::AppState;
use crate::error::AppError;
use crate::models::{SystemPromptPayload, UserProfile};
use crate::store;

/// ---------------------------------------------------------------------------
/// Profile
/// ---------------------------------------------------------------------------

pub async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Json<UserProfile>, AppError> {
  store::load_profile(&state.db)
    .await?
    .map(Json)
    .ok_or(AppError::NotFound("Profile not set"))
}

pub async fn update_profile(
  State(state): State<Arc<AppState>>,
  Json(payload): Json<UserProfile>,
) -> Result<Json<UserProfile>, AppError> {
  let stored = store::upsert_profile(&state.db, &payload).await?;
  Ok(Json(stored))
}

/// ---------------------------------------------------------------------------
/// System Prompt
/// ---------------------------------------------------------------------------

pub async fn get_system_prompt(
  State(state): State<Arc<AppState>>,
) -> Result<Json<SystemPromptPayload>, AppError> {
  store::latest_system_prompt(&state.db)
    .await?
    .map(|row| Json(row.into()))
    .ok_or(AppError::NotFound("System prompt not set"))
}

/// Always appends a new version; earlier versions are kept
pub async fn update_system_prompt(
  State(state): State<Arc<AppState>>,
  Json(payload): Json<SystemPromptPayload>,
) -> Result<Json<SystemPromptPayload>, AppError> {
  let row = store::insert_system_prompt(&state.db, &payload.version, &payload.content).await?;
  tracing::info!(version = %row.version, id = row.id, "Stored new system prompt");
  Ok(Json(row.into()))
}
