use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::AppState;
use crate::error::AppError;
use crate::models::CoachResponse;
use crate::store;

const DEFAULT_LOG_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
  #[serde(default = "default_limit")]
  pub limit: u32,
}

fn default_limit() -> u32 {
  DEFAULT_LOG_LIMIT
}

pub async fn list_logs(
  State(state): State<Arc<AppState>>,
  Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<CoachResponse>>, AppError> {
  let logs = store::recent_logs(&state.db, i64::from(query.limit)).await?;
  Ok(Json(logs.iter().map(CoachResponse::from).collect()))
}
