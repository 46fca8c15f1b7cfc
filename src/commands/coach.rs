use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use crate::db::AppState;
use crate::error::AppError;
use crate::models::{CoachResponse, DailyInput, DailyLog, NewDailyLog};
use crate::prompting::PromptBuilder;
use crate::store;

/// Sampling temperature for coaching requests
pub const COACH_TEMPERATURE: f32 = 0.25;

pub async fn coach(
  State(state): State<Arc<AppState>>,
  Json(input): Json<DailyInput>,
) -> Result<Json<CoachResponse>, AppError> {
  let log = run_coach(&state, &input).await?;
  Ok(Json(CoachResponse::from(&log)))
}

/// Build the prompt, ask the model, then store the log.
/// Nothing is written unless a validated recommendation came back.
pub async fn run_coach(state: &AppState, input: &DailyInput) -> Result<DailyLog, AppError> {
  let messages = PromptBuilder::new(&state.db)
    .build_messages(input, Some(input.log_date))
    .await?;

  let recommendation = state.llm.chat(&messages, COACH_TEMPERATURE).await?;

  let log = store::insert_log(&state.db, &NewDailyLog::from_coaching(input, &recommendation)).await?;
  info!(log_id = log.id, log_date = %log.log_date, "Stored coaching log");

  Ok(log)
}
