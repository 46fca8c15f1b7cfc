//! Prompt assembly for the coaching agent
//!
//! Combines the active system prompt, the user profile and the most recent
//! logs into the two-message payload sent to the model. Reading is separated
//! from assembly so the shape of the payload can be checked without a store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::llm::ChatMessage;
use crate::models::{DailyInput, DailyLog, UserProfile, DEFAULT_SYSTEM_PROMPT};
use crate::store;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
  #[error("Database error: {0}")]
  Store(#[from] sqlx::Error),

  #[error("Failed to encode user context: {0}")]
  Encode(#[from] serde_json::Error),
}

/// ---------------------------------------------------------------------------
/// Context Package for LLM
/// ---------------------------------------------------------------------------

/// The structured user message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
  /// ISO date the coaching is for
  pub today: Option<String>,

  /// Today's raw inputs as reported
  pub inputs: DailyInput,

  pub profile: UserProfile,

  /// Up to seven past logs, newest first
  pub recent_logs: Vec<HistoryEntry>,
}

/// Compact projection of a past log. Reasoning, calories and next steps are
/// left out to keep the payload small.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub date: String,
  pub weight: Option<f64>,
  pub activity: Option<String>,
  pub hunger: Option<String>,
  pub food: Option<String>,
  pub planned_workout: Option<String>,
  pub recommendation: Option<String>,
}

impl From<&DailyLog> for HistoryEntry {
  fn from(log: &DailyLog) -> Self {
    Self {
      date: log.log_date.format("%Y-%m-%d").to_string(),
      weight: log.weight,
      activity: log.activity.clone(),
      hunger: log.hunger_level.clone(),
      food: log.food_eaten.clone(),
      planned_workout: log.planned_workout.clone(),
      recommendation: log.recommendation.clone(),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Prompt Builder
/// ---------------------------------------------------------------------------

pub struct PromptBuilder<'a> {
  pool: &'a DbPool,
}

impl<'a> PromptBuilder<'a> {
  pub fn new(pool: &'a DbPool) -> Self {
    Self { pool }
  }

  pub async fn load_system_prompt(&self) -> Result<String, sqlx::Error> {
    Ok(
      store::latest_system_prompt(self.pool)
        .await?
        .map(|row| row.content)
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
    )
  }

  pub async fn load_profile(&self) -> Result<UserProfile, sqlx::Error> {
    Ok(store::load_profile(self.pool).await?.unwrap_or_default())
  }

  pub async fn load_recent_logs(&self) -> Result<Vec<DailyLog>, sqlx::Error> {
    store::recent_logs(self.pool, store::HISTORY_LIMIT).await
  }

  /// Read everything the prompt needs and assemble it
  pub async fn build_messages(
    &self,
    inputs: &DailyInput,
    today: Option<NaiveDate>,
  ) -> Result<Vec<ChatMessage>, PromptError> {
    let system_prompt = self.load_system_prompt().await?;
    let profile = self.load_profile().await?;
    let recent_logs = self.load_recent_logs().await?;

    assemble_messages(system_prompt, profile, &recent_logs, inputs, today)
  }
}

/// Build `[system, user]` from already-loaded parts
pub fn assemble_messages(
  system_prompt: String,
  profile: UserProfile,
  recent_logs: &[DailyLog],
  inputs: &DailyInput,
  today: Option<NaiveDate>,
) -> Result<Vec<ChatMessage>, PromptError> {
  let context = UserContext {
    today: today.map(|d| d.format("%Y-%m-%d").to_string()),
    inputs: inputs.clone(),
    profile,
    recent_logs: recent_logs
      .iter()
      .take(store::HISTORY_LIMIT as usize)
      .map(HistoryEntry::from)
      .collect(),
  };

  Ok(vec![ChatMessage::system(system_prompt), ChatMessage::user(context.to_json()?)])
}

impl UserContext {
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::llm::Role;
  use crate::test_utils::{date, mock_daily_input, mock_profile, seed_test_logs, setup_test_db, teardown_test_db};
  use serde_json::Value;

  fn user_context(messages: &[ChatMessage]) -> Value {
    serde_json::from_str(&messages[1].content).expect("user message is JSON")
  }

  #[tokio::test]
  async fn test_default_system_prompt_when_none_stored() {
    let pool = setup_test_db().await;

    let messages = PromptBuilder::new(&pool)
      .build_messages(&mock_daily_input(), Some(date(2024, 3, 5)))
      .await
      .unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[0].content, DEFAULT_SYSTEM_PROMPT);
    assert_eq!(messages[1].role, Role::User);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_latest_stored_prompt_wins() {
    let pool = setup_test_db().await;
    store::insert_system_prompt(&pool, "v1", "old persona").await.unwrap();
    store::insert_system_prompt(&pool, "v2", "new persona").await.unwrap();

    let messages = PromptBuilder::new(&pool)
      .build_messages(&mock_daily_input(), None)
      .await
      .unwrap();

    assert_eq!(messages[0].content, "new persona");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_profile_falls_back_to_defaults() {
    let pool = setup_test_db().await;

    let messages = PromptBuilder::new(&pool)
      .build_messages(&mock_daily_input(), None)
      .await
      .unwrap();
    let context = user_context(&messages);

    assert_eq!(context["profile"]["sex"], "female");
    assert_eq!(context["profile"]["focus_areas"], "legs, glutes, core");
    assert_eq!(context["today"], Value::Null);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_stored_profile_and_inputs_are_included() {
    let pool = setup_test_db().await;
    let mut profile = mock_profile();
    profile.goal = "recomp".to_string();
    store::upsert_profile(&pool, &profile).await.unwrap();

    let input = mock_daily_input();
    let messages = PromptBuilder::new(&pool)
      .build_messages(&input, Some(input.log_date))
      .await
      .unwrap();
    let context = user_context(&messages);

    assert_eq!(context["profile"]["goal"], "recomp");
    assert_eq!(context["today"], "2024-03-05");
    assert_eq!(context["inputs"]["log_date"], "2024-03-05");
    assert_eq!(context["inputs"]["hunger_level"], "Medium");
    assert_eq!(context["recent_logs"], Value::Array(vec![]));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_history_capped_at_seven_newest_first() {
    let pool = setup_test_db().await;
    let dates: Vec<_> = (1..=10).map(|day| date(2024, 2, day)).collect();
    seed_test_logs(&pool, &dates).await;

    let messages = PromptBuilder::new(&pool)
      .build_messages(&mock_daily_input(), None)
      .await
      .unwrap();
    let history = user_context(&messages)["recent_logs"].as_array().unwrap().clone();

    assert_eq!(history.len(), 7);
    let history_dates: Vec<&str> = history.iter().map(|h| h["date"].as_str().unwrap()).collect();
    assert_eq!(history_dates.first(), Some(&"2024-02-10"));
    assert_eq!(history_dates.last(), Some(&"2024-02-04"));
    let mut sorted = history_dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(history_dates, sorted);

    // Projection keeps only the compact fields
    let entry = history[0].as_object().unwrap();
    assert!(entry.contains_key("hunger"));
    assert!(entry.contains_key("recommendation"));
    assert!(!entry.contains_key("reasoning"));
    assert!(!entry.contains_key("next_steps"));

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_assemble_messages_truncates_history() {
    let logs: Vec<DailyLog> = (1..=9)
      .map(|day| crate::test_utils::mock_daily_log(day, date(2024, 1, 10 - day as u32)))
      .collect();

    let messages = assemble_messages(
      "persona".to_string(),
      UserProfile::default(),
      &logs,
      &mock_daily_input(),
      None,
    )
    .unwrap();
    let context = user_context(&messages);

    assert_eq!(messages[0].content, "persona");
    assert_eq!(context["recent_logs"].as_array().unwrap().len(), 7);
  }

  #[test]
  fn test_user_context_encodes_non_finite_weight_as_null() {
    let mut input = mock_daily_input();
    input.weight = Some(f64::NAN);

    let messages = assemble_messages(
      "persona".to_string(),
      UserProfile::default(),
      &[],
      &input,
      Some(input.log_date),
    )
    .expect("context encodes");
    let context = user_context(&messages);

    assert_eq!(context["inputs"]["weight"], Value::Null);
    assert_eq!(context["today"], "2024-03-05");
    assert!(context["profile"].is_object());
  }
}
