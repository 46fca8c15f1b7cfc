use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::llm::Recommendation;

/// A stored coaching interaction. Several rows may share a `log_date`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyLog {
  pub id: i64,
  pub log_date: NaiveDate,
  pub weight: Option<f64>,
  pub activity: Option<String>,
  pub hunger_level: Option<String>,
  pub food_eaten: Option<String>,
  pub planned_workout: Option<String>,
  pub recommendation: Option<String>,
  pub reasoning: Option<String>,
  pub calorie_estimate: Option<String>,
  pub next_steps: Option<String>,
}

/// For inserting new logs (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDailyLog {
  pub log_date: NaiveDate,
  pub weight: Option<f64>,
  pub activity: Option<String>,
  pub hunger_level: Option<String>,
  pub food_eaten: Option<String>,
  pub planned_workout: Option<String>,
  pub recommendation: Option<String>,
  pub reasoning: Option<String>,
  pub calorie_estimate: Option<String>,
  pub next_steps: Option<String>,
}

impl NewDailyLog {
  /// Merge today's raw inputs with a validated recommendation
  pub fn from_coaching(input: &DailyInput, rec: &Recommendation) -> Self {
    Self {
      log_date: input.log_date,
      weight: input.weight,
      activity: input.activity.clone(),
      hunger_level: input.hunger_level.clone(),
      food_eaten: input.food_eaten.clone(),
      planned_workout: input.planned_workout.clone(),
      recommendation: Some(rec.recommendation.clone()),
      reasoning: Some(rec.reasoning.clone()),
      calorie_estimate: Some(rec.calorie_estimate.clone()),
      next_steps: Some(rec.next_steps.clone()),
    }
  }
}

/// What the user reports for the day when asking for coaching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInput {
  pub log_date: NaiveDate,
  #[serde(default)]
  pub weight: Option<f64>,
  #[serde(default)]
  pub activity: Option<String>,
  /// Low / Medium / High
  #[serde(default)]
  pub hunger_level: Option<String>,
  #[serde(default)]
  pub food_eaten: Option<String>,
  #[serde(default)]
  pub planned_workout: Option<String>,
}

/// Body returned by `/coach` and each element of `/logs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachResponse {
  pub log_id: i64,
  pub recommendation: String,
  pub reasoning: String,
  pub calorie_estimate: String,
  pub next_steps: String,
}

impl From<&DailyLog> for CoachResponse {
  fn from(log: &DailyLog) -> Self {
    Self {
      log_id: log.id,
      recommendation: log.recommendation.clone().unwrap_or_default(),
      reasoning: log.reasoning.clone().unwrap_or_default(),
      calorie_estimate: log.calorie_estimate.clone().unwrap_or_default(),
      next_steps: log.next_steps.clone().unwrap_or_default(),
    }
  }
}
