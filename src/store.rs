//! Record store queries
//!
//! Each function is one independent statement against the pool. The profile
//! lives in a single row with `id = 1`; prompts and logs are append-only.

use sqlx::SqlitePool;

use crate::models::{DailyLog, NewDailyLog, SystemPrompt, UserProfile};

/// Number of past logs included in each prompt
pub const HISTORY_LIMIT: i64 = 7;

/// ---------------------------------------------------------------------------
/// Profile
/// ---------------------------------------------------------------------------

pub async fn load_profile(pool: &SqlitePool) -> Result<Option<UserProfile>, sqlx::Error> {
  sqlx::query_as::<_, UserProfile>(
    r#"
    SELECT sex, height, weight_range, goal, training_style, focus_areas,
           gym_closures, menstrual_cycle_notes, fueling_sensitivity, reassurance_needs
    FROM user_profile
    WHERE id = 1
    "#,
  )
  .fetch_optional(pool)
  .await
}

/// Overwrite the profile row, creating it if absent
pub async fn upsert_profile(pool: &SqlitePool, profile: &UserProfile) -> Result<UserProfile, sqlx::Error> {
  sqlx::query_as::<_, UserProfile>(
    r#"
    INSERT INTO user_profile (
      id, sex, height, weight_range, goal, training_style, focus_areas,
      gym_closures, menstrual_cycle_notes, fueling_sensitivity, reassurance_needs
    )
    VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(id) DO UPDATE SET
      sex = excluded.sex,
      height = excluded.height,
      weight_range = excluded.weight_range,
      goal = excluded.goal,
      training_style = excluded.training_style,
      focus_areas = excluded.focus_areas,
      gym_closures = excluded.gym_closures,
      menstrual_cycle_notes = excluded.menstrual_cycle_notes,
      fueling_sensitivity = excluded.fueling_sensitivity,
      reassurance_needs = excluded.reassurance_needs,
      updated_at = CURRENT_TIMESTAMP
    RETURNING sex, height, weight_range, goal, training_style, focus_areas,
              gym_closures, menstrual_cycle_notes, fueling_sensitivity, reassurance_needs
    "#,
  )
  .bind(&profile.sex)
  .bind(&profile.height)
  .bind(&profile.weight_range)
  .bind(&profile.goal)
  .bind(&profile.training_style)
  .bind(&profile.focus_areas)
  .bind(&profile.gym_closures)
  .bind(&profile.menstrual_cycle_notes)
  .bind(&profile.fueling_sensitivity)
  .bind(&profile.reassurance_needs)
  .fetch_one(pool)
  .await
}

/// Insert the profile only when no row exists yet. Returns true if inserted.
pub async fn insert_profile_if_absent(pool: &SqlitePool, profile: &UserProfile) -> Result<bool, sqlx::Error> {
  let result = sqlx::query(
    r#"
    INSERT INTO user_profile (
      id, sex, height, weight_range, goal, training_style, focus_areas,
      gym_closures, menstrual_cycle_notes, fueling_sensitivity, reassurance_needs
    )
    VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(id) DO NOTHING
    "#,
  )
  .bind(&profile.sex)
  .bind(&profile.height)
  .bind(&profile.weight_range)
  .bind(&profile.goal)
  .bind(&profile.training_style)
  .bind(&profile.focus_areas)
  .bind(&profile.gym_closures)
  .bind(&profile.menstrual_cycle_notes)
  .bind(&profile.fueling_sensitivity)
  .bind(&profile.reassurance_needs)
  .execute(pool)
  .await?;

  Ok(result.rows_affected() > 0)
}

/// ---------------------------------------------------------------------------
/// System Prompts
/// ---------------------------------------------------------------------------

/// The most recently inserted prompt
pub async fn latest_system_prompt(pool: &SqlitePool) -> Result<Option<SystemPrompt>, sqlx::Error> {
  sqlx::query_as::<_, SystemPrompt>(
    "SELECT id, version, content FROM system_prompts ORDER BY id DESC LIMIT 1",
  )
  .fetch_optional(pool)
  .await
}

pub async fn insert_system_prompt(
  pool: &SqlitePool,
  version: &str,
  content: &str,
) -> Result<SystemPrompt, sqlx::Error> {
  sqlx::query_as::<_, SystemPrompt>(
    r#"
    INSERT INTO system_prompts (version, content)
    VALUES (?1, ?2)
    RETURNING id, version, content
    "#,
  )
  .bind(version)
  .bind(content)
  .fetch_one(pool)
  .await
}

pub async fn count_system_prompts(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
  sqlx::query_scalar("SELECT COUNT(*) FROM system_prompts")
    .fetch_one(pool)
    .await
}

/// ---------------------------------------------------------------------------
/// Daily Logs
/// ---------------------------------------------------------------------------

/// Most recent logs first; same-date entries newest first
pub async fn recent_logs(pool: &SqlitePool, limit: i64) -> Result<Vec<DailyLog>, sqlx::Error> {
  sqlx::query_as::<_, DailyLog>(
    r#"
    SELECT id, log_date, weight, activity, hunger_level, food_eaten, planned_workout,
           recommendation, reasoning, calorie_estimate, next_steps
    FROM daily_logs
    ORDER BY log_date DESC, id DESC
    LIMIT ?1
    "#,
  )
  .bind(limit)
  .fetch_all(pool)
  .await
}

pub async fn insert_log(pool: &SqlitePool, log: &NewDailyLog) -> Result<DailyLog, sqlx::Error> {
  sqlx::query_as::<_, DailyLog>(
    r#"
    INSERT INTO daily_logs (
      log_date, weight, activity, hunger_level, food_eaten, planned_workout,
      recommendation, reasoning, calorie_estimate, next_steps
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    RETURNING id, log_date, weight, activity, hunger_level, food_eaten, planned_workout,
              recommendation, reasoning, calorie_estimate, next_steps
    "#,
  )
  .bind(log.log_date)
  .bind(log.weight)
  .bind(&log.activity)
  .bind(&log.hunger_level)
  .bind(&log.food_eaten)
  .bind(&log.planned_workout)
  .bind(&log.recommendation)
  .bind(&log.reasoning)
  .bind(&log.calorie_estimate)
  .bind(&log.next_steps)
  .fetch_one(pool)
  .await
}

pub async fn count_logs(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
  sqlx::query_scalar("SELECT COUNT(*) FROM daily_logs")
    .fetch_one(pool)
    .await
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
