//! Test utilities and helpers for unit and router tests
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Seed helpers

use crate::models::{DailyInput, DailyLog, UserProfile};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed one log per date, in the order given. Returns the assigned ids.
pub async fn seed_test_logs(pool: &SqlitePool, dates: &[NaiveDate]) -> Vec<i64> {
  let mut ids = Vec::new();

  for (i, log_date) in dates.iter().enumerate() {
    let result = sqlx::query(
      r#"
      INSERT INTO daily_logs (
        log_date, weight, activity, hunger_level, food_eaten, planned_workout,
        recommendation, reasoning, calorie_estimate, next_steps
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
      "#,
    )
    .bind(log_date)
    .bind(125.0 + i as f64 * 0.2)
    .bind("Lifted")
    .bind("Medium")
    .bind("Oats, chicken, rice")
    .bind("Glutes")
    .bind(format!("Recommendation {}", i))
    .bind("Reasoning")
    .bind("1,900 kcal")
    .bind("Hydrate")
    .execute(pool)
    .await
    .expect("Failed to insert test log");

    ids.push(result.last_insert_rowid());
  }

  ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn mock_profile() -> UserProfile {
  UserProfile {
    sex: "female".to_string(),
    height: "5'4\"".to_string(),
    weight_range: "130-135 lbs".to_string(),
    goal: "maintain strength".to_string(),
    training_style: "powerbuilding 4x/week".to_string(),
    focus_areas: "posterior chain".to_string(),
    gym_closures: "none".to_string(),
    menstrual_cycle_notes: "luteal phase fatigue".to_string(),
    fueling_sensitivity: "gets shaky when under-fueled".to_string(),
    reassurance_needs: "short, direct answers".to_string(),
  }
}

pub fn mock_daily_input() -> DailyInput {
  DailyInput {
    log_date: date(2024, 3, 5),
    weight: Some(127.2),
    activity: Some("8k steps".to_string()),
    hunger_level: Some("Medium".to_string()),
    food_eaten: Some("Greek yogurt, salmon bowl".to_string()),
    planned_workout: Some("Lower body".to_string()),
  }
}

pub fn mock_daily_log(id: i64, log_date: NaiveDate) -> DailyLog {
  DailyLog {
    id,
    log_date,
    weight: Some(126.0),
    activity: Some("Walk".to_string()),
    hunger_level: Some("Low".to_string()),
    food_eaten: None,
    planned_workout: None,
    recommendation: Some("Rest day".to_string()),
    reasoning: Some("Recovery".to_string()),
    calorie_estimate: Some("1,800 kcal".to_string()),
    next_steps: Some("Sleep early".to_string()),
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify all tables exist, auxiliary ones included
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('user_profile', 'system_prompts', 'daily_logs', 'workouts', 'meals')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 5, "Expected 5 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_logs_returns_correct_count() {
    let pool = setup_test_db().await;

    let ids = seed_test_logs(&pool, &[date(2024, 1, 1), date(2024, 1, 2)]).await;
    assert_eq!(ids.len(), 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_logs")
      .fetch_one(&pool)
      .await
      .expect("Failed to count logs");

    assert_eq!(count, 2);

    teardown_test_db(pool).await;
  }
}
