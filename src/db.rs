use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::llm::RecommendationClient;
use crate::models::{prompt::DEFAULT_PROMPT_VERSION, UserProfile, DEFAULT_SYSTEM_PROMPT};
use crate::store;

pub type DbPool = SqlitePool;

/// Application state shared by every request handler
pub struct AppState {
  pub db: DbPool,
  pub llm: RecommendationClient,
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(database_url: &str) -> Result<DbPool, sqlx::Error> {
  info!(database_url, "Initializing database");

  let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

  // Create connection pool
  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect_with(options)
    .await?;

  // Run migrations
  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}

/// Insert the default profile and prompt when their tables are empty.
/// Safe to run on every startup.
pub async fn seed_defaults(pool: &DbPool) -> Result<(), sqlx::Error> {
  if store::insert_profile_if_absent(pool, &UserProfile::default()).await? {
    info!("Seeded default user profile");
  }

  if store::count_system_prompts(pool).await? == 0 {
    store::insert_system_prompt(pool, DEFAULT_PROMPT_VERSION, DEFAULT_SYSTEM_PROMPT).await?;
    info!(version = DEFAULT_PROMPT_VERSION, "Seeded default system prompt");
  }

  Ok(())
}
