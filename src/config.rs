//! Environment-driven configuration
//!
//! Every setting has a literal default so the service starts with an empty
//! environment. A missing `LLM_API_KEY` is not an error: the coach then runs
//! with its canned offline recommendation.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

const DEFAULT_APP_NAME: &str = "Local Fitness Coach";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_DATABASE_URL: &str = "sqlite://fitness.db?mode=rwc";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:8000,*";
const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LLM_MAX_RETRIES: u32 = 3;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {reason}")]
  Invalid { name: &'static str, reason: String },
}

/// ---------------------------------------------------------------------------
/// Config Structures
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub app_name: String,
  pub bind_addr: SocketAddr,
  pub database_url: String,
  pub allowed_origins: Vec<String>,
  pub llm: LlmConfig,
}

#[derive(Clone)]
pub struct LlmConfig {
  pub api_url: Url,
  pub api_key: Option<String>,
  pub model: String,
  pub timeout: Duration,
  pub max_retries: u32,
}

impl std::fmt::Debug for LlmConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LlmConfig")
      .field("api_url", &self.api_url.as_str())
      .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
      .field("model", &self.model)
      .field("timeout", &self.timeout)
      .field("max_retries", &self.max_retries)
      .finish()
  }
}

#[cfg(test)]
impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      api_url: Url::parse(DEFAULT_LLM_API_URL).expect("default LLM URL is valid"),
      api_key: None,
      model: DEFAULT_LLM_MODEL.to_string(),
      timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
      max_retries: DEFAULT_LLM_MAX_RETRIES,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let bind_addr = var_or("BIND_ADDR", DEFAULT_BIND_ADDR)
      .parse::<SocketAddr>()
      .map_err(|e| ConfigError::Invalid { name: "BIND_ADDR", reason: e.to_string() })?;

    Ok(Self {
      app_name: var_or("APP_NAME", DEFAULT_APP_NAME),
      bind_addr,
      database_url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
      allowed_origins: parse_origins(&var_or("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)),
      llm: LlmConfig::from_env()?,
    })
  }
}

impl LlmConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let api_url = Url::parse(&var_or("LLM_API_URL", DEFAULT_LLM_API_URL))
      .map_err(|e| ConfigError::Invalid { name: "LLM_API_URL", reason: e.to_string() })?;

    let api_key = env::var("LLM_API_KEY")
      .ok()
      .map(|key| key.trim().to_string())
      .filter(|key| !key.is_empty());

    let timeout_secs = parse_number("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?;
    let max_retries = parse_number("LLM_MAX_RETRIES", DEFAULT_LLM_MAX_RETRIES)?;

    Ok(Self {
      api_url,
      api_key,
      model: var_or("LLM_MODEL", DEFAULT_LLM_MODEL),
      timeout: Duration::from_secs(timeout_secs.max(1)),
      max_retries: max_retries.max(1),
    })
  }
}

/// ---------------------------------------------------------------------------
/// Helpers
/// ---------------------------------------------------------------------------

fn var_or(name: &str, default: &str) -> String {
  env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_number<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| ConfigError::Invalid { name, reason: e.to_string() }),
    Err(_) => Ok(default),
  }
}

fn parse_origins(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|origin| !origin.is_empty())
    .map(String::from)
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
