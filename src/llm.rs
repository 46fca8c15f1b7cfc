//! LLM integration for daily coaching recommendations
//!
//! Talks to an OpenAI-style chat-completion endpoint, validates the JSON
//! reply against the four-field recommendation schema and retries with a
//! linear backoff. Without an API key the client answers with a canned
//! recommendation and never touches the network.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::LlmConfig;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

/// Delay before retry `n` is `BACKOFF_STEP * n` (0.5s, 1.0s, ...)
const BACKOFF_STEP: Duration = Duration::from_millis(500);

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LlmError {
  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error (HTTP {status}): {message}")]
  Api { status: u16, message: String },

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("Invalid recommendation: {reason}")]
  Validation { reason: String, raw: String },

  #[error("LLM response failed after {attempts} attempts: {last}")]
  Exhausted { attempts: u32, last: Box<LlmError> },
}

/// ---------------------------------------------------------------------------
/// Chat Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
  pub model: &'a str,
  pub messages: &'a [ChatMessage],
  pub temperature: f32,
  pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
  #[serde(rename = "type")]
  pub format_type: &'static str,
}

impl ResponseFormat {
  pub fn json_object() -> Self {
    Self { format_type: "json_object" }
  }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Recommendation Schema
/// ---------------------------------------------------------------------------

/// The structured answer the model must return. All four fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
  pub recommendation: String,
  pub reasoning: String,
  pub calorie_estimate: String,
  pub next_steps: String,
}

impl Recommendation {
  /// Fixed answer used when no API key is configured
  pub fn canned() -> Self {
    Self {
      recommendation: "Strength train lower body today. Keep it to 90 minutes with controlled tempo squats and hip thrusts.".to_string(),
      reasoning: "Maintains focus on legs/glutes while respecting recovery windows.".to_string(),
      calorie_estimate: "Target ~1,950 kcal with 130g protein and front-load carbs pre-training.".to_string(),
      next_steps: "Warm up, lift, log meals, hydrate. If hunger spikes tonight, add 150-200 kcal protein snack early.".to_string(),
    }
  }
}

/// Outcome of checking a decoded reply against the recommendation schema
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
  Valid(Recommendation),
  Invalid { reason: String, raw: Value },
}

/// Parse a chat-completion response body into a [`ParsedReply`].
///
/// Errors are reserved for bodies that are not JSON at all; JSON that does
/// not fit the schema comes back as `ParsedReply::Invalid` with the payload.
pub fn parse_reply(body: &str) -> Result<ParsedReply, LlmError> {
  let response: Value =
    serde_json::from_str(body).map_err(|e| LlmError::Parse(format!("response body: {}", e)))?;

  let content = response
    .pointer("/choices/0/message/content")
    .cloned()
    .ok_or_else(|| LlmError::Parse("No message content in response".to_string()))?;

  let parsed = match content {
    Value::Object(_) => content,
    Value::String(text) => coerce_json(&text)?,
    other => {
      return Ok(ParsedReply::Invalid {
        reason: "Unsupported LLM response type".to_string(),
        raw: other,
      })
    }
  };

  Ok(validate(parsed))
}

fn validate(parsed: Value) -> ParsedReply {
  match serde_json::from_value::<Recommendation>(parsed.clone()) {
    Ok(rec) => ParsedReply::Valid(rec),
    Err(e) => ParsedReply::Invalid { reason: e.to_string(), raw: parsed },
  }
}

/// Decode string content, repairing fenced or prose-wrapped JSON if needed
fn coerce_json(text: &str) -> Result<Value, LlmError> {
  if let Ok(value) = serde_json::from_str(text) {
    return Ok(value);
  }

  let candidate = extract_json(text)?;
  serde_json::from_str(&candidate)
    .map_err(|e| LlmError::Parse(format!("LLM did not return valid JSON: {}", e)))
}

/// Extract JSON from the model's content (handles markdown code blocks)
fn extract_json(text: &str) -> Result<String, LlmError> {
  // Try direct parse first
  if text.trim().starts_with('{') {
    return Ok(text.trim().to_string());
  }

  // Look for JSON in code blocks
  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  // Last resort: find first { to last }
  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(LlmError::Parse("LLM did not return valid JSON".to_string()))
}

/// ---------------------------------------------------------------------------
/// Seams: transport and clock
/// ---------------------------------------------------------------------------

/// Performs one chat-completion request and returns the raw response body
#[async_trait]
pub trait ChatTransport: Send + Sync {
  async fn send(&self, request: &ChatRequest<'_>) -> Result<String, LlmError>;
}

/// Waits between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
  async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
  async fn sleep(&self, duration: Duration) {
    tokio::time::sleep(duration).await;
  }
}

/// ---------------------------------------------------------------------------
/// HTTP Transport
/// ---------------------------------------------------------------------------

pub struct HttpChatTransport {
  client: Client,
  api_url: Url,
  api_key: String,
}

impl std::fmt::Debug for HttpChatTransport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HttpChatTransport")
      .field("api_url", &self.api_url.as_str())
      .field("api_key", &"[REDACTED]")
      .finish()
  }
}

impl HttpChatTransport {
  pub fn new(api_url: Url, api_key: String, timeout: Duration) -> Result<Self, LlmError> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| LlmError::Request(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self { client, api_url, api_key })
  }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
  async fn send(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
    let response = self
      .client
      .post(self.api_url.clone())
      .bearer_auth(&self.api_key)
      .json(request)
      .send()
      .await
      .map_err(|e| {
        if e.is_timeout() {
          LlmError::Request(format!("timed out: {}", e))
        } else {
          LlmError::Request(e.to_string())
        }
      })?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      // Try to parse error response
      let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|resp| resp.error.message)
        .unwrap_or(body);
      return Err(LlmError::Api { status: status.as_u16(), message });
    }

    Ok(body)
  }
}

/// ---------------------------------------------------------------------------
/// Recommendation Client
/// ---------------------------------------------------------------------------

enum Backend {
  Offline,
  Live { transport: Arc<dyn ChatTransport>, model: String },
}

pub struct RecommendationClient {
  backend: Backend,
  sleeper: Arc<dyn Sleeper>,
  max_attempts: u32,
}

impl RecommendationClient {
  /// Build a client from config: live when an API key is present, canned otherwise
  pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
    match &config.api_key {
      Some(key) => {
        let transport = HttpChatTransport::new(config.api_url.clone(), key.clone(), config.timeout)?;
        Ok(Self::with_transport(Arc::new(transport), &config.model, config.max_retries))
      }
      None => Ok(Self::offline()),
    }
  }

  pub fn offline() -> Self {
    Self {
      backend: Backend::Offline,
      sleeper: Arc::new(TokioSleeper),
      max_attempts: 1,
    }
  }

  pub fn with_transport(transport: Arc<dyn ChatTransport>, model: &str, max_attempts: u32) -> Self {
    Self {
      backend: Backend::Live { transport, model: model.to_string() },
      sleeper: Arc::new(TokioSleeper),
      max_attempts: max_attempts.max(1),
    }
  }

  pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
    self.sleeper = sleeper;
    self
  }

  pub fn is_live(&self) -> bool {
    matches!(self.backend, Backend::Live { .. })
  }

  /// Ask the model for a recommendation, retrying transport, parse and
  /// validation failures up to `max_attempts` times
  pub async fn chat(
    &self,
    messages: &[ChatMessage],
    temperature: f32,
  ) -> Result<Recommendation, LlmError> {
    let (transport, model) = match &self.backend {
      Backend::Offline => return Ok(Recommendation::canned()),
      Backend::Live { transport, model } => (transport, model),
    };

    let request = ChatRequest {
      model,
      messages,
      temperature,
      response_format: ResponseFormat::json_object(),
    };

    let mut last_error: Option<LlmError> = None;

    for attempt in 1..=self.max_attempts {
      match attempt_once(transport.as_ref(), &request).await {
        Ok(rec) => {
          debug!(attempt, "LLM recommendation validated");
          return Ok(rec);
        }
        Err(error) => {
          if attempt < self.max_attempts {
            let delay = BACKOFF_STEP * attempt;
            warn!(
              attempt,
              max_attempts = self.max_attempts,
              delay_ms = delay.as_millis() as u64,
              error = %error,
              "LLM attempt failed, retrying"
            );
            self.sleeper.sleep(delay).await;
          } else {
            warn!(attempt, error = %error, "LLM attempt failed, giving up");
          }
          last_error = Some(error);
        }
      }
    }

    let last = last_error.unwrap_or_else(|| LlmError::Request("no attempt was made".to_string()));
    Err(LlmError::Exhausted { attempts: self.max_attempts, last: Box::new(last) })
  }
}

async fn attempt_once(
  transport: &dyn ChatTransport,
  request: &ChatRequest<'_>,
) -> Result<Recommendation, LlmError> {
  let body = transport.send(request).await?;

  match parse_reply(&body)? {
    ParsedReply::Valid(rec) => Ok(rec),
    ParsedReply::Invalid { reason, raw } => Err(LlmError::Validation { reason, raw: raw.to_string() }),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
