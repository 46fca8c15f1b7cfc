//! HTTP-facing error taxonomy
//!
//! Every handler returns `Result<_, AppError>`; the variant decides the
//! status code and the body is always `{"detail": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::llm::LlmError;
use crate::prompting::PromptError;

#[derive(Debug, Error)]
pub enum AppError {
  /// Profile or system prompt absent. Not a fault.
  #[error("{0}")]
  NotFound(&'static str),

  /// The recommendation client gave up
  #[error("LLM call failed: {0}")]
  Upstream(#[from] LlmError),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error(transparent)]
  Prompt(#[from] PromptError),
}

impl AppError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
      AppError::Database(_) | AppError::Prompt(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }

    let body = serde_json::json!({ "detail": self.to_string() });
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_codes() {
    assert_eq!(AppError::NotFound("Profile not set").status_code(), StatusCode::NOT_FOUND);

    let upstream = AppError::from(LlmError::Parse("bad".to_string()));
    assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(upstream.to_string(), "LLM call failed: Parse error: bad");

    let db = AppError::from(sqlx::Error::PoolClosed);
    assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let encode_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let prompt = AppError::from(PromptError::Encode(encode_err));
    assert_eq!(prompt.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(prompt.to_string().starts_with("Failed to encode user context"));
  }
}
