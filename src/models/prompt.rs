use serde::{Deserialize, Serialize};

/// Persona used when no system prompt has been stored, and seeded as `v1`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a calm, supportive fitness and nutrition coach. \
You provide concise, structured guidance focusing on sustainable fat loss while maintaining muscle. \
Always consider menstrual cycle effects, under-fueling risks, and gym closures.";

/// Version label given to the seeded default prompt
pub const DEFAULT_PROMPT_VERSION: &str = "v1";

/// One row of the append-only prompt history
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SystemPrompt {
  pub id: i64,
  pub version: String,
  pub content: String,
}

/// Request and response body for `/system-prompt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPromptPayload {
  pub version: String,
  pub content: String,
}

impl From<SystemPrompt> for SystemPromptPayload {
  fn from(row: SystemPrompt) -> Self {
    Self {
      version: row.version,
      content: row.content,
    }
  }
}
