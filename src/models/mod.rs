pub mod log;
pub mod profile;
pub mod prompt;

pub use log::{CoachResponse, DailyInput, DailyLog, NewDailyLog};
pub use profile::UserProfile;
pub use prompt::{SystemPrompt, SystemPromptPayload, DEFAULT_SYSTEM_PROMPT};
