use serde::{Deserialize, Serialize};

/// The single user profile that every prompt is personalised with.
///
/// Stored as one row with a fixed id. The same `Default` values seed the
/// table on first startup and stand in for the row when it is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
  pub sex: String,
  pub height: String,
  pub weight_range: String,
  pub goal: String,
  pub training_style: String,
  pub focus_areas: String,
  pub gym_closures: String,
  pub menstrual_cycle_notes: String,
  pub fueling_sensitivity: String,
  pub reassurance_needs: String,
}

impl Default for UserProfile {
  fn default() -> Self {
    Self {
      sex: "female".to_string(),
      height: "5'1\"".to_string(),
      weight_range: "120-130 lbs".to_string(),
      goal: "fat loss while maintaining muscle".to_string(),
      training_style: "weights 1.5-2h".to_string(),
      focus_areas: "legs, glutes, core".to_string(),
      gym_closures: "Sunday closures".to_string(),
      menstrual_cycle_notes: "regular cycle impacts energy and water".to_string(),
      fueling_sensitivity: "sensitive to under-fueling and late-night hunger".to_string(),
      reassurance_needs: "wants reassurance and clear decision support".to_string(),
    }
  }
}
