//! Profile and credential validation
//!
//! Every rule runs; violations accumulate in a fixed order so the
//! consumer can render the complete list at once instead of fixing
//! problems one at a time.

use serde::{Deserialize, Serialize};

use crate::models::AthleteProfile;

pub const MIN_AGE: i64 = 10;
pub const MAX_AGE: i64 = 90;
pub const MIN_BODYWEIGHT: f64 = 30.0;
pub const MAX_BODYWEIGHT: f64 = 300.0;
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub is_valid: bool,
  pub errors: Vec<String>,
}

impl ValidationResult {
  fn from_errors(errors: Vec<String>) -> Self {
    Self { is_valid: errors.is_empty(), errors }
  }
}

/// Range checks for a profile. Sex and equipment arrive as closed enums,
/// so their original must-be-specified checks hold by construction.
pub fn validate_athlete_profile(profile: &AthleteProfile) -> ValidationResult {
  let mut errors = Vec::new();

  if profile.age < MIN_AGE || profile.age > MAX_AGE {
    errors.push(format!("Age must be between {} and {}", MIN_AGE, MAX_AGE));
  }

  if profile.bodyweight < MIN_BODYWEIGHT || profile.bodyweight > MAX_BODYWEIGHT {
    errors.push(format!(
      "Bodyweight must be between {} and {} kg",
      MIN_BODYWEIGHT, MAX_BODYWEIGHT
    ));
  }

  ValidationResult::from_errors(errors)
}

/// Same shape the signup form used: non-empty local part, non-empty
/// domain with an interior dot, no whitespace, single `@`.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }

  let mut parts = email.split('@');
  match (parts.next(), parts.next(), parts.next()) {
    (Some(local), Some(domain), None) => {
      !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
    }
    _ => false,
  }
}

pub fn validate_password(password: &str) -> ValidationResult {
  let mut errors = Vec::new();

  if password.len() < MIN_PASSWORD_LENGTH {
    errors.push(format!(
      "Password must be at least {} characters long",
      MIN_PASSWORD_LENGTH
    ));
  }
  if !password.chars().any(|c| c.is_ascii_lowercase()) {
    errors.push("Password must contain at least one lowercase letter".to_string());
  }
  if !password.chars().any(|c| c.is_ascii_uppercase()) {
    errors.push("Password must contain at least one uppercase letter".to_string());
  }
  if !password.chars().any(|c| c.is_ascii_digit()) {
    errors.push("Password must contain at least one number".to_string());
  }

  ValidationResult::from_errors(errors)
}
