use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::athlete::AthleteProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Athlete,
  Coach,
  Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: String,
  pub email: String,
  pub name: String,
  pub role: UserRole,
  pub profile: Option<AthleteProfile>,
  pub created_at: DateTime<Utc>,
  pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
  pub email: String,
  pub password: String,
  pub remember_me: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
  pub email: String,
  pub password: String,
  pub name: String,
  pub role: Option<UserRole>,
}

/// Partial update for the authenticated user's account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
  pub name: Option<String>,
  pub email: Option<String>,
  pub profile: Option<AthleteProfile>,
}

/// What a successful login or registration hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
  pub user: User,
  pub token: String,
}
