//! Authentication service
//!
//! Sessions live in the same key-value storage the transport layer reads
//! its bearer token from, so a login here authenticates every subsequent
//! API call. In demo mode the two demo accounts short-circuit the
//! network entirely with a locally minted session.

use chrono::{TimeZone, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{AuthSession, LoginCredentials, RegisterData, User, UserRole, UserUpdate};
use crate::storage::{Storage, StorageError, AUTH_TOKEN_KEY, CURRENT_USER_KEY};

const DEMO_ATHLETE_EMAIL: &str = "demo@athlete.com";
const DEMO_COACH_EMAIL: &str = "demo@coach.com";

#[derive(Debug, Error)]
pub enum AuthError {
  #[error(transparent)]
  Api(#[from] ApiError),
  #[error(transparent)]
  Storage(#[from] StorageError),
}

pub struct AuthService {
  api: ApiClient,
  storage: Storage,
  demo_mode: bool,
}

impl AuthService {
  pub fn new(api: ApiClient, storage: Storage, demo_mode: bool) -> Self {
    Self { api, storage, demo_mode }
  }

  /// Log in, persisting the session on success. Demo accounts accept any
  /// password and never touch the network.
  pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthSession, AuthError> {
    info!("Attempting login for {}", credentials.email);

    if self.demo_mode && is_demo_email(&credentials.email) {
      let session = demo_session(&credentials.email);
      self.persist_session(&session).await?;
      info!("Demo login for {}", session.user.id);
      return Ok(session);
    }

    let body = serde_json::json!({
      "email": credentials.email,
      "password": credentials.password,
      "rememberMe": credentials.remember_me,
    });
    let session: AuthSession = self.api.post("/api/auth/login", &body).await?;

    self.persist_session(&session).await?;
    info!("Login successful for {}", session.user.id);
    Ok(session)
  }

  /// Register a new account; role defaults to athlete.
  pub async fn register(&self, data: &RegisterData) -> Result<AuthSession, AuthError> {
    info!("Attempting registration for {}", data.email);

    let body = serde_json::json!({
      "name": data.name,
      "email": data.email,
      "password": data.password,
      "role": data.role.unwrap_or(UserRole::Athlete),
    });
    let session: AuthSession = self.api.post("/api/auth/register", &body).await?;

    self.persist_session(&session).await?;
    info!("Registration successful for {}", session.user.id);
    Ok(session)
  }

  /// End the session. The remote call is best-effort; local cleanup
  /// always happens.
  pub async fn logout(&self) -> Result<(), AuthError> {
    if let Err(err) = self.api.post_ok("/api/auth/logout", &serde_json::json!({})).await {
      warn!("Logout API call failed ({}), proceeding with local cleanup", err);
    }

    self.storage.remove(AUTH_TOKEN_KEY).await?;
    self.storage.remove(CURRENT_USER_KEY).await?;
    info!("User logged out");
    Ok(())
  }

  /// The locally stored user, if a session exists.
  pub async fn current_user(&self) -> Result<Option<User>, AuthError> {
    Ok(self.storage.get(CURRENT_USER_KEY).await?)
  }

  pub async fn is_authenticated(&self) -> Result<bool, AuthError> {
    Ok(self.storage.get::<String>(AUTH_TOKEN_KEY).await?.is_some())
  }

  /// Refresh the user from the backend and update the stored copy.
  pub async fn fetch_current_user(&self) -> Result<User, AuthError> {
    let user: User = self.api.get("/api/auth/me").await?;
    self.storage.set(CURRENT_USER_KEY, &user).await?;
    Ok(user)
  }

  /// Push account changes and update the stored user with the echo.
  pub async fn update_profile(&self, updates: &UserUpdate) -> Result<User, AuthError> {
    let user: User = self.api.put("/api/auth/profile", updates).await?;
    self.storage.set(CURRENT_USER_KEY, &user).await?;
    Ok(user)
  }

  pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
    self
      .api
      .post_ok("/api/auth/forgot-password", &serde_json::json!({ "email": email }))
      .await?;
    info!("Password reset requested for {}", email);
    Ok(())
  }

  pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
    self
      .api
      .post_ok(
        "/api/auth/reset-password",
        &serde_json::json!({ "token": token, "password": new_password }),
      )
      .await?;
    info!("Password reset successful");
    Ok(())
  }

  async fn persist_session(&self, session: &AuthSession) -> Result<(), AuthError> {
    self.storage.set(AUTH_TOKEN_KEY, &session.token).await?;
    self.storage.set(CURRENT_USER_KEY, &session.user).await?;
    Ok(())
  }
}

fn is_demo_email(email: &str) -> bool {
  email == DEMO_ATHLETE_EMAIL || email == DEMO_COACH_EMAIL
}

fn demo_session(email: &str) -> AuthSession {
  let is_coach = email == DEMO_COACH_EMAIL;

  AuthSession {
    user: User {
      id: if is_coach { "coach-1" } else { "athlete-1" }.to_string(),
      email: email.to_string(),
      name: if is_coach { "Demo Coach" } else { "Demo Athlete" }.to_string(),
      role: if is_coach { UserRole::Coach } else { UserRole::Athlete },
      profile: None,
      created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
      last_login_at: None,
    },
    token: format!("mock-jwt-token-{}", Utc::now().timestamp_millis()),
  }
}
