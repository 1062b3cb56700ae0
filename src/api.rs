//! HTTP transport for the prediction backend
//!
//! Every endpoint speaks the same envelope protocol: the body is
//! `{ success, data, error }` regardless of status code. This module owns
//! envelope decoding, bearer-token attachment and the normalization of
//! transport failures into [`ApiError`] values the consumer can display
//! without caring whether the failure was a socket, a status code or a
//! rejected envelope.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::storage::{Storage, AUTH_TOKEN_KEY};

/// ---------------------------------------------------------------------------
/// Wire Envelope
/// ---------------------------------------------------------------------------

/// Standard response wrapper used by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
  pub success: bool,
  pub data: Option<T>,
  pub error: Option<String>,
  pub message: Option<String>,
  pub timestamp: Option<DateTime<Utc>>,
}

/// Normalized failure. Mirrors the backend's error object so local and
/// remote failures render identically.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct ApiError {
  pub code: String,
  pub message: String,
  pub details: Option<serde_json::Value>,
  pub timestamp: DateTime<Utc>,
}

impl ApiError {
  pub fn new(code: &str, message: &str) -> Self {
    Self {
      code: code.to_string(),
      message: message.to_string(),
      details: None,
      timestamp: Utc::now(),
    }
  }

  fn with_status(code: &str, message: &str, status: StatusCode) -> Self {
    Self {
      details: Some(json!({ "status": status.as_u16() })),
      ..Self::new(code, message)
    }
  }

  fn from_reqwest(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      Self::new("TIMEOUT", "Request timed out")
    } else if err.is_connect() {
      Self::new("NETWORK_ERROR", "Could not reach the prediction service")
    } else if err.is_decode() {
      Self::new("DECODE_ERROR", "Malformed response from the prediction service")
    } else {
      Self::new("REQUEST_ERROR", &err.to_string())
    }
  }
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

// Endpoints still served by local mock data during development. A 401
// from these must not invalidate the stored session.
const MOCK_ENDPOINT_PREFIXES: [&str; 3] = ["/api/auth/", "/api/meets/", "/api/coach/"];

fn is_mock_endpoint(path: &str) -> bool {
  MOCK_ENDPOINT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

#[derive(Clone)]
pub struct ApiClient {
  http: Client,
  base_url: String,
  storage: Storage,
}

impl ApiClient {
  pub fn new(config: &Config, storage: Storage) -> Self {
    let http = Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .build()
      .expect("Failed to create HTTP client");

    Self {
      http,
      base_url: config.api_base_url.trim_end_matches('/').to_string(),
      storage,
    }
  }

  pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
    self.request(Method::GET, path, None).await
  }

  pub async fn post<B: Serialize, R: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<R, ApiError> {
    let body = serde_json::to_value(body)
      .map_err(|e| ApiError::new("ENCODE_ERROR", &e.to_string()))?;
    self.request(Method::POST, path, Some(body)).await
  }

  pub async fn put<B: Serialize, R: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<R, ApiError> {
    let body = serde_json::to_value(body)
      .map_err(|e| ApiError::new("ENCODE_ERROR", &e.to_string()))?;
    self.request(Method::PUT, path, Some(body)).await
  }

  /// POST for endpoints that acknowledge with a bare success flag and no
  /// data payload.
  pub async fn post_ok<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
    let body = serde_json::to_value(body)
      .map_err(|e| ApiError::new("ENCODE_ERROR", &e.to_string()))?;
    let envelope: ApiEnvelope<serde_json::Value> =
      self.request_envelope(Method::POST, path, Some(body)).await?;

    if !envelope.success {
      return Err(ApiError::new("API_ERROR", &rejection_message(envelope.error, envelope.message)));
    }
    Ok(())
  }

  /// True when `GET /health` answers with a 2xx.
  pub async fn health_check(&self) -> bool {
    let url = format!("{}/health", self.base_url);
    match self.http.get(&url).send().await {
      Ok(response) => response.status().is_success(),
      Err(_) => false,
    }
  }

  async fn request<R: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
  ) -> Result<R, ApiError> {
    let envelope: ApiEnvelope<R> = self.request_envelope(method, path, body).await?;

    if !envelope.success {
      return Err(ApiError::new("API_ERROR", &rejection_message(envelope.error, envelope.message)));
    }
    envelope
      .data
      .ok_or_else(|| ApiError::new("API_ERROR", "Response envelope carried no data"))
  }

  async fn request_envelope<R: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
  ) -> Result<ApiEnvelope<R>, ApiError> {
    let url = format!("{}{}", self.base_url, path);
    debug!("{} {}", method, path);

    let mut request = self.http.request(method, &url);
    if let Some(token) = self.auth_token().await {
      request = request.bearer_auth(token);
    }
    if let Some(body) = &body {
      request = request.json(body);
    }

    let response = request.send().await.map_err(ApiError::from_reqwest)?;
    let status = response.status();
    debug!("{} responded {}", path, status.as_u16());

    if !status.is_success() {
      if status == StatusCode::UNAUTHORIZED && !is_mock_endpoint(path) {
        warn!("Session rejected by {}, clearing stored token", path);
        if let Err(err) = self.storage.remove(AUTH_TOKEN_KEY).await {
          warn!("Failed to clear stored token: {}", err);
        }
      }

      let fallback = format!("Request failed with status {}", status.as_u16());
      let message = match response.json::<ApiEnvelope<serde_json::Value>>().await {
        Ok(envelope) => envelope.error.or(envelope.message).unwrap_or(fallback),
        Err(_) => fallback,
      };
      return Err(ApiError::with_status(&format!("HTTP_{}", status.as_u16()), &message, status));
    }

    response.json::<ApiEnvelope<R>>().await.map_err(ApiError::from_reqwest)
  }

  /// Storage failures degrade to an unauthenticated request rather than
  /// blocking the call.
  async fn auth_token(&self) -> Option<String> {
    match self.storage.get::<String>(AUTH_TOKEN_KEY).await {
      Ok(token) => token,
      Err(err) => {
        warn!("Token lookup failed: {}", err);
        None
      }
    }
  }
}

fn rejection_message(error: Option<String>, message: Option<String>) -> String {
  error
    .or(message)
    .unwrap_or_else(|| "Request was rejected".to_string())
}
