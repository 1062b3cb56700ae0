//! Environment-driven configuration
//!
//! Everything has a local-development default so the library runs with an
//! empty environment. A `.env` file is honored when present.

use std::env;

use thiserror::Error;

pub const APP_VERSION: &str = "1.0.0";

const DEFAULT_APP_NAME: &str = "Strength Compass";
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_DATABASE_URL: &str = "sqlite:strength_compass.db?mode=rwc";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Invalid value for {0}: {1}")]
  InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
  pub app_name: String,
  pub api_base_url: String,
  pub database_url: String,
  pub request_timeout_secs: u64,
  /// Allows the demo accounts to log in without a backend.
  pub demo_mode: bool,
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();

    let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
      Ok(raw) => raw
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS", raw))?,
      Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
    };

    Ok(Self {
      app_name: env::var("APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string()),
      api_base_url: env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
      database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
      request_timeout_secs,
      demo_mode: env::var("DEMO_MODE")
        .map(|raw| !matches!(raw.to_lowercase().as_str(), "0" | "false"))
        .unwrap_or(true),
    })
  }

  /// Config pointed at a specific backend, defaults elsewhere. Used by
  /// tests and by consumers that manage their own endpoint selection.
  pub fn with_base_url(base_url: &str) -> Self {
    Self {
      app_name: DEFAULT_APP_NAME.to_string(),
      api_base_url: base_url.to_string(),
      database_url: DEFAULT_DATABASE_URL.to_string(),
      request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
      demo_mode: true,
    }
  }
}
