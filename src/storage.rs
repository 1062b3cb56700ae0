//! Namespaced key-value persistence
//!
//! The web build of this product kept session state in browser local
//! storage under a `fitequity_` prefix. This is the same keyspace backed
//! by sqlite, so the transport layer and auth share one well-known home
//! for the bearer token.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::db::DbPool;

const STORAGE_PREFIX: &str = "fitequity_";

/// Well-known key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Well-known key holding the signed-in user.
pub const CURRENT_USER_KEY: &str = "current_user";

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// Cloneable handle over the kv table. Values are stored as JSON.
#[derive(Clone)]
pub struct Storage {
  db: DbPool,
}

impl Storage {
  pub fn new(db: DbPool) -> Self {
    Self { db }
  }

  fn physical_key(key: &str) -> String {
    format!("{}{}", STORAGE_PREFIX, key)
  }

  pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;

    sqlx::query(
      "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, datetime('now'))
       ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(Self::physical_key(key))
    .bind(json)
    .execute(&self.db)
    .await?;

    Ok(())
  }

  pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
      .bind(Self::physical_key(key))
      .fetch_optional(&self.db)
      .await?;

    match row {
      Some((json,)) => Ok(Some(serde_json::from_str(&json)?)),
      None => Ok(None),
    }
  }

  pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM kv_store WHERE key = ?")
      .bind(Self::physical_key(key))
      .execute(&self.db)
      .await?;

    Ok(())
  }

  /// Drops every key in our namespace. Other tables are untouched.
  pub async fn clear(&self) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM kv_store WHERE key LIKE ?")
      .bind(format!("{}%", STORAGE_PREFIX))
      .execute(&self.db)
      .await?;

    Ok(())
  }

  /// Logical key names currently present, prefix stripped.
  pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
    let rows: Vec<(String,)> =
      sqlx::query_as("SELECT key FROM kv_store WHERE key LIKE ? ORDER BY key")
        .bind(format!("{}%", STORAGE_PREFIX))
        .fetch_all(&self.db)
        .await?;

    Ok(
      rows
        .into_iter()
        .map(|(key,)| key.trim_start_matches(STORAGE_PREFIX).to_string())
        .collect(),
    )
  }
}
