use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

pub type DbPool = SqlitePool;

/// Initialize the database connection pool and run migrations
pub async fn init_db(database_url: &str) -> Result<DbPool, sqlx::Error> {
  info!("Initializing database at {}", database_url);

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await?;

  // Run migrations
  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_init_db_runs_migrations() {
    let pool = init_db("sqlite::memory:").await.unwrap();

    let count: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='kv_store'")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(count, 1);
    pool.close().await;
  }
}
