//! Shared test infrastructure
//!
//! In-memory database setup/teardown, fixture factories for profiles,
//! predictions, scenarios and meet entries, and float assertions.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{
  AthleteProfile, Equipment, NewMeetEntry, PredictionMetadata, PredictionResponse, Sex,
  WhatIfScenario,
};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A valid athlete profile sitting comfortably inside every range.
pub fn mock_profile() -> AthleteProfile {
  AthleteProfile {
    id: Some("athlete-1".to_string()),
    sex: Sex::M,
    age: 28,
    bodyweight: 83.0,
    equipment: Equipment::Raw,
    weight_class: Some("83kg".to_string()),
    experience: None,
    goals: None,
  }
}

/// A fully populated remote-style prediction for a given total.
pub fn mock_prediction(total: f64) -> PredictionResponse {
  PredictionResponse {
    total_pred: total,
    squat_pred: Some((total * 0.38).round()),
    bench_pred: Some((total * 0.25).round()),
    deadlift_pred: Some((total * 0.37).round()),
    wilks_pred: Some(310.0),
    pi_low: Some((total * 0.9).round()),
    pi_high: Some((total * 1.1).round()),
    percentile: Some(68),
    confidence: Some(0.87),
    metadata: Some(PredictionMetadata {
      model_version: "gbm-v2.3".to_string(),
      prediction_date: Utc::now(),
      features_used: vec![
        "sex".to_string(),
        "age".to_string(),
        "bodyweight".to_string(),
        "equipment".to_string(),
      ],
    }),
  }
}

/// A labeled what-if scenario.
pub fn mock_scenario(label: &str) -> WhatIfScenario {
  WhatIfScenario {
    age_adjustment: 2,
    bodyweight_adjustment: 5.0,
    equipment_change: None,
    scenario_name: Some(label.to_string()),
  }
}

/// A completed meet for an athlete, dated in the past.
pub fn mock_new_meet(athlete_id: &str, total: f64, date: NaiveDate) -> NewMeetEntry {
  NewMeetEntry {
    athlete_id: athlete_id.to_string(),
    meet_name: "Test Open".to_string(),
    meet_date: date,
    federation: Some("USAPL".to_string()),
    weight_class: "83kg".to_string(),
    bodyweight: 82.4,
    equipment: Equipment::Raw,
    actual_squat: (total * 0.38).round(),
    actual_bench: (total * 0.25).round(),
    actual_deadlift: total - (total * 0.38).round() - (total * 0.25).round(),
    actual_total: total,
    wilks_score: Some(305.5),
    predicted_total: Some(total - 5.0),
    delta: Some(5.0),
    placement: Some(3),
    notes: None,
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validation::validate_athlete_profile;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('kv_store', 'meets', 'roster', 'coach_alerts')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {:?}", tables);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_profile_is_valid() {
    let result = validate_athlete_profile(&mock_profile());
    assert!(result.is_valid, "fixture profile must pass validation: {:?}", result.errors);
  }

  #[test]
  fn test_mock_prediction_is_internally_consistent() {
    let p = mock_prediction(500.0);

    assert_eq!(p.total_pred, 500.0);
    assert_eq!(p.pi_low, Some(450.0));
    assert_eq!(p.pi_high, Some(550.0));
    assert!(p.metadata.is_some());
  }
}
