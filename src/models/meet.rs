use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::athlete::Equipment;

/// A logged competition. Upcoming meets carry zeroed lifts until results
/// come in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetEntry {
  pub id: String,
  pub athlete_id: String,
  pub meet_name: String,
  pub meet_date: NaiveDate,
  pub federation: Option<String>,
  pub weight_class: String,
  pub bodyweight: f64,
  pub equipment: Equipment,
  pub actual_squat: f64,
  pub actual_bench: f64,
  pub actual_deadlift: f64,
  pub actual_total: f64,
  pub wilks_score: Option<f64>,
  pub predicted_total: Option<f64>,
  /// actual - predicted
  pub delta: Option<f64>,
  pub placement: Option<i64>,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// For inserting new meet entries (without id, created_at, updated_at)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeetEntry {
  pub athlete_id: String,
  pub meet_name: String,
  pub meet_date: NaiveDate,
  pub federation: Option<String>,
  pub weight_class: String,
  pub bodyweight: f64,
  pub equipment: Equipment,
  pub actual_squat: f64,
  pub actual_bench: f64,
  pub actual_deadlift: f64,
  pub actual_total: f64,
  pub wilks_score: Option<f64>,
  pub predicted_total: Option<f64>,
  pub delta: Option<f64>,
  pub placement: Option<i64>,
  pub notes: Option<String>,
}

/// Partial update for an existing entry. `None` fields keep their stored
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetEntryUpdate {
  pub meet_name: Option<String>,
  pub meet_date: Option<NaiveDate>,
  pub federation: Option<String>,
  pub weight_class: Option<String>,
  pub bodyweight: Option<f64>,
  pub equipment: Option<Equipment>,
  pub actual_squat: Option<f64>,
  pub actual_bench: Option<f64>,
  pub actual_deadlift: Option<f64>,
  pub actual_total: Option<f64>,
  pub wilks_score: Option<f64>,
  pub predicted_total: Option<f64>,
  pub delta: Option<f64>,
  pub placement: Option<i64>,
  pub notes: Option<String>,
}

/// One progress-chart point derived from a meet entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetPerformance {
  pub date: NaiveDate,
  pub total: f64,
  pub predicted: f64,
  pub bodyweight: f64,
  pub wilks: f64,
  pub equipment: Equipment,
}
