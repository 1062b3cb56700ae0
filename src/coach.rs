//! Coach dashboard assembly
//!
//! Roster rows, meet data and the alert feed come out of sqlite; the
//! team statistics are aggregated from what is actually on the roster
//! rather than stored alongside it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::DbPool;
use crate::meetlog::{MeetLog, MeetLogError};
use crate::models::{
  AlertType, AthleteWithMetrics, CoachAlert, CoachDashboardData, Equipment, NewMeetEntry,
  PredictionResponse, Severity, Sex, TeamStatistics,
};

#[derive(Debug, Error)]
pub enum CoachError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
  #[error("Coach dashboard data not found")]
  DashboardNotFound,
  #[error("Athlete not found")]
  AthleteNotFound,
  #[error("Alert not found")]
  AlertNotFound,
  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
  #[error(transparent)]
  MeetLog(#[from] MeetLogError),
  #[error("Invalid stored value: {0}")]
  Decode(String),
}

#[derive(sqlx::FromRow)]
struct RosterRow {
  id: String,
  #[allow(dead_code)]
  coach_id: Option<String>,
  name: String,
  email: String,
  sex: String,
  age: i64,
  bodyweight: f64,
  equipment: String,
  weight_class: Option<String>,
  experience: Option<String>,
  last_prediction_json: Option<String>,
  recent_progress: f64,
  risk_flags_json: String,
  prediction_accuracy: f64,
}

#[derive(sqlx::FromRow)]
struct AlertRow {
  id: String,
  #[allow(dead_code)]
  coach_id: String,
  athlete_id: String,
  athlete_name: String,
  alert_type: String,
  severity: String,
  message: String,
  action_required: bool,
  created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for CoachAlert {
  type Error = CoachError;

  fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
    Ok(CoachAlert {
      id: row.id,
      athlete_id: row.athlete_id,
      athlete_name: row.athlete_name,
      alert_type: row.alert_type.parse().map_err(CoachError::Decode)?,
      severity: row.severity.parse().map_err(CoachError::Decode)?,
      message: row.message,
      action_required: row.action_required,
      created_at: row.created_at,
    })
  }
}

pub struct CoachService {
  db: DbPool,
  meets: MeetLog,
}

impl CoachService {
  pub fn new(db: DbPool) -> Self {
    let meets = MeetLog::new(db.clone());
    Self { db, meets }
  }

  /// Everything the coach view renders, assembled from the roster, the
  /// meet log and the alert feed. A coach with no rostered athletes has
  /// no dashboard.
  pub async fn dashboard(&self, coach_id: &str) -> Result<CoachDashboardData, CoachError> {
    let rows: Vec<RosterRow> =
      sqlx::query_as("SELECT * FROM roster WHERE coach_id = ? ORDER BY name")
        .bind(coach_id)
        .fetch_all(&self.db)
        .await?;

    if rows.is_empty() {
      return Err(CoachError::DashboardNotFound);
    }
    debug!("Assembling dashboard for {} with {} athletes", coach_id, rows.len());

    let today = Utc::now().date_naive();
    let mut athletes = Vec::with_capacity(rows.len());
    let mut upcoming_meets = Vec::new();

    for row in rows {
      let athlete_upcoming = self.meets.upcoming_meets(&row.id, today).await?;
      let next_meet = athlete_upcoming.first().cloned();
      upcoming_meets.extend(athlete_upcoming);

      athletes.push(athlete_from_row(row, next_meet)?);
    }
    upcoming_meets.sort_by_key(|meet| meet.meet_date);

    let team_stats = team_statistics(&athletes, upcoming_meets.len() as i64);

    let alert_rows: Vec<AlertRow> =
      sqlx::query_as("SELECT * FROM coach_alerts WHERE coach_id = ? ORDER BY created_at DESC")
        .bind(coach_id)
        .fetch_all(&self.db)
        .await?;
    let alerts = alert_rows
      .into_iter()
      .map(CoachAlert::try_from)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(CoachDashboardData { athletes, team_stats, upcoming_meets, alerts })
  }

  /// Put an existing athlete on this coach's roster.
  pub async fn add_athlete(&self, coach_id: &str, athlete_id: &str) -> Result<(), CoachError> {
    let result = sqlx::query("UPDATE roster SET coach_id = ? WHERE id = ?")
      .bind(coach_id)
      .bind(athlete_id)
      .execute(&self.db)
      .await?;

    if result.rows_affected() == 0 {
      return Err(CoachError::AthleteNotFound);
    }

    info!("Athlete {} added to coach {}", athlete_id, coach_id);
    Ok(())
  }

  /// Take an athlete off the roster. Removing someone who was never
  /// rostered is a no-op.
  pub async fn remove_athlete(&self, coach_id: &str, athlete_id: &str) -> Result<(), CoachError> {
    sqlx::query("UPDATE roster SET coach_id = NULL WHERE id = ? AND coach_id = ?")
      .bind(athlete_id)
      .bind(coach_id)
      .execute(&self.db)
      .await?;

    info!("Athlete {} removed from coach {}", athlete_id, coach_id);
    Ok(())
  }

  pub async fn dismiss_alert(&self, alert_id: &str) -> Result<(), CoachError> {
    let result = sqlx::query("DELETE FROM coach_alerts WHERE id = ?")
      .bind(alert_id)
      .execute(&self.db)
      .await?;

    if result.rows_affected() == 0 {
      return Err(CoachError::AlertNotFound);
    }

    info!("Alert {} dismissed", alert_id);
    Ok(())
  }

  /// Install the demo roster, one upcoming meet and two alerts for a
  /// coach. Safe to call more than once. The meet is dated eight weeks
  /// out from seeding so the dashboard stays live.
  pub async fn seed_demo_team(&self, coach_id: &str) -> Result<(), CoachError> {
    let athletes = [
      demo_athlete(
        "athlete-1",
        "Sarah Johnson",
        "demo@athlete.com",
        Sex::F,
        28,
        68.5,
        Equipment::Raw,
        demo_prediction(450.0, 430.0, 470.0, 0.87, 72),
        8.5,
        vec![],
        12.3,
      ),
      demo_athlete(
        "athlete-2",
        "Marcus Chen",
        "athlete2@demo.com",
        Sex::M,
        32,
        82.1,
        Equipment::Wraps,
        demo_prediction(590.0, 570.0, 610.0, 0.82, 68),
        -2.1,
        vec!["performance_drop".to_string()],
        18.7,
      ),
      demo_athlete(
        "athlete-3",
        "Alex Rivera",
        "alex@demo.com",
        Sex::Mx,
        25,
        75.2,
        Equipment::Raw,
        demo_prediction(420.0, 405.0, 435.0, 0.89, 78),
        15.2,
        vec![],
        9.8,
      ),
    ];

    for athlete in &athletes {
      sqlx::query(
        r#"
        INSERT OR IGNORE INTO roster (
          id, coach_id, name, email, sex, age, bodyweight, equipment,
          weight_class, experience, last_prediction_json, recent_progress,
          risk_flags_json, prediction_accuracy
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
      )
      .bind(&athlete.id)
      .bind(coach_id)
      .bind(&athlete.name)
      .bind(&athlete.email)
      .bind(athlete.sex.to_string())
      .bind(athlete.age)
      .bind(athlete.bodyweight)
      .bind(athlete.equipment.to_string())
      .bind(&athlete.weight_class)
      .bind(athlete.experience.map(|e| e.to_string()))
      .bind(
        athlete
          .last_prediction
          .as_ref()
          .map(serde_json::to_string)
          .transpose()?,
      )
      .bind(athlete.recent_progress)
      .bind(serde_json::to_string(&athlete.risk_flags)?)
      .bind(athlete.prediction_accuracy)
      .execute(&self.db)
      .await?;
    }

    let meet_date = Utc::now().date_naive() + Duration::weeks(8);
    self
      .seed_upcoming_meet(NewMeetEntry {
        athlete_id: "athlete-1".to_string(),
        meet_name: "National Championships".to_string(),
        meet_date,
        federation: Some("USAPL".to_string()),
        weight_class: "69kg".to_string(),
        bodyweight: 68.5,
        equipment: Equipment::Raw,
        actual_squat: 0.0,
        actual_bench: 0.0,
        actual_deadlift: 0.0,
        actual_total: 0.0,
        wilks_score: None,
        predicted_total: None,
        delta: None,
        placement: None,
        notes: None,
      })
      .await?;

    let now = Utc::now();
    let alerts = [
      (
        "alert-demo-1",
        "athlete-2",
        "Marcus Chen",
        AlertType::PerformanceDrop,
        Severity::Medium,
        "Recent training data shows a 2.1% decrease in predicted performance. \
         Consider reviewing training load and recovery.",
        true,
        now,
      ),
      (
        "alert-demo-2",
        "athlete-1",
        "Sarah Johnson",
        AlertType::MeetApproaching,
        Severity::Low,
        "National Championships in 8 weeks. Time to finalize competition strategy and peak.",
        false,
        now - Duration::minutes(30),
      ),
    ];

    for (id, athlete_id, athlete_name, alert_type, severity, message, action, created) in alerts {
      sqlx::query(
        r#"
        INSERT OR IGNORE INTO coach_alerts (
          id, coach_id, athlete_id, athlete_name, alert_type, severity,
          message, action_required, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
      )
      .bind(id)
      .bind(coach_id)
      .bind(athlete_id)
      .bind(athlete_name)
      .bind(alert_type.to_string())
      .bind(severity.to_string())
      .bind(message)
      .bind(action)
      .bind(created)
      .execute(&self.db)
      .await?;
    }

    Ok(())
  }

  async fn seed_upcoming_meet(&self, meet: NewMeetEntry) -> Result<(), CoachError> {
    // One demo meet per athlete; skip if one is already in the log.
    let existing: i64 = sqlx::query_scalar(
      "SELECT COUNT(*) FROM meets WHERE athlete_id = ? AND meet_name = ?",
    )
    .bind(&meet.athlete_id)
    .bind(&meet.meet_name)
    .fetch_one(&self.db)
    .await?;

    if existing == 0 {
      self.meets.add_meet(meet).await?;
    }
    Ok(())
  }
}

fn athlete_from_row(
  row: RosterRow,
  next_meet: Option<crate::models::MeetEntry>,
) -> Result<AthleteWithMetrics, CoachError> {
  let last_prediction: Option<PredictionResponse> = match &row.last_prediction_json {
    Some(json) => match serde_json::from_str(json) {
      Ok(prediction) => Some(prediction),
      Err(err) => {
        warn!("Dropping unreadable stored prediction for {}: {}", row.id, err);
        None
      }
    },
    None => None,
  };

  let risk_flags: Vec<String> = match serde_json::from_str(&row.risk_flags_json) {
    Ok(flags) => flags,
    Err(err) => {
      warn!("Dropping unreadable risk flags for {}: {}", row.id, err);
      Vec::new()
    }
  };

  Ok(AthleteWithMetrics {
    id: row.id,
    name: row.name,
    email: row.email,
    sex: row.sex.parse().map_err(CoachError::Decode)?,
    age: row.age,
    bodyweight: row.bodyweight,
    equipment: row.equipment.parse().map_err(CoachError::Decode)?,
    weight_class: row.weight_class,
    experience: row
      .experience
      .as_deref()
      .map(str::parse)
      .transpose()
      .map_err(CoachError::Decode)?,
    last_prediction,
    recent_progress: row.recent_progress,
    next_meet,
    risk_flags,
    prediction_accuracy: row.prediction_accuracy,
  })
}

fn age_bucket(age: i64) -> &'static str {
  if age < 30 {
    "20-29"
  } else if age < 40 {
    "30-39"
  } else {
    "40+"
  }
}

/// Aggregates computed from the roster itself. Every category shows up
/// in the distributions, zero-filled, so the charts render stable axes.
fn team_statistics(athletes: &[AthleteWithMetrics], upcoming_meets_count: i64) -> TeamStatistics {
  let mut equipment_distribution: HashMap<String, i64> =
    Equipment::ALL.iter().map(|equip| (equip.to_string(), 0)).collect();
  let mut sex_distribution: HashMap<String, i64> =
    Sex::ALL.iter().map(|sex| (sex.to_string(), 0)).collect();
  let mut age_distribution: HashMap<String, i64> =
    ["20-29", "30-39", "40+"].iter().map(|bucket| (bucket.to_string(), 0)).collect();

  let mut progress_sum = 0.0;
  for athlete in athletes {
    *equipment_distribution.entry(athlete.equipment.to_string()).or_insert(0) += 1;
    *sex_distribution.entry(athlete.sex.to_string()).or_insert(0) += 1;
    *age_distribution.entry(age_bucket(athlete.age).to_string()).or_insert(0) += 1;
    progress_sum += athlete.recent_progress;
  }

  let average_progress = if athletes.is_empty() {
    0.0
  } else {
    (progress_sum / athletes.len() as f64 * 10.0).round() / 10.0
  };

  TeamStatistics {
    total_athletes: athletes.len() as i64,
    average_progress,
    upcoming_meets_count,
    equipment_distribution,
    age_distribution,
    sex_distribution,
  }
}

#[allow(clippy::too_many_arguments)]
fn demo_athlete(
  id: &str,
  name: &str,
  email: &str,
  sex: Sex,
  age: i64,
  bodyweight: f64,
  equipment: Equipment,
  last_prediction: PredictionResponse,
  recent_progress: f64,
  risk_flags: Vec<String>,
  prediction_accuracy: f64,
) -> AthleteWithMetrics {
  AthleteWithMetrics {
    id: id.to_string(),
    name: name.to_string(),
    email: email.to_string(),
    sex,
    age,
    bodyweight,
    equipment,
    weight_class: None,
    experience: None,
    last_prediction: Some(last_prediction),
    recent_progress,
    next_meet: None,
    risk_flags,
    prediction_accuracy,
  }
}

fn demo_prediction(
  total: f64,
  pi_low: f64,
  pi_high: f64,
  confidence: f64,
  percentile: i64,
) -> PredictionResponse {
  PredictionResponse {
    total_pred: total,
    squat_pred: None,
    bench_pred: None,
    deadlift_pred: None,
    wilks_pred: None,
    pi_low: Some(pi_low),
    pi_high: Some(pi_high),
    percentile: Some(percentile),
    confidence: Some(confidence),
    metadata: None,
  }
}
