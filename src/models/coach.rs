use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::athlete::{Equipment, Experience, Sex};
use super::meet::MeetEntry;
use super::prediction::PredictionResponse;

/// Everything the coach dashboard renders in one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachDashboardData {
  pub athletes: Vec<AthleteWithMetrics>,
  pub team_stats: TeamStatistics,
  pub upcoming_meets: Vec<MeetEntry>,
  pub alerts: Vec<CoachAlert>,
}

/// A rostered athlete plus the derived numbers the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteWithMetrics {
  pub id: String,
  pub name: String,
  pub email: String,
  pub sex: Sex,
  pub age: i64,
  pub bodyweight: f64,
  pub equipment: Equipment,
  pub weight_class: Option<String>,
  pub experience: Option<Experience>,
  pub last_prediction: Option<PredictionResponse>,
  /// Percentage change over the recent training block.
  pub recent_progress: f64,
  pub next_meet: Option<MeetEntry>,
  pub risk_flags: Vec<String>,
  /// Mean absolute error from recent meets, in kg.
  pub prediction_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatistics {
  pub total_athletes: i64,
  pub average_progress: f64,
  pub upcoming_meets_count: i64,
  pub equipment_distribution: HashMap<String, i64>,
  pub age_distribution: HashMap<String, i64>,
  pub sex_distribution: HashMap<String, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
  PerformanceDrop,
  MeetApproaching,
  PredictionOutlier,
  InjuryRisk,
}

impl std::fmt::Display for AlertType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::PerformanceDrop => write!(f, "performance_drop"),
      Self::MeetApproaching => write!(f, "meet_approaching"),
      Self::PredictionOutlier => write!(f, "prediction_outlier"),
      Self::InjuryRisk => write!(f, "injury_risk"),
    }
  }
}

impl std::str::FromStr for AlertType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "performance_drop" => Ok(Self::PerformanceDrop),
      "meet_approaching" => Ok(Self::MeetApproaching),
      "prediction_outlier" => Ok(Self::PredictionOutlier),
      "injury_risk" => Ok(Self::InjuryRisk),
      _ => Err(format!("Unknown alert type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Low,
  Medium,
  High,
}

impl std::fmt::Display for Severity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Low => write!(f, "low"),
      Self::Medium => write!(f, "medium"),
      Self::High => write!(f, "high"),
    }
  }
}

impl std::str::FromStr for Severity {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "low" => Ok(Self::Low),
      "medium" => Ok(Self::Medium),
      "high" => Ok(Self::High),
      _ => Err(format!("Unknown severity: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachAlert {
  pub id: String,
  pub athlete_id: String,
  pub athlete_name: String,
  #[serde(rename = "type")]
  pub alert_type: AlertType,
  pub severity: Severity,
  pub message: String,
  pub action_required: bool,
  pub created_at: DateTime<Utc>,
}
