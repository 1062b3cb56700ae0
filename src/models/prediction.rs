use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::athlete::{AthleteProfile, Equipment, Sex};

/// Feature vector sent to the inference endpoint. Field names are the
/// model's, not ours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
  pub sex: Sex,
  pub age: i64,
  /// Bodyweight in kg.
  pub bw: f64,
  pub equip: Equipment,
}

impl PredictionRequest {
  pub fn from_profile(profile: &AthleteProfile) -> Self {
    Self {
      sex: profile.sex,
      age: profile.age,
      bw: profile.bodyweight,
      equip: profile.equipment,
    }
  }
}

/// What the model predicts for a request. Only the total is guaranteed;
/// everything else is present when the backend chooses to send it and
/// stays `None` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
  pub total_pred: f64,
  pub squat_pred: Option<f64>,
  pub bench_pred: Option<f64>,
  pub deadlift_pred: Option<f64>,
  pub wilks_pred: Option<f64>,
  pub pi_low: Option<f64>,
  pub pi_high: Option<f64>,
  pub percentile: Option<i64>,
  pub confidence: Option<f64>,
  pub metadata: Option<PredictionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetadata {
  pub model_version: String,
  pub prediction_date: DateTime<Utc>,
  pub features_used: Vec<String>,
}

/// A hypothetical tweak to an athlete's profile. Adjustments are applied
/// to the base profile as-is; the consumer bounds its sliders to
/// -20..=20 years and -30..=30 kg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfScenario {
  pub age_adjustment: i64,
  pub bodyweight_adjustment: f64,
  pub equipment_change: Option<Equipment>,
  // Historical quirk: this one field rides the wire in snake_case.
  #[serde(rename = "scenario_name")]
  pub scenario_name: Option<String>,
}

/// One entry of the what-if history held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfResult {
  pub scenario: WhatIfScenario,
  pub prediction: PredictionResponse,
}

/// How an athlete stacks up against the training population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerComparison {
  pub percentile: i64,
  pub average_for_demographic: f64,
  pub sample_size: i64,
  pub distribution: Vec<DistributionBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
  pub range: String,
  pub count: i64,
  pub percentage: f64,
}

/// Feature-importance breakdown for the deployed model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelExplanation {
  pub features: Vec<FeatureImportance>,
  pub model_info: ModelInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
  pub name: String,
  pub importance: f64,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
  pub algorithm: String,
  pub accuracy: f64,
  pub last_trained: String,
  pub sample_size: i64,
}
