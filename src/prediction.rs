//! Prediction service with local fallback
//!
//! The remote model is the source of truth, but athletes train in gyms
//! with bad reception. Any transport failure, bad status or rejected
//! envelope silently degrades to a locally computed heuristic estimate,
//! so callers always get a usable prediction. Peer comparison and model
//! explanation are display-only extras and their failures propagate.

use std::sync::Mutex;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{
  AthleteProfile, Equipment, ModelExplanation, PeerComparison, PredictionMetadata,
  PredictionRequest, PredictionResponse, Sex, WhatIfScenario,
};
use crate::scoring::calculate_wilks;

const FALLBACK_MODEL_VERSION: &str = "fallback-v1.0";

/// Multipliers mirror the equipment effect sizes in the training data.
fn equipment_multiplier(equip: Equipment) -> f64 {
  match equip {
    Equipment::Raw => 1.0,
    Equipment::Wraps => 1.1,
    Equipment::SinglePly => 1.2,
    Equipment::MultiPly => 1.4,
    Equipment::Straps => 1.05,
    Equipment::Unlimited => 1.5,
  }
}

pub struct PredictionService {
  api: ApiClient,
  rng: Mutex<StdRng>,
}

impl PredictionService {
  pub fn new(api: ApiClient) -> Self {
    Self::with_rng(api, StdRng::from_entropy())
  }

  /// Seeded variant so the fallback's noise, confidence and percentile
  /// draws are reproducible.
  pub fn with_rng(api: ApiClient, rng: StdRng) -> Self {
    Self { api, rng: Mutex::new(rng) }
  }

  /// Ask the backend for a prediction; serve the local estimate on any
  /// failure. This never errors.
  pub async fn get_prediction(&self, request: &PredictionRequest) -> PredictionResponse {
    debug!("Requesting strength prediction for {:?}", request);

    match self.api.post("/api/predict", request).await {
      Ok(prediction) => {
        info!("Prediction received from backend");
        prediction
      }
      Err(err) => {
        warn!("Prediction endpoint unavailable ({}), serving local estimate", err);
        self.fallback_prediction(request)
      }
    }
  }

  /// Apply a scenario to a base profile and predict the result.
  /// Adjustments ride through unclamped; the consumer's sliders own the
  /// bounds.
  pub async fn get_what_if_prediction(
    &self,
    base_profile: &AthleteProfile,
    scenario: &WhatIfScenario,
  ) -> PredictionResponse {
    let request = PredictionRequest {
      sex: base_profile.sex,
      age: base_profile.age + scenario.age_adjustment,
      bw: base_profile.bodyweight + scenario.bodyweight_adjustment,
      equip: scenario.equipment_change.unwrap_or(base_profile.equipment),
    };

    debug!("Requesting what-if prediction for {:?}", request);
    self.get_prediction(&request).await
  }

  /// Population standings for a profile. Display-only; errors propagate.
  pub async fn get_peer_comparison(
    &self,
    profile: &AthleteProfile,
  ) -> Result<PeerComparison, ApiError> {
    // This endpoint takes the long field names, unlike /api/predict.
    let body = serde_json::json!({
      "sex": profile.sex,
      "age": profile.age,
      "bodyweight": profile.bodyweight,
      "equipment": profile.equipment,
    });

    self.api.post("/api/peer-comparison", &body).await.map_err(|err| {
      error!("Peer comparison failed: {}", err);
      err
    })
  }

  /// Feature importances for the deployed model. Display-only; errors
  /// propagate.
  pub async fn get_model_explanation(&self) -> Result<ModelExplanation, ApiError> {
    self.api.get("/api/model/explanation").await.map_err(|err| {
      error!("Model explanation failed: {}", err);
      err
    })
  }

  /// Heuristic estimate used when the backend cannot answer. Shaped to
  /// land in the same range the remote model predicts for the same
  /// request.
  fn fallback_prediction(&self, request: &PredictionRequest) -> PredictionResponse {
    let mut rng = match self.rng.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };

    let mut base = 400.0;
    if request.sex == Sex::M {
      base += 150.0;
    }

    let age_factor = (1.0 - (request.age - 28).abs() as f64 * 0.015).max(0.7);
    let weight_factor = (request.bw / 70.0).clamp(0.5, 2.0);
    let estimate = base * age_factor * weight_factor * equipment_multiplier(request.equip);

    let noise = (rng.gen::<f64>() - 0.5) * (estimate * 0.1);
    let total = (estimate + noise).round();

    let wilks = calculate_wilks(total, request.bw, request.sex);

    PredictionResponse {
      total_pred: total,
      squat_pred: Some((total * 0.38).round()),
      bench_pred: Some((total * 0.25).round()),
      deadlift_pred: Some((total * 0.37).round()),
      wilks_pred: Some((wilks * 10.0).round() / 10.0),
      pi_low: Some((total * 0.9).round()),
      pi_high: Some((total * 1.1).round()),
      percentile: Some(rng.gen_range(50..=80)),
      confidence: Some(0.75 + rng.gen::<f64>() * 0.2),
      metadata: Some(PredictionMetadata {
        model_version: FALLBACK_MODEL_VERSION.to_string(),
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
}
