//! Prediction state store
//!
//! Holds the current profile, the current prediction and the accumulated
//! what-if history for one session. Overlapping requests are resolved
//! with epoch + sequence tickets: any clearing transition bumps the
//! epoch, and a base-prediction commit additionally requires the latest
//! sequence number, so a stale resolution can neither overwrite a newer
//! one nor resurrect cleared state.

use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{
  AthleteProfile, PredictionRequest, PredictionResponse, WhatIfResult, WhatIfScenario,
};
use crate::prediction::PredictionService;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("No current profile set for what-if scenario")]
  NoProfile,
}

#[derive(Default)]
struct StoreState {
  current_profile: Option<AthleteProfile>,
  current_prediction: Option<PredictionResponse>,
  what_if_history: Vec<WhatIfResult>,
  is_loading: bool,
  error: Option<String>,
  /// Bumped by every clearing transition.
  epoch: u64,
  /// Last sequence number handed out for a base prediction.
  latest_seq: u64,
}

/// Claim attached to an in-flight request at issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
  epoch: u64,
  seq: u64,
}

pub struct PredictionStore {
  service: PredictionService,
  state: Mutex<StoreState>,
}

impl PredictionStore {
  pub fn new(service: PredictionService) -> Self {
    Self { service, state: Mutex::new(StoreState::default()) }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
    match self.state.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }

  /// Store a new profile. Any stored prediction and what-if history
  /// belong to the previous profile and are dropped, even when the new
  /// profile is byte-for-byte identical. No equality check runs.
  pub fn update_profile(&self, profile: AthleteProfile) {
    let mut state = self.lock();
    info!("Athlete profile updated");

    state.current_profile = Some(profile);
    state.current_prediction = None;
    state.what_if_history.clear();
    // The epoch bump discards any in-flight resolution, so the flags it
    // would have cleared on commit must be cleared here.
    state.is_loading = false;
    state.error = None;
    state.epoch += 1;
  }

  /// Fetch a prediction for a profile and make it the current one. The
  /// service never fails, so the only way a response does not commit is
  /// losing the last-writer-wins race or resolving after a clear.
  pub async fn get_prediction(&self, profile: &AthleteProfile) -> PredictionResponse {
    let ticket = {
      let mut state = self.lock();
      state.latest_seq += 1;
      state.is_loading = true;
      state.error = None;
      Ticket { epoch: state.epoch, seq: state.latest_seq }
    };

    let request = PredictionRequest::from_profile(profile);
    let prediction = self.service.get_prediction(&request).await;

    self.commit_prediction(ticket, &prediction);
    prediction
  }

  fn commit_prediction(&self, ticket: Ticket, prediction: &PredictionResponse) {
    let mut state = self.lock();

    if ticket.epoch != state.epoch || ticket.seq != state.latest_seq {
      debug!(
        "Dropping stale prediction (ticket {:?}, epoch {}, latest seq {})",
        ticket, state.epoch, state.latest_seq
      );
      return;
    }

    state.current_prediction = Some(prediction.clone());
    state.is_loading = false;
    state.error = None;
  }

  /// Run a scenario against the current profile and append the outcome
  /// to the history. The current prediction is left alone; the consumer
  /// compares scenarios against the base it already holds.
  pub async fn get_what_if_prediction(
    &self,
    scenario: WhatIfScenario,
  ) -> Result<PredictionResponse, StoreError> {
    let (profile, epoch) = {
      let mut state = self.lock();
      let profile = state.current_profile.clone().ok_or(StoreError::NoProfile)?;
      state.is_loading = true;
      state.error = None;
      (profile, state.epoch)
    };

    let prediction = self.service.get_what_if_prediction(&profile, &scenario).await;

    let mut state = self.lock();
    if epoch == state.epoch {
      state.what_if_history.push(WhatIfResult { scenario, prediction: prediction.clone() });
      state.is_loading = false;
      state.error = None;
    } else {
      debug!("Dropping what-if result issued in epoch {}, now {}", epoch, state.epoch);
    }

    Ok(prediction)
  }

  /// Drop the prediction, history and flags but keep the profile.
  pub fn clear_predictions(&self) {
    let mut state = self.lock();
    debug!("Predictions cleared");

    state.current_prediction = None;
    state.what_if_history.clear();
    state.is_loading = false;
    state.error = None;
    state.epoch += 1;
  }

  pub fn clear_error(&self) {
    self.lock().error = None;
  }

  pub fn current_profile(&self) -> Option<AthleteProfile> {
    self.lock().current_profile.clone()
  }

  pub fn current_prediction(&self) -> Option<PredictionResponse> {
    self.lock().current_prediction.clone()
  }

  pub fn what_if_history(&self) -> Vec<WhatIfResult> {
    self.lock().what_if_history.clone()
  }

  pub fn is_loading(&self) -> bool {
    self.lock().is_loading
  }

  pub fn error(&self) -> Option<String> {
    self.lock().error.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiClient;
  use crate::config::Config;
  use crate::storage::Storage;
  use crate::test_utils::{mock_profile, mock_scenario, setup_test_db, teardown_test_db};
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  async fn store_for(server_url: &str) -> (PredictionStore, crate::db::DbPool) {
    let pool = setup_test_db().await;
    let api = ApiClient::new(&Config::with_base_url(server_url), Storage::new(pool.clone()));
    let service = PredictionService::with_rng(api, StdRng::seed_from_u64(99));
    (PredictionStore::new(service), pool)
  }

  async fn predict_mock(server: &mut mockito::ServerGuard, total: f64) -> mockito::Mock {
    server
      .mock("POST", "/api/predict")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(format!(r#"{{"success":true,"data":{{"total_pred":{}}}}}"#, total))
      .create_async()
      .await
  }

  #[tokio::test]
  async fn test_prediction_becomes_current() {
    let mut server = mockito::Server::new_async().await;
    predict_mock(&mut server, 520.0).await;

    let (store, pool) = store_for(&server.url()).await;
    let profile = mock_profile();
    store.update_profile(profile.clone());

    let prediction = store.get_prediction(&profile).await;

    assert_eq!(prediction.total_pred, 520.0);
    assert_eq!(store.current_prediction().map(|p| p.total_pred), Some(520.0));
    assert!(!store.is_loading());
    assert!(store.error().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_update_profile_always_clears_state() {
    let mut server = mockito::Server::new_async().await;
    predict_mock(&mut server, 500.0).await;

    let (store, pool) = store_for(&server.url()).await;
    let profile = mock_profile();
    store.update_profile(profile.clone());
    store.get_prediction(&profile).await;
    store.get_what_if_prediction(mock_scenario("Bulk")).await.unwrap();

    assert!(store.current_prediction().is_some());
    assert_eq!(store.what_if_history().len(), 1);

    // Same profile, no equality short-circuit: state still clears.
    store.update_profile(profile.clone());
    assert!(store.current_prediction().is_none());
    assert!(store.what_if_history().is_empty());
    assert_eq!(store.current_profile(), Some(profile.clone()));

    // And again, to prove the clear is unconditional.
    store.get_prediction(&profile).await;
    store.update_profile(profile.clone());
    assert!(store.current_prediction().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_what_if_without_profile_never_reaches_transport() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/api/predict").expect(0).create_async().await;

    let (store, pool) = store_for(&server.url()).await;
    let err = store.get_what_if_prediction(mock_scenario("No base")).await.unwrap_err();

    assert_eq!(err.to_string(), "No current profile set for what-if scenario");
    assert!(store.error().is_none(), "flags must be untouched");
    assert!(!store.is_loading());
    mock.assert_async().await;

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_what_if_history_accumulates_in_call_order() {
    // Unreachable backend: every call resolves through the fallback.
    let (store, pool) = store_for("http://127.0.0.1:1").await;
    store.update_profile(mock_profile());

    for label in ["First", "Second", "Third"] {
      store.get_what_if_prediction(mock_scenario(label)).await.unwrap();
    }

    let history = store.what_if_history();
    let labels: Vec<_> = history
      .iter()
      .map(|entry| entry.scenario.scenario_name.clone().unwrap())
      .collect();
    assert_eq!(labels, vec!["First", "Second", "Third"]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_what_if_leaves_current_prediction_alone() {
    let mut server = mockito::Server::new_async().await;
    predict_mock(&mut server, 480.0).await;

    let (store, pool) = store_for(&server.url()).await;
    let profile = mock_profile();
    store.update_profile(profile.clone());
    store.get_prediction(&profile).await;

    store.get_what_if_prediction(mock_scenario("Cut weight")).await.unwrap();

    assert_eq!(store.current_prediction().map(|p| p.total_pred), Some(480.0));
    assert_eq!(store.what_if_history().len(), 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_clear_predictions_keeps_profile() {
    let (store, pool) = store_for("http://127.0.0.1:1").await;
    let profile = mock_profile();
    store.update_profile(profile.clone());
    store.get_prediction(&profile).await;
    store.get_what_if_prediction(mock_scenario("Gear")).await.unwrap();

    store.clear_predictions();

    assert!(store.current_prediction().is_none());
    assert!(store.what_if_history().is_empty());
    assert!(store.error().is_none());
    assert_eq!(store.current_profile(), Some(profile));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_stale_ticket_does_not_commit() {
    let (store, pool) = store_for("http://127.0.0.1:1").await;
    let prediction = crate::test_utils::mock_prediction(600.0);

    // Two requests issued; the older sequence number loses the race.
    let stale = {
      let mut state = store.lock();
      state.latest_seq += 1;
      Ticket { epoch: state.epoch, seq: state.latest_seq }
    };
    {
      let mut state = store.lock();
      state.latest_seq += 1;
    }

    store.commit_prediction(stale, &prediction);
    assert!(store.current_prediction().is_none(), "stale sequence must not commit");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_profile_change_mid_flight_does_not_strand_loading_flag() {
    let (store, pool) = store_for("http://127.0.0.1:1").await;
    let prediction = crate::test_utils::mock_prediction(600.0);

    // Mirror get_prediction's issue step, then invalidate it before the
    // resolution lands.
    let ticket = {
      let mut state = store.lock();
      state.latest_seq += 1;
      state.is_loading = true;
      state.error = None;
      Ticket { epoch: state.epoch, seq: state.latest_seq }
    };
    store.update_profile(mock_profile());
    store.commit_prediction(ticket, &prediction);

    assert!(!store.is_loading(), "loading must clear when the in-flight request is discarded");
    assert!(store.current_prediction().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_clear_predictions_mid_flight_does_not_strand_loading_flag() {
    let (store, pool) = store_for("http://127.0.0.1:1").await;
    let prediction = crate::test_utils::mock_prediction(600.0);

    store.update_profile(mock_profile());
    let ticket = {
      let mut state = store.lock();
      state.latest_seq += 1;
      state.is_loading = true;
      state.error = None;
      Ticket { epoch: state.epoch, seq: state.latest_seq }
    };
    store.clear_predictions();
    store.commit_prediction(ticket, &prediction);

    assert!(!store.is_loading(), "loading must clear when the in-flight request is discarded");
    assert!(store.current_prediction().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_what_if_sets_loading_for_the_duration() {
    let mut server = mockito::Server::new_async().await;
    predict_mock(&mut server, 470.0).await;

    let (store, pool) = store_for(&server.url()).await;
    store.update_profile(mock_profile());

    let store = std::sync::Arc::new(store);
    let in_flight = tokio::spawn({
      let store = store.clone();
      async move { store.get_what_if_prediction(mock_scenario("Mid-flight")).await }
    });

    // Let the spawned call run up to its network await point.
    tokio::task::yield_now().await;
    assert!(store.is_loading(), "what-if must raise the loading flag while in flight");

    in_flight.await.unwrap().unwrap();
    assert!(!store.is_loading());
    assert_eq!(store.what_if_history().len(), 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_cleared_epoch_discards_resolution() {
    let (store, pool) = store_for("http://127.0.0.1:1").await;
    let prediction = crate::test_utils::mock_prediction(600.0);

    let ticket = {
      let mut state = store.lock();
      state.latest_seq += 1;
      Ticket { epoch: state.epoch, seq: state.latest_seq }
    };

    // Profile change after issue invalidates the in-flight request.
    store.update_profile(mock_profile());
    store.commit_prediction(ticket, &prediction);

    assert!(store.current_prediction().is_none(), "old-epoch ticket must not commit");

    teardown_test_db(pool).await;
  }
}
