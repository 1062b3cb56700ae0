//! Strength Compass core
//!
//! Performance-prediction pipeline for strength athletes: profile
//! validation, the remote prediction client with its local fallback
//! heuristic, the session state store, derived scoring and formatting,
//! and the sqlite-backed auth / meet-log / coach repositories.
//!
//! This crate is a library. It emits `tracing` events but never installs
//! a subscriber; the embedding application owns logging output.

pub mod api;
pub mod auth;
pub mod coach;
pub mod config;
pub mod db;
pub mod format;
pub mod meetlog;
pub mod models;
pub mod prediction;
pub mod scoring;
pub mod storage;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use api::{ApiClient, ApiError};
pub use auth::AuthService;
pub use coach::CoachService;
pub use config::Config;
pub use meetlog::MeetLog;
pub use prediction::PredictionService;
pub use storage::Storage;
pub use store::PredictionStore;
