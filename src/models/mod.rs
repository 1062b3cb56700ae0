pub mod athlete;
pub mod coach;
pub mod meet;
pub mod prediction;
pub mod user;

pub use athlete::{AthleteProfile, AthleteStats, Equipment, Experience, Sex};
pub use coach::{
  AlertType, AthleteWithMetrics, CoachAlert, CoachDashboardData, Severity, TeamStatistics,
};
pub use meet::{MeetEntry, MeetEntryUpdate, MeetPerformance, NewMeetEntry};
pub use prediction::{
  DistributionBucket, FeatureImportance, ModelExplanation, ModelInfo, PeerComparison,
  PredictionMetadata, PredictionRequest, PredictionResponse, WhatIfResult, WhatIfScenario,
};
pub use user::{AuthSession, LoginCredentials, RegisterData, User, UserRole, UserUpdate};
