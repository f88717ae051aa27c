//! Moteur de baseline personnelle : statistiques de population et détection
//! d'anomalies par z-score sur les vecteurs de features 30D, et dérive entre
//! deux passes d'analyse.
//!
//! Sans état, `Send + Sync` ; plusieurs appels peuvent tourner en parallèle.

pub mod context;
pub mod dimensions;
pub mod drift;
pub mod engine;
pub mod error;

pub use context::{DEFAULT_RETENTION_DAYS, day_category, prune_history, time_category};
pub use dimensions::DIMENSION_NAMES;
pub use drift::{DriftAnalysis, DriftChanges, DriftStatus, calculate_drift, calculate_drift_at};
pub use engine::{
    AnomalyAlert, BaselineStats, DEFAULT_LOOKBACK_DAYS, Direction, Severity, ZScoreResult,
    calculate_many, calculate_z_scores, calculate_z_scores_at,
};
pub use error::BaselineError;
