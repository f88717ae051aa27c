//! Shared types, traits, and configuration for voicemirror.
//!
//! This crate holds everything the audio pipeline, the baseline engine and
//! the binary agree on: per-frame readings, the metrics snapshot, type codes,
//! voice logs, and the TOML-backed analyzer configuration.

pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod traits;
pub mod type_code;
pub mod voice_log;

pub use config::AnalyzerConfig;
pub use error::CoreError;
pub use frame::FrameReading;
pub use metrics::{AnalysisMetrics, AnalysisResult, ProsodyMetrics};
pub use traits::AudioStream;
pub use type_code::TypeCode;
pub use voice_log::{
    DayCategory, FEATURE_DIMENSIONS, FeatureVector, LogContext, TimeCategory, VoiceLog,
};

